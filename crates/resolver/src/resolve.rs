//! Deterministic descriptor resolution
//!
//! Maps the static descriptor plus externally injected version values into
//! the concrete directives handed to the build pipeline. Given a fixed
//! descriptor and fixed injected values the output is byte-for-byte
//! reproducible: no timestamps, no environment reads, keyed collections are
//! ordered.

use crate::descriptor::{BuildDescriptor, DependencyScope};
use crate::provider::VersionProvider;
use crate::validate;
use renormind_core::error::{Error, Result};
use renormind_core::validation::ValidationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Version values after merging descriptor pins over injected values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveVersions {
    /// Compile SDK level
    pub compile_sdk: u32,
    /// Minimum SDK level
    pub min_sdk: u32,
    /// Target SDK level
    pub target_sdk: u32,
    /// NDK version, when either side supplies one
    pub ndk_version: Option<String>,
    /// Application version code
    pub version_code: u32,
    /// Application version name
    pub version_name: String,
}

/// Values destined for the packaged artifact's manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestValues {
    /// Application id
    pub application_id: String,
    /// Resource namespace
    pub namespace: String,
    /// Version code, carried unmodified from its source
    pub version_code: u32,
    /// Version name, carried unmodified from its source
    pub version_name: String,
    /// Minimum SDK level
    pub min_sdk: u32,
    /// Target SDK level
    pub target_sdk: u32,
}

/// Compiler-facing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Compile SDK level
    pub compile_sdk: u32,
    /// NDK version, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
    /// Java source compatibility level
    pub source_compatibility: u8,
    /// Java target compatibility level
    pub target_compatibility: u8,
    /// Kotlin jvmTarget, derived from the target compatibility
    pub jvm_target: String,
    /// Whether core-library desugaring is enabled
    pub core_library_desugaring: bool,
}

/// A dependency-resolution request for the external registry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyRequest {
    /// Resolution scope
    pub scope: DependencyScope,
    /// Maven coordinate, `group:artifact`
    pub coordinate: String,
    /// Requested version
    pub version: String,
}

/// A build type's resolved signing identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSigning {
    /// Name of the signing configuration that was resolved
    pub config: String,
    /// Keystore path (unexpanded)
    pub store_file: String,
    /// Key alias
    pub key_alias: String,
    /// Environment variable holding the store password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_password_env: Option<String>,
    /// Environment variable holding the key password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_password_env: Option<String>,
    /// True when a non-debug build type fell back to the debug identity
    pub debug_fallback: bool,
}

/// The fully resolved build: everything the external pipeline consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBuild {
    /// Manifest values
    pub manifest: ManifestValues,
    /// Compiler options
    pub compiler: CompilerOptions,
    /// Plugins in validated application order
    pub plugins: Vec<String>,
    /// Dependency requests, sorted by (scope, coordinate, version)
    pub dependency_requests: Vec<DependencyRequest>,
    /// Build type name to resolved signing identity
    pub signing: BTreeMap<String, ResolvedSigning>,
    /// Relative path to the cross-platform source root
    pub flutter_source: String,
}

impl ResolvedBuild {
    /// Canonical JSON rendering: fixed field order, ordered maps, trailing
    /// newline. Identical inputs produce identical bytes.
    pub fn canonical_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// SHA-256 of the canonical JSON rendering
    pub fn digest(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_json()?.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Outcome of a resolution: the build plus non-fatal findings
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved build
    pub build: ResolvedBuild,
    /// Warnings surfaced during validation
    pub warnings: Vec<ValidationError>,
}

/// Merge descriptor pins over injected values; a field with neither is an
/// error attributable to the provider contract.
pub fn effective_versions(
    descriptor: &BuildDescriptor,
    injected: &crate::provider::InjectedValues,
) -> Result<EffectiveVersions> {
    let compile_sdk = descriptor
        .android
        .compile_sdk
        .or(injected.compile_sdk)
        .ok_or_else(|| Error::missing_injected_value("android.compile_sdk"))?;
    let min_sdk = descriptor
        .android
        .min_sdk
        .or(injected.min_sdk)
        .ok_or_else(|| Error::missing_injected_value("android.min_sdk"))?;
    let target_sdk = descriptor
        .android
        .target_sdk
        .or(injected.target_sdk)
        .ok_or_else(|| Error::missing_injected_value("android.target_sdk"))?;
    let version_code = descriptor
        .version
        .code
        .or(injected.version_code)
        .ok_or_else(|| Error::missing_injected_value("version.code"))?;
    let version_name = descriptor
        .version
        .name
        .clone()
        .or_else(|| injected.version_name.clone())
        .ok_or_else(|| Error::missing_injected_value("version.name"))?;
    let ndk_version = descriptor
        .android
        .ndk_version
        .clone()
        .or_else(|| injected.ndk_version.clone());

    Ok(EffectiveVersions {
        compile_sdk,
        min_sdk,
        target_sdk,
        ndk_version,
        version_code,
        version_name,
    })
}

/// Kotlin jvmTarget string for a Java language level
fn jvm_target(level: u8) -> String {
    if level <= 8 {
        format!("1.{}", level)
    } else {
        level.to_string()
    }
}

/// Resolve a descriptor against a version provider
///
/// Single synchronous pass: inject, merge, validate every invariant, then
/// assemble the resolved build. Any invariant violation aborts with the
/// distinct code of the first failure; nothing is clamped or defaulted.
pub fn resolve(descriptor: &BuildDescriptor, provider: &dyn VersionProvider) -> Result<Resolution> {
    let injected = provider.inject()?;
    let versions = effective_versions(descriptor, &injected)?;

    let findings = validate::validate(descriptor, &versions);
    let warnings = findings.warnings().to_vec();
    findings.to_result()?;

    let mut dependency_requests: Vec<DependencyRequest> = descriptor
        .dependencies
        .iter()
        .map(|d| DependencyRequest {
            scope: d.scope,
            coordinate: d.coordinate.clone(),
            version: d.version.clone(),
        })
        .collect();
    dependency_requests.sort();

    let mut signing = BTreeMap::new();
    for (build_type, config) in &descriptor.build_types {
        // Validation guarantees the reference resolves.
        let reference = config
            .signing_config
            .clone()
            .unwrap_or_else(|| "debug".to_string());
        let resolved = descriptor
            .signing_config(&reference)
            .ok_or_else(|| Error::signing_config_missing(build_type, &reference))?;
        signing.insert(
            build_type.clone(),
            ResolvedSigning {
                config: reference.clone(),
                store_file: resolved.store_file,
                key_alias: resolved.key_alias,
                store_password_env: resolved.store_password_env,
                key_password_env: resolved.key_password_env,
                debug_fallback: build_type != "debug" && reference == "debug",
            },
        );
    }

    let build = ResolvedBuild {
        manifest: ManifestValues {
            application_id: descriptor.android.application_id.clone(),
            namespace: descriptor.android.namespace.clone(),
            version_code: versions.version_code,
            version_name: versions.version_name.clone(),
            min_sdk: versions.min_sdk,
            target_sdk: versions.target_sdk,
        },
        compiler: CompilerOptions {
            compile_sdk: versions.compile_sdk,
            ndk_version: versions.ndk_version.clone(),
            source_compatibility: descriptor.java.source_compatibility,
            target_compatibility: descriptor.java.target_compatibility,
            jvm_target: jvm_target(descriptor.java.target_compatibility),
            core_library_desugaring: descriptor.java.core_library_desugaring,
        },
        plugins: descriptor.plugins.clone(),
        dependency_requests,
        signing,
        flutter_source: descriptor.flutter.source.clone(),
    };

    Ok(Resolution { build, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{BuildTypeConfig, DependencyConfig, SigningConfig};
    use crate::provider::{InjectedValues, StaticProvider};
    use proptest::prelude::*;

    fn flutter_injected() -> StaticProvider {
        StaticProvider(InjectedValues {
            compile_sdk: Some(34),
            min_sdk: Some(21),
            target_sdk: Some(34),
            ndk_version: Some("26.1.10909125".to_string()),
            version_code: Some(7),
            version_name: Some("1.2.3".to_string()),
        })
    }

    #[test]
    fn test_resolve_default_descriptor() {
        let resolution = resolve(&BuildDescriptor::default(), &flutter_injected()).unwrap();
        let build = &resolution.build;

        assert_eq!(build.manifest.application_id, "com.example.renormind");
        assert_eq!(build.manifest.version_code, 7);
        assert_eq!(build.manifest.version_name, "1.2.3");
        assert_eq!(build.compiler.compile_sdk, 34);
        assert_eq!(build.compiler.jvm_target, "17");
        assert!(build.compiler.core_library_desugaring);
        assert_eq!(build.dependency_requests.len(), 1);
        assert!(build.signing["release"].debug_fallback);
        assert!(!build.signing["debug"].debug_fallback);
    }

    #[test]
    fn test_version_identity_passes_through_unmodified() {
        let resolution = resolve(&BuildDescriptor::default(), &flutter_injected()).unwrap();
        assert_eq!(resolution.build.manifest.version_code, 7);
        assert_eq!(resolution.build.manifest.version_name, "1.2.3");
    }

    #[test]
    fn test_descriptor_pin_wins_over_injected() {
        let mut d = BuildDescriptor::default();
        d.android.min_sdk = Some(23);
        let resolution = resolve(&d, &flutter_injected()).unwrap();
        assert_eq!(resolution.build.manifest.min_sdk, 23);
    }

    #[test]
    fn test_missing_injected_value_fails() {
        let provider = StaticProvider(InjectedValues {
            compile_sdk: Some(34),
            min_sdk: Some(21),
            target_sdk: Some(34),
            ..Default::default()
        });
        let err = resolve(&BuildDescriptor::default(), &provider).unwrap_err();
        assert_eq!(err.code, renormind_core::ErrorCode::MissingInjectedValue);
    }

    #[test]
    fn test_sdk_order_violation_fails_not_clamps() {
        let provider = StaticProvider(InjectedValues {
            compile_sdk: Some(30),
            min_sdk: Some(21),
            target_sdk: Some(34),
            version_code: Some(1),
            version_name: Some("1.0.0".to_string()),
            ..Default::default()
        });
        let err = resolve(&BuildDescriptor::default(), &provider).unwrap_err();
        assert_eq!(err.code, renormind_core::ErrorCode::SdkOrderViolation);
    }

    #[test]
    fn test_release_without_replacement_signing_fails() {
        let mut d = BuildDescriptor::default();
        d.build_types.insert(
            "release".to_string(),
            BuildTypeConfig {
                signing_config: None,
            },
        );
        let err = resolve(&d, &flutter_injected()).unwrap_err();
        assert_eq!(err.code, renormind_core::ErrorCode::SigningConfigMissing);
    }

    #[test]
    fn test_release_with_declared_config_has_no_fallback_flag() {
        let mut d = BuildDescriptor::default();
        d.signing.insert(
            "upload".to_string(),
            SigningConfig {
                store_file: "upload.keystore".to_string(),
                key_alias: "upload".to_string(),
                store_password_env: Some("UPLOAD_STORE_PASSWORD".to_string()),
                key_password_env: Some("UPLOAD_KEY_PASSWORD".to_string()),
            },
        );
        d.build_types.insert(
            "release".to_string(),
            BuildTypeConfig {
                signing_config: Some("upload".to_string()),
            },
        );
        let resolution = resolve(&d, &flutter_injected()).unwrap();
        let release = &resolution.build.signing["release"];
        assert_eq!(release.config, "upload");
        assert!(!release.debug_fallback);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_desugaring_dependency_leaves_identity_untouched() {
        let base = BuildDescriptor::default();
        let mut without = base.clone();
        without.java.core_library_desugaring = false;
        without.dependencies.clear();

        let with = resolve(&base, &flutter_injected()).unwrap().build;
        let without = resolve(&without, &flutter_injected()).unwrap().build;

        assert_eq!(with.manifest.application_id, without.manifest.application_id);
        assert_eq!(with.manifest.namespace, without.manifest.namespace);
        assert_eq!(
            with.dependency_requests.len(),
            without.dependency_requests.len() + 1
        );
        let desugar = &with.dependency_requests[0];
        assert_eq!(desugar.scope, DependencyScope::CoreLibraryDesugaring);
        assert_eq!(desugar.coordinate, "com.android.tools:desugar_jdk_libs");
    }

    #[test]
    fn test_dependency_requests_sorted_regardless_of_declaration_order() {
        let mut d = BuildDescriptor::default();
        d.dependencies.push(DependencyConfig {
            coordinate: "androidx.core:core-ktx".to_string(),
            version: "1.12.0".to_string(),
            scope: DependencyScope::Implementation,
        });
        d.dependencies.push(DependencyConfig {
            coordinate: "androidx.annotation:annotation".to_string(),
            version: "1.7.0".to_string(),
            scope: DependencyScope::Implementation,
        });

        let forward = resolve(&d, &flutter_injected()).unwrap().build;

        d.dependencies.reverse();
        let reversed = resolve(&d, &flutter_injected()).unwrap().build;

        assert_eq!(forward.dependency_requests, reversed.dependency_requests);
    }

    #[test]
    fn test_jvm_target_derivation() {
        assert_eq!(jvm_target(8), "1.8");
        assert_eq!(jvm_target(11), "11");
        assert_eq!(jvm_target(17), "17");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let d = BuildDescriptor::default();
        let a = resolve(&d, &flutter_injected()).unwrap().build;
        let b = resolve(&d, &flutter_injected()).unwrap().build;
        assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }

    proptest! {
        #[test]
        fn prop_resolution_deterministic_across_valid_inputs(
            min_sdk in 21u32..30,
            target_gap in 0u32..6,
            compile_gap in 0u32..4,
            version_code in 1u32..10_000,
            patch in 0u32..100,
        ) {
            let provider = StaticProvider(InjectedValues {
                compile_sdk: Some(min_sdk + target_gap + compile_gap),
                min_sdk: Some(min_sdk),
                target_sdk: Some(min_sdk + target_gap),
                ndk_version: None,
                version_code: Some(version_code),
                version_name: Some(format!("1.0.{}", patch)),
            });
            let d = BuildDescriptor::default();

            let a = resolve(&d, &provider).unwrap().build;
            let b = resolve(&d, &provider).unwrap().build;

            prop_assert_eq!(a.canonical_json().unwrap(), b.canonical_json().unwrap());
            prop_assert_eq!(a.manifest.version_code, version_code);
        }

        #[test]
        fn prop_sdk_order_violations_always_fail(
            min_sdk in 22u32..40,
            below in 1u32..5,
        ) {
            // target below min: must fail, never clamp
            let provider = StaticProvider(InjectedValues {
                compile_sdk: Some(min_sdk + 5),
                min_sdk: Some(min_sdk),
                target_sdk: Some(min_sdk - below),
                ndk_version: None,
                version_code: Some(1),
                version_name: Some("1.0.0".to_string()),
            });
            let err = resolve(&BuildDescriptor::default(), &provider).unwrap_err();
            prop_assert_eq!(err.code, renormind_core::ErrorCode::SdkOrderViolation);
        }
    }
}
