//! Descriptor invariant validation
//!
//! Runs every invariant against the descriptor after version injection.
//! Errors fail the resolution; warnings are surfaced but never block.

use crate::descriptor::{BuildDescriptor, DependencyScope};
use crate::plugins;
use crate::resolve::EffectiveVersions;
use renormind_core::validation::{is_reverse_domain, ValidationError, ValidationResult, Validator};
use std::collections::BTreeSet;

/// Validate a descriptor against the effective (post-injection) versions
pub fn validate(descriptor: &BuildDescriptor, versions: &EffectiveVersions) -> ValidationResult {
    let mut result = Validator::new()
        .required("android.namespace", &descriptor.android.namespace)
        .reverse_domain("android.namespace", &descriptor.android.namespace)
        .required("android.application_id", &descriptor.android.application_id)
        .reverse_domain("android.application_id", &descriptor.android.application_id)
        .range(
            "java.source_compatibility",
            descriptor.java.source_compatibility,
            8,
            25,
        )
        .range(
            "java.target_compatibility",
            descriptor.java.target_compatibility,
            8,
            25,
        )
        .custom("version.code", || {
            (versions.version_code == 0)
                .then(|| ("VERSION_CODE", "versionCode must be at least 1".to_string()))
        })
        .custom("android.min_sdk", || {
            (versions.min_sdk > versions.target_sdk || versions.target_sdk > versions.compile_sdk)
                .then(|| {
                    (
                        "SDK_ORDER",
                        format!(
                            "SDK levels out of order: minSdk={} targetSdk={} compileSdk={}",
                            versions.min_sdk, versions.target_sdk, versions.compile_sdk
                        ),
                    )
                })
        })
        .warn_if(
            "java.source_compatibility",
            descriptor.java.source_compatibility != descriptor.java.target_compatibility,
            "source and target compatibility differ",
        )
        .warn_if(
            "android.min_sdk",
            versions.min_sdk < 21,
            "minSdk below 21; plugins such as flutter_local_notifications expect 21 or newer",
        )
        .validate();

    result.merge(plugins::check(&descriptor.plugins));
    result.merge(check_signing(descriptor));
    result.merge(check_dependencies(descriptor));
    result
}

/// Every build type must resolve to a declared (or the implicit debug)
/// signing configuration. Only the `debug` build type may omit the
/// reference; everything else unsigned is an error, not an unsigned build.
fn check_signing(descriptor: &BuildDescriptor) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (build_type, config) in &descriptor.build_types {
        let field = format!("build_types.{}.signing_config", build_type);

        let reference = match (&config.signing_config, build_type.as_str()) {
            (Some(name), _) => name.clone(),
            (None, "debug") => "debug".to_string(),
            (None, _) => {
                result.add_error(ValidationError {
                    field,
                    message: format!(
                        "Build type '{}' declares no signing configuration; unsigned artifacts are not produced",
                        build_type
                    ),
                    code: "SIGNING_CONFIG".to_string(),
                    expected: Some("a signing configuration reference".to_string()),
                    actual: Some("none".to_string()),
                });
                continue;
            }
        };

        if descriptor.signing_config(&reference).is_none() {
            result.add_error(ValidationError {
                field,
                message: format!(
                    "Build type '{}' references signing config '{}' which is not declared",
                    build_type, reference
                ),
                code: "SIGNING_CONFIG".to_string(),
                expected: Some("a declared signing configuration".to_string()),
                actual: Some(reference.clone()),
            });
            continue;
        }

        if build_type != "debug" && reference == "debug" {
            result.add_warning(ValidationError {
                field,
                message: format!(
                    "Build type '{}' is signed with the debug identity; replace before distribution",
                    build_type
                ),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
    }

    result
}

fn check_dependencies(descriptor: &BuildDescriptor) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen: BTreeSet<(DependencyScope, &str)> = BTreeSet::new();

    for (index, dep) in descriptor.dependencies.iter().enumerate() {
        let field = format!("dependencies[{}]", index);

        let valid_coordinate = match dep.coordinate.split_once(':') {
            Some((group, artifact)) => {
                is_reverse_domain(group) && !artifact.is_empty() && !artifact.contains(':')
            }
            None => false,
        };
        if !valid_coordinate {
            result.add_error(ValidationError {
                field: field.clone(),
                message: format!("Invalid dependency coordinate: {}", dep.coordinate),
                code: "DEPENDENCY".to_string(),
                expected: Some("group:artifact with a reverse-domain group".to_string()),
                actual: Some(dep.coordinate.clone()),
            });
        }
        if dep.version.trim().is_empty() {
            result.add_error(ValidationError {
                field: field.clone(),
                message: format!("Dependency {} has no version", dep.coordinate),
                code: "DEPENDENCY".to_string(),
                expected: Some("a concrete version".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        if !seen.insert((dep.scope, dep.coordinate.as_str())) {
            result.add_error(ValidationError {
                field,
                message: format!(
                    "Dependency {} declared twice in scope {}",
                    dep.coordinate,
                    dep.scope.as_str()
                ),
                code: "DEPENDENCY".to_string(),
                expected: None,
                actual: None,
            });
        }
    }

    let has_desugar_dep = descriptor
        .dependencies
        .iter()
        .any(|d| d.scope == DependencyScope::CoreLibraryDesugaring);

    if has_desugar_dep && !descriptor.java.core_library_desugaring {
        result.add_error(ValidationError {
            field: "java.core_library_desugaring".to_string(),
            message: "A core-library-desugaring dependency is declared but desugaring is disabled"
                .to_string(),
            code: "DESUGARING".to_string(),
            expected: Some("core_library_desugaring = true".to_string()),
            actual: Some("false".to_string()),
        });
    }
    if !has_desugar_dep && descriptor.java.core_library_desugaring {
        result.add_error(ValidationError {
            field: "dependencies".to_string(),
            message: "Desugaring is enabled but no core-library-desugaring dependency is declared"
                .to_string(),
            code: "DESUGARING".to_string(),
            expected: Some("a dependency with scope core-library-desugaring".to_string()),
            actual: Some("none".to_string()),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{BuildTypeConfig, DependencyConfig};

    fn versions() -> EffectiveVersions {
        EffectiveVersions {
            compile_sdk: 34,
            min_sdk: 21,
            target_sdk: 34,
            ndk_version: None,
            version_code: 1,
            version_name: "1.0.0".to_string(),
        }
    }

    #[test]
    fn test_default_descriptor_is_valid() {
        let result = validate(&BuildDescriptor::default(), &versions());
        assert!(result.is_valid(), "errors: {:?}", result.errors());
        // release reusing debug signing is flagged, not fatal
        assert!(result
            .warnings()
            .iter()
            .any(|w| w.field == "build_types.release.signing_config"));
    }

    #[test]
    fn test_min_sdk_above_target_fails() {
        let mut v = versions();
        v.min_sdk = 35;
        let result = validate(&BuildDescriptor::default(), &v);
        assert!(result.errors().iter().any(|e| e.code == "SDK_ORDER"));
    }

    #[test]
    fn test_target_above_compile_fails() {
        let mut v = versions();
        v.target_sdk = 35;
        let result = validate(&BuildDescriptor::default(), &v);
        assert!(result.errors().iter().any(|e| e.code == "SDK_ORDER"));
    }

    #[test]
    fn test_dangling_signing_reference_fails() {
        let mut d = BuildDescriptor::default();
        d.build_types.insert(
            "release".to_string(),
            BuildTypeConfig {
                signing_config: Some("upload".to_string()),
            },
        );
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "SIGNING_CONFIG"));
    }

    #[test]
    fn test_release_without_signing_reference_fails() {
        let mut d = BuildDescriptor::default();
        d.build_types.insert(
            "release".to_string(),
            BuildTypeConfig {
                signing_config: None,
            },
        );
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "SIGNING_CONFIG"));
    }

    #[test]
    fn test_debug_build_type_may_omit_reference() {
        let mut d = BuildDescriptor::default();
        d.build_types.insert(
            "debug".to_string(),
            BuildTypeConfig {
                signing_config: None,
            },
        );
        let result = validate(&d, &versions());
        assert!(result.is_valid(), "errors: {:?}", result.errors());
    }

    #[test]
    fn test_invalid_application_id_fails() {
        let mut d = BuildDescriptor::default();
        d.android.application_id = "renormind".to_string();
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "REVERSE_DOMAIN"));
    }

    #[test]
    fn test_desugaring_dep_without_flag_fails() {
        let mut d = BuildDescriptor::default();
        d.java.core_library_desugaring = false;
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "DESUGARING"));
    }

    #[test]
    fn test_desugaring_flag_without_dep_fails() {
        let mut d = BuildDescriptor::default();
        d.dependencies.clear();
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "DESUGARING"));
    }

    #[test]
    fn test_duplicate_dependency_fails() {
        let mut d = BuildDescriptor::default();
        d.dependencies.push(DependencyConfig {
            coordinate: "com.android.tools:desugar_jdk_libs".to_string(),
            version: "2.0.3".to_string(),
            scope: DependencyScope::CoreLibraryDesugaring,
        });
        let result = validate(&d, &versions());
        assert!(result.errors().iter().any(|e| e.code == "DEPENDENCY"));
    }

    #[test]
    fn test_zero_version_code_fails() {
        let mut v = versions();
        v.version_code = 0;
        let result = validate(&BuildDescriptor::default(), &v);
        assert!(result.errors().iter().any(|e| e.code == "VERSION_CODE"));
    }

    #[test]
    fn test_low_min_sdk_warns() {
        let mut v = versions();
        v.min_sdk = 19;
        v.target_sdk = 34;
        let result = validate(&BuildDescriptor::default(), &v);
        assert!(result.is_valid());
        assert!(result.warnings().iter().any(|w| w.field == "android.min_sdk"));
    }
}
