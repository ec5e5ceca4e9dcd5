//! Build descriptor schema
//!
//! The declarative description of the Android target: plugins to apply, SDK
//! levels, application identity, Java compatibility, signing configurations,
//! build types, and library dependencies. Defaults reproduce the Renormind
//! Android target so a missing descriptor file still resolves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root build descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDescriptor {
    /// Plugin ids, in application order
    #[serde(default = "default_plugins")]
    pub plugins: Vec<String>,

    /// Android target configuration
    #[serde(default)]
    pub android: AndroidConfig,

    /// Application version identity
    #[serde(default)]
    pub version: VersionConfig,

    /// Java language-level configuration
    #[serde(default)]
    pub java: JavaConfig,

    /// Named signing configurations; `debug` is always implicitly available
    #[serde(default)]
    pub signing: BTreeMap<String, SigningConfig>,

    /// Build types mapped to signing configuration references
    #[serde(default = "default_build_types")]
    pub build_types: BTreeMap<String, BuildTypeConfig>,

    /// Library dependencies with resolution scopes
    #[serde(default = "default_dependencies")]
    pub dependencies: Vec<DependencyConfig>,

    /// Flutter integration
    #[serde(default)]
    pub flutter: FlutterConfig,
}

impl Default for BuildDescriptor {
    fn default() -> Self {
        Self {
            plugins: default_plugins(),
            android: AndroidConfig::default(),
            version: VersionConfig::default(),
            java: JavaConfig::default(),
            signing: BTreeMap::new(),
            build_types: default_build_types(),
            dependencies: default_dependencies(),
            flutter: FlutterConfig::default(),
        }
    }
}

fn default_plugins() -> Vec<String> {
    vec![
        crate::plugins::ANDROID_APPLICATION.to_string(),
        crate::plugins::KOTLIN_ANDROID.to_string(),
        crate::plugins::FLUTTER_GRADLE.to_string(),
    ]
}

fn default_build_types() -> BTreeMap<String, BuildTypeConfig> {
    let mut types = BTreeMap::new();
    types.insert(
        "debug".to_string(),
        BuildTypeConfig {
            signing_config: Some("debug".to_string()),
        },
    );
    // Signed with the debug keys so `flutter run --release` works;
    // flagged as a warning at resolution time.
    types.insert(
        "release".to_string(),
        BuildTypeConfig {
            signing_config: Some("debug".to_string()),
        },
    );
    types
}

fn default_dependencies() -> Vec<DependencyConfig> {
    vec![DependencyConfig {
        coordinate: "com.android.tools:desugar_jdk_libs".to_string(),
        version: "2.0.4".to_string(),
        scope: DependencyScope::CoreLibraryDesugaring,
    }]
}

/// Android target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// Namespace for generated resources and manifest merging
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Application id carried into the packaged artifact
    #[serde(default = "default_namespace")]
    pub application_id: String,

    /// Compile SDK level; injected by the version provider when absent
    #[serde(default)]
    pub compile_sdk: Option<u32>,

    /// Minimum SDK level; injected when absent
    #[serde(default)]
    pub min_sdk: Option<u32>,

    /// Target SDK level; injected when absent
    #[serde(default)]
    pub target_sdk: Option<u32>,

    /// NDK version; injected when absent, optional either way
    #[serde(default)]
    pub ndk_version: Option<String>,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            application_id: default_namespace(),
            compile_sdk: None,
            min_sdk: None,
            target_sdk: None,
            ndk_version: None,
        }
    }
}

fn default_namespace() -> String {
    "com.example.renormind".to_string()
}

/// Application version identity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Monotonic version code; injected when absent
    #[serde(default)]
    pub code: Option<u32>,

    /// Human-readable version name; injected when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// Java language-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaConfig {
    /// Source compatibility level
    #[serde(default = "default_java_level")]
    pub source_compatibility: u8,

    /// Target compatibility level; also drives the Kotlin jvmTarget
    #[serde(default = "default_java_level")]
    pub target_compatibility: u8,

    /// Rewrite newer JDK API calls for older platform runtimes
    #[serde(default = "default_true")]
    pub core_library_desugaring: bool,
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            source_compatibility: default_java_level(),
            target_compatibility: default_java_level(),
            core_library_desugaring: true,
        }
    }
}

fn default_java_level() -> u8 {
    17
}

fn default_true() -> bool {
    true
}

/// A named signing configuration
///
/// Credentials are never inlined; passwords are referenced by environment
/// variable name and read by the build pipeline, not by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Path to the keystore; `~` is expanded at Gradle hand-off, not here
    pub store_file: String,

    /// Key alias inside the keystore
    pub key_alias: String,

    /// Environment variable holding the store password
    #[serde(default)]
    pub store_password_env: Option<String>,

    /// Environment variable holding the key password
    #[serde(default)]
    pub key_password_env: Option<String>,
}

impl SigningConfig {
    /// The well-known Android debug signing identity
    pub fn debug() -> Self {
        Self {
            store_file: "~/.android/debug.keystore".to_string(),
            key_alias: "androiddebugkey".to_string(),
            store_password_env: None,
            key_password_env: None,
        }
    }
}

/// A build type and its signing configuration reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildTypeConfig {
    /// Name of the signing configuration to sign this build type with.
    /// Absent means unsigned, which fails resolution for every build type
    /// except `debug` (which falls back to the debug identity).
    #[serde(default)]
    pub signing_config: Option<String>,
}

/// Dependency resolution scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyScope {
    /// Ordinary implementation dependency
    Implementation,
    /// Library backing core-library desugaring
    CoreLibraryDesugaring,
}

impl DependencyScope {
    /// Stable identifier used in emitted directives
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyScope::Implementation => "implementation",
            DependencyScope::CoreLibraryDesugaring => "coreLibraryDesugaring",
        }
    }
}

/// A library dependency declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Maven coordinate, `group:artifact`
    pub coordinate: String,

    /// Requested version
    pub version: String,

    /// Resolution scope
    #[serde(default = "default_scope")]
    pub scope: DependencyScope,
}

fn default_scope() -> DependencyScope {
    DependencyScope::Implementation
}

/// Flutter integration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlutterConfig {
    /// Relative path to the cross-platform application source root
    #[serde(default = "default_flutter_source")]
    pub source: String,
}

impl Default for FlutterConfig {
    fn default() -> Self {
        Self {
            source: default_flutter_source(),
        }
    }
}

fn default_flutter_source() -> String {
    "../..".to_string()
}

impl BuildDescriptor {
    /// Look up a signing configuration by name, including the implicit
    /// `debug` identity when the descriptor does not shadow it.
    pub fn signing_config(&self, name: &str) -> Option<SigningConfig> {
        if let Some(config) = self.signing.get(name) {
            return Some(config.clone());
        }
        if name == "debug" {
            return Some(SigningConfig::debug());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptor_matches_renormind_target() {
        let d = BuildDescriptor::default();
        assert_eq!(d.android.application_id, "com.example.renormind");
        assert_eq!(d.android.namespace, "com.example.renormind");
        assert_eq!(d.plugins.len(), 3);
        assert_eq!(d.java.source_compatibility, 17);
        assert!(d.java.core_library_desugaring);
        assert_eq!(d.flutter.source, "../..");
    }

    #[test]
    fn test_default_release_reuses_debug_signing() {
        let d = BuildDescriptor::default();
        let release = d.build_types.get("release").unwrap();
        assert_eq!(release.signing_config.as_deref(), Some("debug"));
    }

    #[test]
    fn test_default_carries_desugaring_dependency() {
        let d = BuildDescriptor::default();
        assert_eq!(d.dependencies.len(), 1);
        let dep = &d.dependencies[0];
        assert_eq!(dep.coordinate, "com.android.tools:desugar_jdk_libs");
        assert_eq!(dep.version, "2.0.4");
        assert_eq!(dep.scope, DependencyScope::CoreLibraryDesugaring);
    }

    #[test]
    fn test_implicit_debug_signing_config() {
        let d = BuildDescriptor::default();
        let debug = d.signing_config("debug").unwrap();
        assert_eq!(debug.key_alias, "androiddebugkey");
        assert!(d.signing_config("upload").is_none());
    }

    #[test]
    fn test_declared_config_shadows_implicit_debug() {
        let mut d = BuildDescriptor::default();
        d.signing.insert(
            "debug".to_string(),
            SigningConfig {
                store_file: "custom.keystore".to_string(),
                key_alias: "custom".to_string(),
                store_password_env: None,
                key_password_env: None,
            },
        );
        assert_eq!(d.signing_config("debug").unwrap().key_alias, "custom");
    }
}
