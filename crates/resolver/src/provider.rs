//! External version provider
//!
//! The Flutter tooling layer owns the SDK levels and version identity of the
//! app; the resolver treats it as an opaque collaborator that injects values
//! for descriptor fields left unpinned. The concrete transport is the
//! Java-properties file the Flutter Gradle plugin generates.

use renormind_core::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Values supplied by the external tooling layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedValues {
    /// Compile SDK level
    pub compile_sdk: Option<u32>,
    /// Minimum SDK level
    pub min_sdk: Option<u32>,
    /// Target SDK level
    pub target_sdk: Option<u32>,
    /// NDK version string
    pub ndk_version: Option<String>,
    /// Application version code
    pub version_code: Option<u32>,
    /// Application version name
    pub version_name: Option<String>,
}

/// An external supplier of injected values
pub trait VersionProvider {
    /// Produce the injected values for this invocation
    fn inject(&self) -> Result<InjectedValues>;
}

/// Provider backed by a Flutter-generated properties file
///
/// Lines are `key=value`; `#` and `!` start comments; unknown keys are
/// ignored so newer Flutter versions stay compatible.
#[derive(Debug, Clone)]
pub struct FlutterProperties {
    path: PathBuf,
}

impl FlutterProperties {
    /// Create a provider reading from the given properties file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse properties content into injected values
    pub fn parse(content: &str) -> Result<InjectedValues> {
        let mut values = InjectedValues::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::new(
                    ErrorCode::ProviderParseError,
                    format!("Malformed property at line {}: {}", line_no + 1, line),
                ));
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "flutter.compileSdkVersion" => values.compile_sdk = Some(parse_level(key, value)?),
                "flutter.minSdkVersion" => values.min_sdk = Some(parse_level(key, value)?),
                "flutter.targetSdkVersion" => values.target_sdk = Some(parse_level(key, value)?),
                "flutter.ndkVersion" => values.ndk_version = Some(value.to_string()),
                "flutter.versionCode" => values.version_code = Some(parse_level(key, value)?),
                "flutter.versionName" => values.version_name = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(values)
    }
}

fn parse_level(key: &str, value: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| {
        Error::new(
            ErrorCode::ProviderParseError,
            format!("Property {} is not a non-negative integer: {}", key, value),
        )
    })
}

impl VersionProvider for FlutterProperties {
    fn inject(&self) -> Result<InjectedValues> {
        if !self.path.exists() {
            return Err(Error::new(
                ErrorCode::ProviderFileNotFound,
                format!("Flutter properties file not found: {}", self.path.display()),
            )
            .with_suggestion("Run `flutter build` once, or pass --flutter-properties"));
        }
        let content = std::fs::read_to_string(&self.path)?;
        Self::parse(&content)
            .map_err(|e| e.with_context(format!("While parsing {}", self.path.display())))
    }
}

/// Provider with fixed values, for tests and offline resolution
#[derive(Debug, Clone, Default)]
pub struct StaticProvider(pub InjectedValues);

impl VersionProvider for StaticProvider {
    fn inject(&self) -> Result<InjectedValues> {
        Ok(self.0.clone())
    }
}

/// Locate the Flutter properties file for an Android project directory
pub fn default_properties_path(project_dir: &Path) -> PathBuf {
    project_dir.join("local.properties")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
# Generated by flutter tooling
flutter.compileSdkVersion=34
flutter.minSdkVersion=21
flutter.targetSdkVersion=34
flutter.ndkVersion=26.1.10909125
flutter.versionCode=7
flutter.versionName=1.2.3
flutter.sdk=/opt/flutter
";

    #[test]
    fn test_parse_flutter_properties() {
        let values = FlutterProperties::parse(FIXTURE).unwrap();
        assert_eq!(values.compile_sdk, Some(34));
        assert_eq!(values.min_sdk, Some(21));
        assert_eq!(values.target_sdk, Some(34));
        assert_eq!(values.ndk_version.as_deref(), Some("26.1.10909125"));
        assert_eq!(values.version_code, Some(7));
        assert_eq!(values.version_name.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let values = FlutterProperties::parse("flutter.sdk=/opt/flutter\n").unwrap();
        assert_eq!(values, InjectedValues::default());
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let values =
            FlutterProperties::parse("# comment\n\n! also a comment\nflutter.versionCode=3\n")
                .unwrap();
        assert_eq!(values.version_code, Some(3));
    }

    #[test]
    fn test_non_numeric_level_fails() {
        let err = FlutterProperties::parse("flutter.minSdkVersion=twenty\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderParseError);
    }

    #[test]
    fn test_malformed_line_fails() {
        let err = FlutterProperties::parse("flutter.minSdkVersion\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderParseError);
        assert!(err.message.contains("line 1"));
    }

    #[test]
    fn test_missing_file_is_distinct_error() {
        let provider = FlutterProperties::new("/nonexistent/local.properties");
        let err = provider.inject().unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderFileNotFound);
    }

    #[test]
    fn test_static_provider_round_trip() {
        let provider = StaticProvider(InjectedValues {
            version_code: Some(7),
            ..Default::default()
        });
        assert_eq!(provider.inject().unwrap().version_code, Some(7));
    }
}
