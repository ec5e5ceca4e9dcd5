//! Gradle build system integration
//!
//! Hands resolved build directives to the external Gradle pipeline. The
//! resolver's directive properties become `-P` project properties on the
//! wrapper invocation; Gradle remains the only component that compiles,
//! packages, and signs.

use renormind_core::error::{Error, Result};
use renormind_core::process::{run_command_in_dir, CommandResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Platform-specific Gradle wrapper invocation
pub fn wrapper() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Check whether the project directory carries a Gradle wrapper
pub fn has_wrapper(project_dir: &Path) -> bool {
    let name = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
    project_dir.join(name).exists()
}

/// Render directive properties as `-Pkey=value` arguments
///
/// Keystore paths are tilde-expanded here, at hand-off time; the resolver
/// keeps them unexpanded so its output stays machine-independent.
pub fn property_args(properties: &BTreeMap<String, String>) -> Vec<String> {
    properties
        .iter()
        .map(|(key, value)| {
            let value = if key.ends_with(".storeFile") {
                shellexpand::tilde(value).into_owned()
            } else {
                value.clone()
            };
            format!("-P{}={}", key, value)
        })
        .collect()
}

/// Run a Gradle task with directive properties
pub fn run_task(
    project_dir: &Path,
    task: &str,
    properties: &BTreeMap<String, String>,
) -> Result<CommandResult> {
    if !has_wrapper(project_dir) {
        return Err(Error::gradle(format!(
            "No Gradle wrapper in {}",
            project_dir.display()
        ))
        .with_suggestion("Run from the Android project directory"));
    }

    let props = property_args(properties);
    let mut args: Vec<&str> = vec![task];
    args.extend(props.iter().map(String::as_str));

    run_command_in_dir(wrapper(), &args, project_dir)
}

/// Gradle task name for a build type's APK assembly
pub fn assemble_task(build_type: &str) -> String {
    format!("assemble{}", capitalize(build_type))
}

/// Gradle task name for a build type's AAB bundling
pub fn bundle_task(build_type: &str) -> String {
    format!("bundle{}", capitalize(build_type))
}

/// Assemble an APK for a build type
pub fn assemble(
    project_dir: &Path,
    build_type: &str,
    properties: &BTreeMap<String, String>,
) -> Result<CommandResult> {
    run_task(project_dir, &assemble_task(build_type), properties)
}

/// Bundle an AAB for a build type
pub fn bundle(
    project_dir: &Path,
    build_type: &str,
    properties: &BTreeMap<String, String>,
) -> Result<CommandResult> {
    run_task(project_dir, &bundle_task(build_type), properties)
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<CommandResult> {
    run_task(project_dir, "clean", &BTreeMap::new())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
