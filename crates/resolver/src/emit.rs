//! Resolution artifact emission
//!
//! Writing the resolved build to disk is the resolver's only observable
//! side effect: a canonical JSON resolution manifest, a flat directive
//! properties file for the Gradle hand-off, and the digest of the manifest.
//! Re-emitting with identical inputs produces byte-identical files.

use crate::resolve::ResolvedBuild;
use renormind_core::error::{Result, ResultExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the resolution manifest
pub const RESOLVED_JSON: &str = "resolved.json";
/// File name of the Gradle directive properties
pub const DIRECTIVES_PROPERTIES: &str = "build-directives.properties";
/// File name of the manifest digest
pub const DIGEST_FILE: &str = "resolved.sha256";

/// Paths of the emitted artifacts
#[derive(Debug, Clone)]
pub struct EmittedArtifacts {
    /// The resolution manifest
    pub resolved_json: PathBuf,
    /// The Gradle directive properties
    pub directives: PathBuf,
    /// The digest file
    pub digest_file: PathBuf,
}

/// Flatten a resolved build into sorted `key=value` directives
pub fn directive_properties(build: &ResolvedBuild) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();

    props.insert(
        "android.applicationId".to_string(),
        build.manifest.application_id.clone(),
    );
    props.insert(
        "android.namespace".to_string(),
        build.manifest.namespace.clone(),
    );
    props.insert(
        "android.versionCode".to_string(),
        build.manifest.version_code.to_string(),
    );
    props.insert(
        "android.versionName".to_string(),
        build.manifest.version_name.clone(),
    );
    props.insert(
        "android.minSdk".to_string(),
        build.manifest.min_sdk.to_string(),
    );
    props.insert(
        "android.targetSdk".to_string(),
        build.manifest.target_sdk.to_string(),
    );
    props.insert(
        "android.compileSdk".to_string(),
        build.compiler.compile_sdk.to_string(),
    );
    if let Some(ndk) = &build.compiler.ndk_version {
        props.insert("android.ndkVersion".to_string(), ndk.clone());
    }
    props.insert(
        "java.sourceCompatibility".to_string(),
        build.compiler.source_compatibility.to_string(),
    );
    props.insert(
        "java.targetCompatibility".to_string(),
        build.compiler.target_compatibility.to_string(),
    );
    props.insert(
        "kotlin.jvmTarget".to_string(),
        build.compiler.jvm_target.clone(),
    );
    props.insert(
        "android.coreLibraryDesugaring".to_string(),
        build.compiler.core_library_desugaring.to_string(),
    );
    props.insert("flutter.source".to_string(), build.flutter_source.clone());
    props.insert("plugins".to_string(), build.plugins.join(","));

    for (index, request) in build.dependency_requests.iter().enumerate() {
        props.insert(
            format!("dependency.{}.{}", request.scope.as_str(), index),
            format!("{}:{}", request.coordinate, request.version),
        );
    }

    for (build_type, signing) in &build.signing {
        props.insert(
            format!("signing.{}.config", build_type),
            signing.config.clone(),
        );
        props.insert(
            format!("signing.{}.storeFile", build_type),
            signing.store_file.clone(),
        );
        props.insert(
            format!("signing.{}.keyAlias", build_type),
            signing.key_alias.clone(),
        );
    }

    props
}

/// Render directives as `key=value` lines, sorted by key, trailing newline
pub fn render_properties(props: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in props {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Write all resolution artifacts to the output directory
pub fn write_artifacts(build: &ResolvedBuild, out_dir: &Path) -> Result<EmittedArtifacts> {
    std::fs::create_dir_all(out_dir)
        .map_err(renormind_core::Error::from)
        .context(format!("While creating {}", out_dir.display()))?;

    let artifacts = EmittedArtifacts {
        resolved_json: out_dir.join(RESOLVED_JSON),
        directives: out_dir.join(DIRECTIVES_PROPERTIES),
        digest_file: out_dir.join(DIGEST_FILE),
    };

    let json = build.canonical_json()?;
    std::fs::write(&artifacts.resolved_json, &json)
        .map_err(renormind_core::Error::from)
        .context(format!("While writing {}", artifacts.resolved_json.display()))?;

    let properties = render_properties(&directive_properties(build));
    std::fs::write(&artifacts.directives, properties)
        .map_err(renormind_core::Error::from)
        .context(format!("While writing {}", artifacts.directives.display()))?;

    let digest = format!("{}  {}\n", build.digest()?, RESOLVED_JSON);
    std::fs::write(&artifacts.digest_file, digest)
        .map_err(renormind_core::Error::from)
        .context(format!("While writing {}", artifacts.digest_file.display()))?;

    Ok(artifacts)
}
