//! Descriptor file loading

use crate::descriptor::BuildDescriptor;
use renormind_core::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Loaded descriptor plus its origin
#[derive(Debug, Clone)]
pub struct LoadedDescriptor {
    /// The parsed descriptor
    pub descriptor: BuildDescriptor,
    /// Path it was loaded from, `None` when defaults were used
    pub path: Option<PathBuf>,
}

impl LoadedDescriptor {
    /// Load a descriptor from an explicit path or from standard locations,
    /// falling back to the built-in Renormind target defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let descriptor_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::descriptor_not_found(p));
                }
                Some(p.to_path_buf())
            }
            None => find_descriptor_file(),
        };

        let descriptor = if let Some(ref p) = descriptor_path {
            load_descriptor_file(p)?
        } else {
            BuildDescriptor::default()
        };

        Ok(Self {
            descriptor,
            path: descriptor_path,
        })
    }
}

/// Find a descriptor file in standard locations
fn find_descriptor_file() -> Option<PathBuf> {
    let candidates = [
        ".renormind-build.toml",
        "renormind-build.toml",
        "android/renormind-build.toml",
    ];

    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    None
}

/// Load and parse a TOML descriptor file
fn load_descriptor_file(path: &Path) -> Result<BuildDescriptor> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::descriptor(format!(
            "Failed to read descriptor {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_descriptor(&content)
        .map_err(|e| e.with_context(format!("While parsing {}", path.display())))
}

/// Parse descriptor TOML
pub fn parse_descriptor(content: &str) -> Result<BuildDescriptor> {
    Ok(toml::from_str(content)?)
}
