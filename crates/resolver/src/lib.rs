//! Build configuration resolution for the Renormind Android target
//!
//! This crate is the core of the tooling: it loads the declarative build
//! descriptor, merges in the versions injected by the Flutter tooling layer,
//! validates every invariant, and deterministically produces the directives
//! consumed by the external Gradle pipeline.
//!
//! - **descriptor**: the declarative schema (plugins, identity, SDK levels,
//!   signing, dependencies)
//! - **loader**: TOML loading with standard-location discovery
//! - **provider**: the opaque external version provider (Flutter properties)
//! - **plugins**: plugin registry and application-order constraints
//! - **validate**: invariant checks with distinct, attributable errors
//! - **resolve**: the single-pass descriptor-to-directives transform
//! - **emit**: byte-stable artifact emission
//!
//! # Example
//!
//! ```rust,no_run
//! use renormind_resolver::descriptor::BuildDescriptor;
//! use renormind_resolver::provider::FlutterProperties;
//! use renormind_resolver::resolve::resolve;
//!
//! let descriptor = BuildDescriptor::default();
//! let provider = FlutterProperties::new("android/local.properties");
//! let resolution = resolve(&descriptor, &provider).expect("resolution failed");
//! println!("digest: {}", resolution.build.digest().expect("serialization"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod descriptor;
pub mod emit;
pub mod loader;
pub mod plugins;
pub mod provider;
pub mod resolve;
pub mod validate;

pub use descriptor::BuildDescriptor;
pub use loader::LoadedDescriptor;
pub use provider::{FlutterProperties, InjectedValues, StaticProvider, VersionProvider};
pub use resolve::{resolve, Resolution, ResolvedBuild};
