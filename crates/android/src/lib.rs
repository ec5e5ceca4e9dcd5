//! Android pipeline hand-off for Renormind
//!
//! This crate owns the boundary to the external build pipeline:
//! - Gradle wrapper invocation with resolved directive properties

#![warn(missing_docs)]

pub mod gradle;
