//! Behavior code generation and export assembly for the Zephyr runtime
//!
//! This crate implements both stages of the toolchain: synthesizing
//! loadable JavaScript definitions from declarative behavior
//! descriptions, and assembling whole-project bundles for the preview,
//! mobile, desktop and social deployment targets.

pub mod behavior;
pub mod exporter;
pub mod includes;
pub mod options;
pub mod scene;
pub mod targets;
pub mod template;

pub use behavior::*;
pub use exporter::*;
pub use includes::*;
pub use options::*;
pub use scene::*;
pub use targets::*;

#[cfg(test)]
mod export_tests;
