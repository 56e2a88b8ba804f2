//! Core types for the Zephyr export toolchain
//!
//! This crate provides the project data model shared by the behavior
//! code generator and the export pipeline, along with the error and
//! diagnostic types and the abstract file system the exporter runs
//! against.

pub mod error;
pub mod fs;
pub mod project;

pub use error::{Diagnostic, DiagnosticCollector, DiagnosticLevel, ZephyrError, ZephyrResult};
pub use fs::{DiskFileSystem, FileSystem};
pub use project::*;
