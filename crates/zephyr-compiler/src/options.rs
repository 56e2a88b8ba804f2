//! Runtime game options
//!
//! A small record serialized next to the project snapshot and consumed
//! only by the generated bootstrap; opaque to the rest of the
//! toolchain beyond construction.

use serde::{Deserialize, Serialize};

/// One script file entry passed to the bootstrap, with the content
/// hash the caller recorded for it (0 when unknown). Used by the
/// hot-reloader to detect stale includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFile {
    pub path: String,
    pub hash: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeGameOptions {
    pub is_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inject_external_layout: Option<String>,
    pub script_files: Vec<ScriptFile>,
}

impl RuntimeGameOptions {
    pub fn new(
        is_preview: bool,
        inject_external_layout: Option<String>,
        script_files: Vec<ScriptFile>,
    ) -> Self {
        Self {
            is_preview,
            inject_external_layout,
            script_files,
        }
    }
}
