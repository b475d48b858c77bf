// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project record: the output of project analysis.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Detected ecosystem label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Python,
    Node,
    Rust,
    Java,
    Go,
    Php,
    Dotnet,
    Unknown,
}

impl Default for ProjectKind {
    fn default() -> Self {
        ProjectKind::Unknown
    }
}

/// Conventional build/test/lint commands for a detected project kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCommands {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<String>,
}

/// Best-effort version-control metadata: all fields individually nullable,
/// never fail analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dirty: Option<bool>,
}

/// An analyzed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Canonicalized absolute directory path; the registry key.
    pub path: PathBuf,
    pub kind: ProjectKind,
    pub dependencies: Vec<String>,
    pub build_commands: BuildCommands,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsInfo>,
    pub analyzed_at_ms: u64,
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
