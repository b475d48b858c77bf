// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project Analyzer.
//!
//! File-presence based ecosystem detection, best-effort dependency
//! extraction, and best-effort VCS metadata. A partial parse failure
//! degrades the affected field to empty/`None` rather than failing the
//! whole analysis.

use crate::error::AnalyzeError;
use eto_core::{BuildCommands, Clock, Project, ProjectKind, VcsInfo};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

const GIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Detect the ecosystem, dependencies, build commands and VCS metadata for
/// `path`, producing a [`Project`] record.
pub async fn analyze(path: &Path, clock: &impl Clock) -> Result<Project, AnalyzeError> {
    let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnalyzeError::NotFound(path.display().to_string())
        } else if e.kind() == std::io::ErrorKind::PermissionDenied {
            AnalyzeError::PermissionDenied(path.display().to_string())
        } else {
            AnalyzeError::Internal(format!("{}: {e}", path.display()))
        }
    })?;

    let metadata = tokio::fs::metadata(&canonical)
        .await
        .map_err(|e| AnalyzeError::Internal(format!("{}: {e}", canonical.display())))?;
    if !metadata.is_dir() {
        return Err(AnalyzeError::NotFound(canonical.display().to_string()));
    }

    let (kind, dependencies) = detect_kind_and_dependencies(&canonical).await;
    let build_commands = build_commands_for(kind, &canonical).await;
    let vcs = detect_vcs(&canonical).await;

    Ok(Project {
        path: canonical,
        kind,
        dependencies,
        build_commands,
        vcs,
        analyzed_at_ms: clock.epoch_ms(),
    })
}

async fn read(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

async fn any_csproj(dir: &Path) -> bool {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return false;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csproj"))
        {
            return true;
        }
    }
    false
}

/// Detection priority order; first match wins for `kind`.
async fn detect_kind_and_dependencies(dir: &Path) -> (ProjectKind, Vec<String>) {
    if let Some(text) = read(&dir.join("package.json")).await {
        return (ProjectKind::Node, parse_package_json_deps(&text));
    }
    if let Some(text) = read(&dir.join("Cargo.toml")).await {
        return (ProjectKind::Rust, parse_cargo_toml_deps(&text));
    }
    if let Some(text) = read(&dir.join("pyproject.toml")).await {
        return (ProjectKind::Python, parse_pyproject_deps(&text));
    }
    if let Some(text) = read(&dir.join("requirements.txt")).await {
        return (ProjectKind::Python, parse_requirements_txt(&text));
    }
    if let Some(text) = read(&dir.join("go.mod")).await {
        return (ProjectKind::Go, parse_go_mod_deps(&text));
    }
    if exists(&dir.join("pom.xml")).await {
        return (ProjectKind::Java, Vec::new());
    }
    if let Some(text) = read(&dir.join("composer.json")).await {
        return (ProjectKind::Php, parse_composer_json_deps(&text));
    }
    if any_csproj(dir).await {
        return (ProjectKind::Dotnet, Vec::new());
    }
    (ProjectKind::Unknown, Vec::new())
}

fn parse_package_json_deps(text: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Vec::new();
    };
    let mut names = BTreeSet::new();
    for key in ["dependencies", "devDependencies"] {
        if let Some(obj) = value.get(key).and_then(|v| v.as_object()) {
            names.extend(obj.keys().cloned());
        }
    }
    names.into_iter().collect()
}

fn parse_cargo_toml_deps(text: &str) -> Vec<String> {
    let Ok(value) = text.parse::<toml::Value>() else {
        return Vec::new();
    };
    value
        .get("dependencies")
        .and_then(|v| v.as_table())
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default()
}

fn parse_pyproject_deps(text: &str) -> Vec<String> {
    let Ok(value) = text.parse::<toml::Value>() else {
        return Vec::new();
    };
    value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| strip_version_specifier(s).to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_requirements_txt(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(strip_version_specifier)
        .map(str::to_string)
        .collect()
}

fn strip_version_specifier(spec: &str) -> &str {
    let end = spec
        .find(['=', '>', '<', '!', '~', '['])
        .unwrap_or(spec.len());
    spec[..end].trim()
}

fn parse_go_mod_deps(text: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_block = false;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("require (") {
            in_block = true;
            continue;
        }
        if in_block {
            if line == ")" {
                in_block = false;
                continue;
            }
            if let Some(module) = line.split_whitespace().next() {
                deps.push(module.to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("require ") {
            if let Some(module) = rest.split_whitespace().next() {
                deps.push(module.to_string());
            }
        }
    }
    deps
}

fn parse_composer_json_deps(text: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Vec::new();
    };
    value
        .get("require")
        .and_then(|v| v.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

/// Build commands table, with optional script-presence overrides.
async fn build_commands_for(kind: ProjectKind, dir: &Path) -> BuildCommands {
    match kind {
        ProjectKind::Python => BuildCommands {
            build: None,
            test: Some("pytest".to_string()),
            lint: None,
        },
        ProjectKind::Node => {
            let scripts = read(&dir.join("package.json"))
                .await
                .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
                .and_then(|v| v.get("scripts").cloned());
            let has_script = |name: &str| {
                scripts
                    .as_ref()
                    .and_then(|s| s.get(name))
                    .is_some()
            };
            BuildCommands {
                build: has_script("build").then(|| "npm run build".to_string()),
                test: Some("npm test".to_string()),
                lint: has_script("lint").then(|| "npm run lint".to_string()),
            }
        }
        ProjectKind::Rust => BuildCommands {
            build: Some("cargo build".to_string()),
            test: Some("cargo test".to_string()),
            lint: Some("cargo clippy".to_string()),
        },
        ProjectKind::Java => BuildCommands {
            build: Some("mvn package".to_string()),
            test: Some("mvn test".to_string()),
            lint: None,
        },
        ProjectKind::Go => BuildCommands {
            build: Some("go build ./...".to_string()),
            test: Some("go test ./...".to_string()),
            lint: Some("go vet ./...".to_string()),
        },
        ProjectKind::Php => BuildCommands {
            build: Some("composer install".to_string()),
            test: Some("phpunit".to_string()),
            lint: None,
        },
        ProjectKind::Dotnet => BuildCommands {
            build: Some("dotnet build".to_string()),
            test: Some("dotnet test".to_string()),
            lint: None,
        },
        ProjectKind::Unknown => BuildCommands::default(),
    }
}

async fn detect_vcs(dir: &Path) -> Option<VcsInfo> {
    if !exists(&dir.join(".git")).await {
        return None;
    }
    let branch = run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).await;
    let remote_url = run_git(dir, &["config", "--get", "remote.origin.url"]).await;
    let is_dirty = run_git(dir, &["status", "--porcelain"])
        .await
        .map(|out| !out.is_empty());
    Some(VcsInfo {
        branch,
        remote_url,
        is_dirty,
    })
}

async fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = tokio::time::timeout(
        GIT_TIMEOUT,
        Command::new("git").args(args).current_dir(dir).output(),
    )
    .await
    .ok()?
    .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
