// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project Registry: tracks analyzed projects and the current active one.

use crate::error::RegistryError;
use eto_core::Project;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    projects: HashMap<PathBuf, Project>,
    active: Option<PathBuf>,
}

/// Concurrent map from canonical path to [`Project`], plus a single
/// optional active-path reference.
#[derive(Clone, Default)]
pub struct ProjectRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or atomically replace the entry for `project.path`.
    pub fn put(&self, project: Project) {
        self.inner.write().projects.insert(project.path.clone(), project);
    }

    pub fn get(&self, path: &Path) -> Option<Project> {
        self.inner.read().projects.get(path).cloned()
    }

    /// Set the active project. Fails if `path` has not been analyzed.
    pub fn set_active(&self, path: &Path) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        if !inner.projects.contains_key(path) {
            return Err(RegistryError::ProjectNotFound(path.display().to_string()));
        }
        inner.active = Some(path.to_path_buf());
        Ok(())
    }

    pub fn get_active(&self) -> Option<PathBuf> {
        self.inner.read().active.clone()
    }

    pub fn get_active_project(&self) -> Option<Project> {
        let inner = self.inner.read();
        let active = inner.active.as_ref()?;
        inner.projects.get(active).cloned()
    }

    pub fn list(&self) -> Vec<Project> {
        self.inner.read().projects.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().projects.is_empty()
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
