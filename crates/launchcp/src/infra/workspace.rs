//! Workspace project lookup used by classpath validation.

use std::collections::BTreeMap;

use crate::infra::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    Missing,
    Closed,
    Open,
}

pub trait Workspace {
    fn project_state(&self, name: &str) -> ProjectState;
}

/// Known projects and whether each is open.
#[derive(Debug, Default, Clone)]
pub struct ProjectTable {
    projects: BTreeMap<String, bool>,
}

impl ProjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            projects: config.workspace.projects.clone(),
        }
    }

    pub fn with_project(mut self, name: impl Into<String>, open: bool) -> Self {
        self.projects.insert(name.into(), open);
        self
    }
}

impl Workspace for ProjectTable {
    fn project_state(&self, name: &str) -> ProjectState {
        match self.projects.get(name) {
            None => ProjectState::Missing,
            Some(true) => ProjectState::Open,
            Some(false) => ProjectState::Closed,
        }
    }
}
