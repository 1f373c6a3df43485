//! Planner configuration, loadable from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GoapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Backward-chaining search on the calling thread.
    #[default]
    Sequential,
    /// Precomputed action/condition graph searched on a worker pool.
    Graph,
}

/// When the planner is allowed to search for a new plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Always,
    /// Skip searching while an action is running.
    OnActionComplete,
    /// Skip searching while any plan is active.
    OnPlanComplete,
}

/// Which log lines the planner writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Plan lifecycle: new goal, action changes, completion and failure.
    pub active: bool,
    /// Candidate selection and action linking.
    pub search: bool,
    /// Goals and actions that were rejected.
    pub fail: bool,
}

impl LogConfig {
    pub fn all() -> Self {
        Self {
            active: true,
            search: true,
            fail: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Goals are not ticked by the planner; the host ticks them itself.
    pub manual_update_goal: bool,
    /// The planner starts inactive and turns itself off again once a tick adopts nothing.
    pub manual_activate_planner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub backend: BackendKind,

    pub search_mode: SearchMode,

    /// When the running action loses its preconditions, jump to the nearest later step that can
    /// run instead of abandoning the plan.
    pub skip_ahead: bool,

    pub log: LogConfig,

    pub tick: TickConfig,

    /// Initial activation. Ignored when `tick.manual_activate_planner` is set.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Facts that were never written read as `false`.
    #[serde(default = "default_true")]
    pub default_false: bool,

    /// Scale of the straight-line distance heuristic used by the graph backend.
    #[serde(default = "default_distance_multiplier")]
    pub distance_multiplier: f32,

    /// Dedicated worker threads for graph search. `None` uses the global rayon pool.
    pub worker_threads: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_distance_multiplier() -> f32 {
    1.0
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            search_mode: SearchMode::default(),
            skip_ahead: false,
            log: LogConfig::default(),
            tick: TickConfig::default(),
            is_active: default_true(),
            default_false: default_true(),
            distance_multiplier: default_distance_multiplier(),
            worker_threads: None,
        }
    }
}

impl PlannerConfig {
    pub fn graph() -> Self {
        Self {
            backend: BackendKind::Graph,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_search_mode(mut self, search_mode: SearchMode) -> Self {
        self.search_mode = search_mode;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GoapError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Whether the planner starts active.
    pub fn starts_active(&self) -> bool {
        self.is_active && !self.tick.manual_activate_planner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = PlannerConfig::from_yaml_str("{}").expect("parse");
        assert_eq!(config, PlannerConfig::default());
        assert!(config.default_false);
        assert!(config.starts_active());
    }

    #[test]
    fn parses_nested_sections() {
        let yaml = r#"
backend: graph
search_mode: on_plan_complete
skip_ahead: true
log:
  active: true
tick:
  manual_activate_planner: true
distance_multiplier: 0.5
worker_threads: 2
"#;
        let config = PlannerConfig::from_yaml_str(yaml).expect("parse");
        assert_eq!(config.backend, BackendKind::Graph);
        assert_eq!(config.search_mode, SearchMode::OnPlanComplete);
        assert!(config.skip_ahead);
        assert!(config.log.active && !config.log.search && !config.log.fail);
        assert!(config.tick.manual_activate_planner);
        assert!(!config.starts_active());
        assert_eq!(config.distance_multiplier, 0.5);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(matches!(
            PlannerConfig::from_yaml_str("backend: quantum"),
            Err(GoapError::ParseConfig(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PlannerConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
