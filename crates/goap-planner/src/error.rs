use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring a planner.
///
/// Planning itself never fails with an error: a goal without a plan leaves the planner idle.
#[derive(Debug, Error)]
pub enum GoapError {
    #[error("failed to read planner config from {path}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse planner config: {0}")]
    ParseConfig(#[from] serde_yaml::Error),

    #[error("failed to build search worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no goal named {0}")]
    UnknownGoal(String),

    #[error("no action named {0}")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, GoapError>;
