//! Prover configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Directories the prover works against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Directory of materialized DAG files.
    #[serde(default = "default_dag_dir")]
    pub dag_dir: PathBuf,
    /// Directory of persisted per-epoch caches.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl ProverConfig {
    /// Explicit directories.
    pub fn new(dag_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            dag_dir: dag_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            dag_dir: default_dag_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where geth materializes DAGs.
fn default_dag_dir() -> PathBuf {
    home_dir().join(".ethash")
}

fn default_cache_dir() -> PathBuf {
    home_dir().join(".ethashproof")
}
