use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::layout::{FrameGeometry, ValueReference};

/// One runtime snapshot produced by the upstream layout pass: the function
/// values discovered in the runtime's memory model, the environments they may
/// close over, and the locations referencing each value. Consumed as-is; this
/// crate never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    pub revision: u64,
    pub environments: Vec<EnvironmentNode>,
    pub functions: Vec<FunctionRecord>,
}

/// An environment-tree node. `frame` is absent for scopes without a drawn
/// frame (e.g. global scope); value nodes closing over such an environment
/// render without a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentNode {
    pub id: String,
    pub frame: Option<FrameGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub value: FunctionValue,
    /// Non-empty, ordered by discovery; the first entry drives layout.
    pub references: Vec<ValueReference>,
}

/// The underlying runtime artifact a value node presents. Immutable once
/// captured from the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionValue {
    pub id: String,
    pub name: String,
    pub params: Vec<String>,
    pub body: String,
    /// Environment the function closes over, already normalized upstream
    /// (empty pass-through frames skipped).
    pub env_id: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SnapshotError {
    #[error("function `{function_id}` has no references; every value needs at least one")]
    EmptyReferences { function_id: String },

    #[error("duplicate environment id `{env_id}`")]
    DuplicateEnvironment { env_id: String },
}

impl RuntimeSnapshot {
    /// Upholds the caller invariants the rendering core relies on but does
    /// not defensively re-check.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen_envs = BTreeSet::new();
        for environment in &self.environments {
            if !seen_envs.insert(environment.id.as_str()) {
                return Err(SnapshotError::DuplicateEnvironment {
                    env_id: environment.id.clone(),
                });
            }
        }

        for function in &self.functions {
            if function.references.is_empty() {
                return Err(SnapshotError::EmptyReferences {
                    function_id: function.value.id.clone(),
                });
            }
        }

        Ok(())
    }
}

pub fn load_snapshot(path: &Path) -> Result<RuntimeSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot `{}`", path.display()))?;

    let snapshot = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str::<RuntimeSnapshot>(&raw)
            .with_context(|| format!("failed to parse JSON snapshot `{}`", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str::<RuntimeSnapshot>(&raw)
            .with_context(|| format!("failed to parse YAML snapshot `{}`", path.display()))?,
        other => bail!(
            "unsupported snapshot extension `{}` for `{}`; expected json, yaml, or yml",
            other.unwrap_or(""),
            path.display()
        ),
    };

    snapshot
        .validate()
        .with_context(|| format!("invalid snapshot `{}`", path.display()))?;
    Ok(snapshot)
}

/// Environment-tree index consulted once per value node at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvironmentIndex {
    nodes: BTreeMap<String, EnvironmentNode>,
}

impl EnvironmentIndex {
    pub fn from_snapshot(snapshot: &RuntimeSnapshot) -> Self {
        Self {
            nodes: snapshot
                .environments
                .iter()
                .map(|environment| (environment.id.clone(), environment.clone()))
                .collect(),
        }
    }

    pub fn lookup(&self, env_id: &str) -> Option<&EnvironmentNode> {
        self.nodes.get(env_id)
    }
}
