//! File-backed store for in-flight reception workflows
//!
//! One JSON file per workflow, one directory per workflow status; a status
//! change moves the file with an atomic rename. This is operational storage
//! for in-flight state, not the commercial system of record — terminal
//! outcomes go to the persistence collaborator.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reception_types::StockReceptionOrder;

use crate::error::{ReceptionError, Result};

use super::state::{WorkflowId, WorkflowState, WorkflowStatus};

/// Store health, derived from status counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Workflow count per status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCountMap {
    counts: HashMap<WorkflowStatus, usize>,
}

impl StatusCountMap {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    pub fn increment(&mut self, status: WorkflowStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: WorkflowStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl Default for StatusCountMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub counts: StatusCountMap,
    pub total_workflows: usize,
    pub root_path: PathBuf,
    pub last_check: DateTime<Utc>,
}

/// Directory-per-status store of reception workflows
pub struct WorkflowStore {
    root_path: PathBuf,
}

impl WorkflowStore {
    /// Create a store under `root_path`, building the directory tree
    pub fn new<P: AsRef<Path>>(root_path: P) -> Result<Self> {
        let root_path = root_path.as_ref().to_path_buf();

        for status in WorkflowStatus::ALL {
            fs::create_dir_all(root_path.join(status.directory_name()))?;
        }

        Ok(Self { root_path })
    }

    /// Open the store under the configured data root (see `paths`)
    pub fn open_at_data_root() -> Result<Self> {
        Self::new(crate::paths::reception_data_root())
    }

    fn state_path(&self, status: WorkflowStatus, workflow_id: &WorkflowId) -> PathBuf {
        self.root_path
            .join(status.directory_name())
            .join(format!("reception_{}.json", workflow_id))
    }

    /// Find a workflow's file in any status directory
    fn find_state_path(&self, workflow_id: &WorkflowId) -> Option<(PathBuf, WorkflowStatus)> {
        for status in WorkflowStatus::ALL {
            let path = self.state_path(status, workflow_id);
            if path.exists() {
                return Some((path, status));
            }
        }
        None
    }

    fn write_state(&self, path: &Path, state: &WorkflowState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).map_err(|e| {
            ReceptionError::Serialization(format!("Failed to serialize workflow: {}", e))
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    fn read_state(&self, path: &Path) -> Result<WorkflowState> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| {
            ReceptionError::Deserialization(format!("Failed to deserialize workflow: {}", e))
        })
    }

    /// Register a delivery awaiting its technical inspection
    pub fn create(&self, order: StockReceptionOrder) -> Result<WorkflowId> {
        let state = WorkflowState::new(order);
        let workflow_id = state.workflow_id.clone();

        let path = self.state_path(WorkflowStatus::AwaitingTechnical, &workflow_id);
        self.write_state(&path, &state)?;

        log::info!(
            "Created reception workflow {} for order {}",
            workflow_id,
            state.order.id
        );
        Ok(workflow_id)
    }

    /// Load a workflow by id, optionally narrowed to one status
    pub fn get(
        &self,
        workflow_id: &WorkflowId,
        status: Option<WorkflowStatus>,
    ) -> Result<Option<WorkflowState>> {
        if let Some(status) = status {
            let path = self.state_path(status, workflow_id);
            if path.exists() {
                return Ok(Some(self.read_state(&path)?));
            }
        } else if let Some((path, _)) = self.find_state_path(workflow_id) {
            return Ok(Some(self.read_state(&path)?));
        }

        Ok(None)
    }

    /// List workflows currently in the given status
    pub fn list_by_status(&self, status: WorkflowStatus) -> Result<Vec<WorkflowState>> {
        let status_dir = self.root_path.join(status.directory_name());

        if !status_dir.exists() {
            return Ok(Vec::new());
        }

        let mut workflows = Vec::new();
        for entry in fs::read_dir(&status_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Ok(state) = self.read_state(&path) {
                    workflows.push(state);
                }
            }
        }

        Ok(workflows)
    }

    /// Persist an engine-mutated state, moving the file when the status
    /// directory changed
    pub fn save(&self, state: &WorkflowState) -> Result<()> {
        let (current_path, current_status) = self
            .find_state_path(&state.workflow_id)
            .ok_or_else(|| {
                ReceptionError::NotFound(format!("Workflow {} not in store", state.workflow_id))
            })?;

        self.write_state(&current_path, state)?;

        if current_status != state.status {
            let new_path = self.state_path(state.status, &state.workflow_id);
            fs::rename(&current_path, &new_path)?;
            log::info!(
                "Workflow {} moved {:?} -> {:?}",
                state.workflow_id,
                current_status,
                state.status
            );
        }

        Ok(())
    }

    /// Get workflow counts by status
    pub fn counts(&self) -> Result<StatusCountMap> {
        let mut counts = StatusCountMap::new();

        for status in WorkflowStatus::ALL {
            for _ in self.list_by_status(status)? {
                counts.increment(status);
            }
        }

        Ok(counts)
    }

    /// Perform health check.
    ///
    /// A pile of unfinalized rejections means the persistence collaborator
    /// is failing; a long technical backlog only degrades.
    pub fn health_check(&self) -> Result<HealthCheckResult> {
        let counts = self.counts()?;
        let total_workflows = counts.total();

        let status = if counts.get(WorkflowStatus::RejectionRecorded) > 10 {
            HealthStatus::Unhealthy
        } else if counts.get(WorkflowStatus::AwaitingTechnical) > 50 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Ok(HealthCheckResult {
            status,
            counts,
            total_workflows,
            root_path: self.root_path.clone(),
            last_check: Utc::now(),
        })
    }
}
