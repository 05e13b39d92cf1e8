/// Path constants and utilities for the reception data tree
use std::path::PathBuf;

use once_cell::sync::OnceCell;

use crate::workflow::WorkflowStatus;

// Static storage for the configurable data root
static DATA_ROOT: OnceCell<String> = OnceCell::new();

pub const DEFAULT_RECEPTION_DATA_ROOT: &str = "/data/receptions";

/// Initialize the data root directory. Can only be called once.
/// If not called, the default `/data/receptions` will be used.
pub fn init_data_root(path: String) -> Result<(), String> {
    DATA_ROOT
        .set(path)
        .map_err(|_| "Data root already initialized".to_string())
}

/// Get the configured data root or the default
fn get_data_root() -> &'static str {
    DATA_ROOT
        .get()
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_RECEPTION_DATA_ROOT)
}

pub fn reception_data_root() -> PathBuf {
    PathBuf::from(get_data_root())
}

/// Directory holding workflows in the given status
pub fn status_dir(status: WorkflowStatus) -> PathBuf {
    reception_data_root().join(status.directory_name())
}

/// Get all directories that should exist for the reception system
pub fn all_reception_directories() -> Vec<PathBuf> {
    let mut dirs = vec![reception_data_root()];
    dirs.extend(WorkflowStatus::ALL.iter().map(|status| status_dir(*status)));
    dirs
}
