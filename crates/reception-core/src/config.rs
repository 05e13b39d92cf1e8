//! Configuration management for the reception system

use std::path::Path;

use serde::{Deserialize, Serialize};

use reception_types::Role;

use crate::error::{ReceptionError, Result};

/// Main configuration structure, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceptionConfig {
    pub plant: PlantConfig,
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantConfig {
    pub name: String,
    pub site_code: String,
}

/// Static staff directory standing in for the external identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub staff: Vec<StaffEntry>,

    /// Name of the actor the session runs as; must appear in `staff`
    pub current_actor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffEntry {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    crate::paths::DEFAULT_RECEPTION_DATA_ROOT.to_string()
}

impl ReceptionConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReceptionError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReceptionConfig = serde_json::from_str(json)
            .map_err(|e| ReceptionError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.plant.name.is_empty() {
            return Err(ReceptionError::Config("Plant name is required".to_string()));
        }

        if self.directory.staff.is_empty() {
            return Err(ReceptionError::Config(
                "Staff directory must contain at least one entry".to_string(),
            ));
        }

        if !self
            .directory
            .staff
            .iter()
            .any(|entry| entry.role == Role::TechnicalResponsibility)
        {
            return Err(ReceptionError::Config(
                "Staff directory needs at least one technical-responsibility member".to_string(),
            ));
        }

        if !self
            .directory
            .staff
            .iter()
            .any(|entry| entry.name == self.directory.current_actor)
        {
            return Err(ReceptionError::Config(format!(
                "Current actor '{}' is not in the staff directory",
                self.directory.current_actor
            )));
        }

        Ok(())
    }
}
