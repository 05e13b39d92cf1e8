//! Static staff directory backed by the configuration file
//!
//! Stands in for the plant's external identity provider; the workflow only
//! ever asks for the current actor and the technician pool.

use async_trait::async_trait;

use reception_types::{ActorIdentity, Role};

use crate::config::DirectoryConfig;
use crate::error::{ReceptionError, Result};
use crate::workflow::IdentityDirectory;

#[derive(Debug)]
pub struct StaticDirectory {
    staff: Vec<ActorIdentity>,
    current: ActorIdentity,
}

impl StaticDirectory {
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        let staff: Vec<ActorIdentity> = config
            .staff
            .iter()
            .map(|entry| ActorIdentity::new(entry.name.clone(), entry.role))
            .collect();

        let current = staff
            .iter()
            .find(|actor| actor.name == config.current_actor)
            .cloned()
            .ok_or_else(|| {
                ReceptionError::Config(format!(
                    "Current actor '{}' is not in the staff directory",
                    config.current_actor
                ))
            })?;

        Ok(Self { staff, current })
    }
}

#[async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn current_actor(&self) -> Result<ActorIdentity> {
        Ok(self.current.clone())
    }

    async fn technicians(&self) -> Result<Vec<ActorIdentity>> {
        Ok(self
            .staff
            .iter()
            .filter(|actor| actor.role == Role::TechnicalResponsibility)
            .cloned()
            .collect())
    }
}
