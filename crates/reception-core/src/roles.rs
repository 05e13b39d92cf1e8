//! Role capability table consulted before any workflow transition

use std::collections::{HashMap, HashSet};

use reception_types::{ActorIdentity, Role};

use crate::error::{ReceptionError, Result};

/// Actions a role may or may not perform on a reception workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PerformQualityCheck,
    Validate,
    FillVerificationForm,
    FillRejectionForm,
    Override,
    UnblockFrontDesk,
}

/// Capability table per role, injected into the workflow engines
///
/// The engines never consult a global table: alternate org structures can be
/// substituted by building a custom policy with [`RoleAccessPolicy::new`].
#[derive(Debug, Clone)]
pub struct RoleAccessPolicy {
    grants: HashMap<Role, HashSet<Capability>>,
}

impl RoleAccessPolicy {
    /// Build a policy from an explicit grant table
    pub fn new(grants: HashMap<Role, HashSet<Capability>>) -> Self {
        Self { grants }
    }

    /// The standard plant table.
    ///
    /// Technical responsibility runs Phase 1 but never validates; the front
    /// desk validates and fills both sub-forms but can never unblock itself;
    /// the manager holds every capability for audit and override.
    pub fn standard() -> Self {
        let mut grants = HashMap::new();

        grants.insert(
            Role::TechnicalResponsibility,
            HashSet::from([Capability::PerformQualityCheck, Capability::UnblockFrontDesk]),
        );
        grants.insert(
            Role::FrontDesk,
            HashSet::from([
                Capability::Validate,
                Capability::FillVerificationForm,
                Capability::FillRejectionForm,
            ]),
        );
        grants.insert(
            Role::Manager,
            HashSet::from([
                Capability::PerformQualityCheck,
                Capability::Validate,
                Capability::FillVerificationForm,
                Capability::FillRejectionForm,
                Capability::Override,
                Capability::UnblockFrontDesk,
            ]),
        );

        Self { grants }
    }

    /// Answer whether `role` may perform `capability`
    pub fn can_perform(&self, role: Role, capability: Capability) -> bool {
        self.grants
            .get(&role)
            .map(|caps| caps.contains(&capability))
            .unwrap_or(false)
    }

    /// Hard check used by the engines before applying a transition
    pub fn require(&self, actor: &ActorIdentity, capability: Capability) -> Result<()> {
        if self.can_perform(actor.role, capability) {
            Ok(())
        } else {
            Err(ReceptionError::Policy(format!(
                "{} ({:?}) may not perform {:?}",
                actor.name, actor.role, capability
            )))
        }
    }
}

impl Default for RoleAccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
