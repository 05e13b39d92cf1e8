//! Evidence-collection sub-flows entered conditionally from the gate
//!
//! Verification and rejection share one contract: a non-empty reason, a
//! captured photo and a chosen action enable the submit; any missing field
//! keeps it disabled. Each sub-flow's output is write-once per workflow
//! instance.

use chrono::Utc;

use reception_types::{
    ActorIdentity, EvidenceForm, RejectionAction, RejectionFormData, VerificationAction,
    VerificationFormData,
};

use crate::error::{ReceptionError, Result};
use crate::roles::{Capability, RoleAccessPolicy};

pub(crate) fn evidence_ready<A>(reason: &str, photo_captured: bool, action: Option<A>) -> bool {
    !reason.trim().is_empty() && photo_captured && action.is_some()
}

#[allow(clippy::too_many_arguments)]
fn submit_evidence<A: Copy>(
    policy: &RoleAccessPolicy,
    capability: Capability,
    stored: &mut Option<EvidenceForm<A>>,
    label: &str,
    reason: String,
    photo_captured: bool,
    action: Option<A>,
    notes: Option<String>,
    actor: &ActorIdentity,
) -> Result<EvidenceForm<A>> {
    if stored.is_some() {
        return Err(ReceptionError::Workflow(format!(
            "{} form was already submitted",
            label
        )));
    }

    policy.require(actor, capability)?;

    if !evidence_ready(&reason, photo_captured, action) {
        return Err(ReceptionError::Validation(format!(
            "{} form needs a reason, a captured photo and a selected action",
            label
        )));
    }

    let form = EvidenceForm {
        reason,
        photo_captured,
        // checked by evidence_ready above
        action: action.ok_or_else(|| {
            ReceptionError::Validation(format!("{} form is missing an action", label))
        })?,
        notes,
        submitted_by: actor.clone(),
        submitted_at: Utc::now(),
    };

    *stored = Some(form.clone());
    log::info!("{} form submitted by '{}'", label, actor.name);
    Ok(form)
}

/// Front-desk justification flow for an `a_verifier` verdict
#[derive(Debug, Clone, Default)]
pub struct VerificationSubflow {
    form: Option<VerificationFormData>,
}

impl VerificationSubflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitted(&self) -> bool {
        self.form.is_some()
    }

    /// Pure guard used to enable or disable the submit control
    pub fn can_submit(reason: &str, photo_captured: bool, action: Option<VerificationAction>) -> bool {
        evidence_ready(reason, photo_captured, action)
    }

    pub fn submit(
        &mut self,
        policy: &RoleAccessPolicy,
        reason: String,
        photo_captured: bool,
        action: Option<VerificationAction>,
        notes: Option<String>,
        actor: &ActorIdentity,
    ) -> Result<VerificationFormData> {
        submit_evidence(
            policy,
            Capability::FillVerificationForm,
            &mut self.form,
            "Verification",
            reason,
            photo_captured,
            action,
            notes,
            actor,
        )
    }
}

/// Front-desk disposition flow for a non-compliant delivery
#[derive(Debug, Clone, Default)]
pub struct RejectionSubflow {
    form: Option<RejectionFormData>,
}

impl RejectionSubflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitted(&self) -> bool {
        self.form.is_some()
    }

    pub fn can_submit(reason: &str, photo_captured: bool, action: Option<RejectionAction>) -> bool {
        evidence_ready(reason, photo_captured, action)
    }

    pub fn submit(
        &mut self,
        policy: &RoleAccessPolicy,
        reason: String,
        photo_captured: bool,
        action: Option<RejectionAction>,
        notes: Option<String>,
        actor: &ActorIdentity,
    ) -> Result<RejectionFormData> {
        submit_evidence(
            policy,
            Capability::FillRejectionForm,
            &mut self.form,
            "Rejection",
            reason,
            photo_captured,
            action,
            notes,
            actor,
        )
    }
}
