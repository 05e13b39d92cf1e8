//! Phase 2: the validation gate
//!
//! Derives, purely from the verdict and the sub-flow outputs, whether
//! commercial validation is currently permitted, routes the workflow through
//! the verification and rejection sub-flows, and drives the terminal
//! transition through the persistence collaborator.

use reception_types::{
    ActorIdentity, QualityCheckData, QualityStatus, ReceptionOutcome, RejectionFormData,
    StockReceptionOrder, VerificationAction, VerificationFormData,
};

use crate::error::{ReceptionError, Result};
use crate::roles::{Capability, RoleAccessPolicy};

use super::state::{ReceptionPhase, WorkflowState, WorkflowStatus};
use super::subflows::evidence_ready;
use super::traits::ReceptionPersistence;

/// Snapshot handed to the rendering layer while a workflow is in progress
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowProgress {
    pub phase: ReceptionPhase,
    pub status: WorkflowStatus,
    pub can_validate: bool,
    pub is_blocked: bool,
    pub blocking_reason: Option<&'static str>,
}

/// Whether commercial validation is currently permitted.
///
/// Pure function of the verdict and the sub-flow outputs carried by the
/// aggregate; never of any UI flag. True iff the verdict is `conforme`, or
/// `a_verifier` resolved by a verification recommending acceptance. A
/// `non_conforme` verdict is never validatable.
pub fn can_validate(state: &WorkflowState) -> bool {
    let Some(check) = &state.quality_check else {
        return false;
    };

    match check.status {
        QualityStatus::Conforme => true,
        QualityStatus::AVerifier => matches!(
            state.verification_form.as_ref().map(|f| f.action),
            Some(VerificationAction::AcceptWithConditions)
        ),
        QualityStatus::NonConforme => false,
    }
}

/// Whether the front desk is blocked waiting on an outstanding form or a
/// fresh inspection. Pure over the same aggregate fields as `can_validate`.
pub fn is_blocked(state: &WorkflowState) -> bool {
    blocking_reason(state).is_some()
}

/// The reason the front desk is blocked, if it is
pub fn blocking_reason(state: &WorkflowState) -> Option<&'static str> {
    let check = state.quality_check.as_ref()?;

    match check.status {
        QualityStatus::Conforme => None,
        QualityStatus::AVerifier => match state.verification_form.as_ref().map(|f| f.action) {
            None => Some("verification form outstanding"),
            Some(VerificationAction::AcceptWithConditions) => None,
            Some(VerificationAction::Reject) => {
                if state.rejection_form.is_none() {
                    Some("rejection form outstanding")
                } else {
                    None
                }
            }
            Some(VerificationAction::RequestNewInspection) => {
                Some("awaiting new technical inspection")
            }
        },
        QualityStatus::NonConforme => {
            if state.rejection_form.is_none() {
                Some("rejection form outstanding")
            } else {
                None
            }
        }
    }
}

/// Phase 2 engine
///
/// Holds the injected role policy and the persistence collaborator; all
/// mutation of a `WorkflowState` past Phase 1 goes through here.
pub struct ValidationGate<P: ReceptionPersistence> {
    policy: RoleAccessPolicy,
    persistence: P,
}

impl<P: ReceptionPersistence> ValidationGate<P> {
    pub fn new(policy: RoleAccessPolicy, persistence: P) -> Self {
        Self { policy, persistence }
    }

    /// Open a workflow for a delivery awaiting its technical inspection
    pub fn open(&self, order: StockReceptionOrder) -> WorkflowState {
        WorkflowState::new(order)
    }

    /// Progress tuple for rendering: `(phase, status, can_validate,
    /// is_blocked)` plus the blocking reason. Terminal workflows never
    /// offer a quantity-confirmation action, and neither does a workflow
    /// with an outcome staged for a finalize retry.
    pub fn progress(&self, state: &WorkflowState) -> WorkflowProgress {
        WorkflowProgress {
            phase: state.phase(),
            status: state.status,
            can_validate: can_validate(state)
                && !state.is_terminal()
                && state.pending_outcome.is_none(),
            is_blocked: is_blocked(state),
            blocking_reason: blocking_reason(state),
        }
    }

    fn ensure_mutable(state: &WorkflowState) -> Result<()> {
        if state.is_terminal() {
            Err(ReceptionError::Terminal(format!(
                "Workflow {} is {:?} and accepts no further mutation",
                state.workflow_id, state.status
            )))
        } else {
            Ok(())
        }
    }

    /// Enter Phase 2 with the immutable Phase-1 verdict.
    ///
    /// Also accepts a fresh verdict from `VerifiedReinspect`: a new
    /// inspection replaces the stale verdict and clears the verification
    /// form that demanded it.
    pub fn record_quality_check(
        &self,
        state: &mut WorkflowState,
        check: QualityCheckData,
    ) -> Result<WorkflowStatus> {
        Self::ensure_mutable(state)?;
        self.policy
            .require(&check.technician, Capability::PerformQualityCheck)?;

        match state.status {
            WorkflowStatus::AwaitingTechnical => {}
            WorkflowStatus::VerifiedReinspect => {
                state.verification_form = None;
            }
            other => {
                return Err(ReceptionError::Workflow(format!(
                    "Workflow {} already holds a verdict (status {:?})",
                    state.workflow_id, other
                )));
            }
        }

        let status = match check.status {
            QualityStatus::Conforme => WorkflowStatus::VerdictConforme,
            QualityStatus::AVerifier => WorkflowStatus::VerdictNeedsVerification,
            QualityStatus::NonConforme => WorkflowStatus::VerdictNonConforme,
        };

        log::info!(
            "Workflow {}: verdict {:?} recorded, entering {:?}",
            state.workflow_id,
            check.status,
            status
        );

        state.quality_check = Some(check);
        state.status = status;
        state.touch();
        Ok(status)
    }

    /// Apply a submitted verification form and route by its action
    pub fn record_verification(
        &self,
        state: &mut WorkflowState,
        form: VerificationFormData,
    ) -> Result<WorkflowStatus> {
        Self::ensure_mutable(state)?;
        self.policy
            .require(&form.submitted_by, Capability::FillVerificationForm)?;

        if state.status != WorkflowStatus::VerdictNeedsVerification {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} does not await verification (status {:?})",
                state.workflow_id, state.status
            )));
        }
        if state.verification_form.is_some() {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} already holds a verification form",
                state.workflow_id
            )));
        }
        // forms arrive from outside the sub-flow too (store, wire), so the
        // evidence contract is re-checked here
        if !evidence_ready(&form.reason, form.photo_captured, Some(form.action)) {
            return Err(ReceptionError::Validation(format!(
                "Workflow {} received a verification form without its evidence",
                state.workflow_id
            )));
        }

        let status = match form.action {
            VerificationAction::AcceptWithConditions => WorkflowStatus::VerifiedAccepted,
            VerificationAction::Reject => WorkflowStatus::VerifiedRejected,
            VerificationAction::RequestNewInspection => WorkflowStatus::VerifiedReinspect,
        };

        log::info!(
            "Workflow {}: verification action {:?}, entering {:?}",
            state.workflow_id,
            form.action,
            status
        );

        state.verification_form = Some(form);
        state.status = status;
        state.touch();
        Ok(status)
    }

    /// Apply a submitted rejection form and drive the terminal transition.
    ///
    /// On persistence failure the workflow stays in `RejectionRecorded`
    /// with the outcome staged, so `retry_finalize` can complete it without
    /// redoing any form.
    pub async fn record_rejection(
        &self,
        state: &mut WorkflowState,
        form: RejectionFormData,
    ) -> Result<ReceptionOutcome> {
        Self::ensure_mutable(state)?;
        self.policy
            .require(&form.submitted_by, Capability::FillRejectionForm)?;

        if !matches!(
            state.status,
            WorkflowStatus::VerdictNonConforme | WorkflowStatus::VerifiedRejected
        ) {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} does not accept a rejection form (status {:?})",
                state.workflow_id, state.status
            )));
        }
        if state.rejection_form.is_some() {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} already holds a rejection form",
                state.workflow_id
            )));
        }
        if !evidence_ready(&form.reason, form.photo_captured, Some(form.action)) {
            return Err(ReceptionError::Validation(format!(
                "Workflow {} received a rejection form without its evidence",
                state.workflow_id
            )));
        }

        let outcome = ReceptionOutcome::Rejected {
            order_id: state.order.id.clone(),
            form: form.clone(),
        };

        state.rejection_form = Some(form);
        state.status = WorkflowStatus::RejectionRecorded;
        state.pending_outcome = Some(outcome);
        state.touch();

        log::info!(
            "Workflow {}: rejection recorded, finalizing",
            state.workflow_id
        );
        self.finalize(state).await
    }

    /// Commercial validation: confirm the received quantity and drive the
    /// terminal transition. Refused while the gate is blocked, before any
    /// verdict exists, and for non-positive quantities.
    pub async fn confirm_quantity(
        &self,
        state: &mut WorkflowState,
        quantity: f64,
        actor: &ActorIdentity,
    ) -> Result<ReceptionOutcome> {
        Self::ensure_mutable(state)?;
        self.policy.require(actor, Capability::Validate)?;

        if state.quality_check.is_none() {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} cannot be validated before the technical inspection",
                state.workflow_id
            )));
        }
        if state.pending_outcome.is_some() {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} has an unfinalized outcome; retry finalize instead",
                state.workflow_id
            )));
        }
        if !can_validate(state) {
            let reason = blocking_reason(state).unwrap_or("verdict forbids validation");
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} is not validatable: {}",
                state.workflow_id, reason
            )));
        }
        // !(q > 0) also rejects NaN
        if !quantity.is_finite() || !(quantity > 0.0) {
            return Err(ReceptionError::Validation(format!(
                "Confirmed quantity must be positive (got {})",
                quantity
            )));
        }

        let total_amount = quantity * state.order.unit_price;
        let outcome = ReceptionOutcome::Validated {
            order_id: state.order.id.clone(),
            confirmed_quantity: quantity,
            total_amount,
        };

        state.confirmed_quantity = Some(quantity);
        state.pending_outcome = Some(outcome);
        state.touch();

        log::info!(
            "Workflow {}: quantity {} confirmed, total {}, finalizing",
            state.workflow_id,
            quantity,
            total_amount
        );
        self.finalize(state).await
    }

    /// Retry a finalize that previously failed, without redoing the workflow
    pub async fn retry_finalize(&self, state: &mut WorkflowState) -> Result<ReceptionOutcome> {
        Self::ensure_mutable(state)?;
        if state.pending_outcome.is_none() {
            return Err(ReceptionError::Workflow(format!(
                "Workflow {} has no outcome awaiting finalize",
                state.workflow_id
            )));
        }
        self.finalize(state).await
    }

    /// Hand the staged outcome to the persistence collaborator exactly once
    /// per workflow; only a successful call reaches the terminal status.
    async fn finalize(&self, state: &mut WorkflowState) -> Result<ReceptionOutcome> {
        let outcome = state
            .pending_outcome
            .clone()
            .ok_or_else(|| ReceptionError::Workflow("No outcome staged".to_string()))?;

        if let Err(e) = self.persistence.finalize(&outcome).await {
            log::error!(
                "Workflow {}: finalize failed, state preserved for retry: {}",
                state.workflow_id,
                e
            );
            return Err(e);
        }

        state.status = match outcome {
            ReceptionOutcome::Validated { .. } => WorkflowStatus::Validated,
            ReceptionOutcome::Rejected { .. } => WorkflowStatus::Rejected,
        };
        state.pending_outcome = None;
        state.touch();

        log::info!(
            "Workflow {}: finalized as {:?}",
            state.workflow_id,
            state.status
        );
        Ok(outcome)
    }
}
