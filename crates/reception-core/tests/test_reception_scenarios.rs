//! End-to-end reception scenarios: Phase 1 inspection through terminal
//! validation or rejection, with mocked collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use reception_core::workflow::{
    EvidenceCapture, EvidenceKind, QualityAssessment, ReceptionPersistence, ValidationGate,
    VerificationSubflow, RejectionSubflow, WorkflowStatus,
};
use reception_core::{ReceptionError, Result, RoleAccessPolicy};
use reception_types::{
    ActorIdentity, MaterialGrade, QualityStatus, ReceptionOutcome, RejectionAction, Role,
    StockReceptionOrder, VerificationAction,
};

struct InstantCapture;

#[async_trait]
impl EvidenceCapture for InstantCapture {
    async fn capture_photo(&self, _order_id: &str, _kind: EvidenceKind) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Default)]
struct MemoryPersistence {
    finalized: Mutex<Vec<ReceptionOutcome>>,
}

#[async_trait]
impl ReceptionPersistence for MemoryPersistence {
    async fn finalize(&self, outcome: &ReceptionOutcome) -> Result<()> {
        let mut finalized = self.finalized.lock().unwrap();
        // idempotent keyed by order id
        if !finalized.iter().any(|o| o.order_id() == outcome.order_id()) {
            finalized.push(outcome.clone());
        }
        Ok(())
    }
}

fn order(quantity: f64, unit_price: f64) -> StockReceptionOrder {
    StockReceptionOrder {
        id: "REC-2001".to_string(),
        supplier: "Carriere du Nord".to_string(),
        material: "Gravel 8/16".to_string(),
        quantity,
        unit: "t".to_string(),
        unit_price,
        date: Utc::now(),
    }
}

fn technician() -> ActorIdentity {
    ActorIdentity::new("Karim Benali", Role::TechnicalResponsibility)
}

fn front_desk() -> ActorIdentity {
    ActorIdentity::new("Sonia Mhiri", Role::FrontDesk)
}

/// Run the full Phase 1 inspection and return the verdict record
async fn run_inspection(
    order_id: &str,
    reading: f64,
    status: QualityStatus,
) -> reception_types::QualityCheckData {
    let capture = InstantCapture;
    let mut assessment = QualityAssessment::new(order_id, RoleAccessPolicy::standard());

    assessment.select_technician(technician()).unwrap();
    assert!(assessment.capture_humidity_photo(&capture).await.unwrap());
    assessment.record_humidity_reading(reading).unwrap();
    assert!(assessment.capture_gravel_photo(&capture).await.unwrap());
    assessment.select_grade(MaterialGrade::Medium).unwrap();

    assessment.submit(status, None).unwrap()
}

#[tokio::test]
async fn test_conforme_delivery_validates_immediately() {
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), MemoryPersistence::default());
    let mut state = gate.open(order(10.0, 100.0));

    let check = run_inspection("REC-2001", 10.0, QualityStatus::Conforme).await;
    gate.record_quality_check(&mut state, check).unwrap();

    let progress = gate.progress(&state);
    assert!(progress.can_validate);
    assert!(!progress.is_blocked);

    let outcome = gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReceptionOutcome::Validated {
            order_id: "REC-2001".to_string(),
            confirmed_quantity: 10.0,
            total_amount: 1000.0,
        }
    );
    assert_eq!(state.status, WorkflowStatus::Validated);
}

#[tokio::test]
async fn test_high_humidity_verification_accepts_with_conditions() {
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), MemoryPersistence::default());
    let mut state = gate.open(order(10.0, 50.0));

    let check = run_inspection("REC-2001", 18.0, QualityStatus::AVerifier).await;
    assert!(check.humidity.is_high_humidity());
    gate.record_quality_check(&mut state, check).unwrap();

    // front desk is blocked until the verification form is in
    let progress = gate.progress(&state);
    assert!(progress.is_blocked);
    assert!(!progress.can_validate);
    assert_eq!(progress.blocking_reason, Some("verification form outstanding"));

    let policy = RoleAccessPolicy::standard();
    let mut subflow = VerificationSubflow::new();
    let form = subflow
        .submit(
            &policy,
            "acceptable".to_string(),
            true,
            Some(VerificationAction::AcceptWithConditions),
            None,
            &front_desk(),
        )
        .unwrap();

    let status = gate.record_verification(&mut state, form).unwrap();
    assert_eq!(status, WorkflowStatus::VerifiedAccepted);
    assert!(gate.progress(&state).can_validate);

    let outcome = gate
        .confirm_quantity(&mut state, 9.5, &front_desk())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReceptionOutcome::Validated {
            order_id: "REC-2001".to_string(),
            confirmed_quantity: 9.5,
            total_amount: 475.0,
        }
    );
    assert_eq!(state.status, WorkflowStatus::Validated);
}

#[tokio::test]
async fn test_verification_reject_requires_rejection_form() {
    let persistence = MemoryPersistence::default();
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), persistence);
    let mut state = gate.open(order(10.0, 100.0));

    let check = run_inspection("REC-2001", 16.0, QualityStatus::AVerifier).await;
    gate.record_quality_check(&mut state, check).unwrap();

    let policy = RoleAccessPolicy::standard();
    let mut verification = VerificationSubflow::new();
    let form = verification
        .submit(
            &policy,
            "quality doubtful".to_string(),
            true,
            Some(VerificationAction::Reject),
            None,
            &front_desk(),
        )
        .unwrap();

    let status = gate.record_verification(&mut state, form).unwrap();
    assert_eq!(status, WorkflowStatus::VerifiedRejected);

    // rejection form is now mandatory; validation stays refused
    assert!(gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .is_err());

    let mut rejection = RejectionSubflow::new();
    let form = rejection
        .submit(
            &policy,
            "fines excessive".to_string(),
            true,
            Some(RejectionAction::ReturnToSupplier),
            None,
            &front_desk(),
        )
        .unwrap();

    let outcome = gate.record_rejection(&mut state, form).await.unwrap();
    assert!(matches!(outcome, ReceptionOutcome::Rejected { .. }));
    assert_eq!(state.status, WorkflowStatus::Rejected);
    assert!(state.confirmed_quantity.is_none());
}

#[tokio::test]
async fn test_non_conforme_delivery_is_permanently_blocked() {
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), MemoryPersistence::default());
    let mut state = gate.open(order(10.0, 100.0));

    let check = run_inspection("REC-2001", 12.0, QualityStatus::NonConforme).await;
    gate.record_quality_check(&mut state, check).unwrap();

    let progress = gate.progress(&state);
    assert!(progress.is_blocked);
    assert!(!progress.can_validate);
    assert_eq!(progress.blocking_reason, Some("rejection form outstanding"));

    // no validation path exists from a non-compliant verdict
    assert!(gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .is_err());

    let policy = RoleAccessPolicy::standard();
    let mut rejection = RejectionSubflow::new();
    let form = rejection
        .submit(
            &policy,
            "wrong granulometry".to_string(),
            true,
            Some(RejectionAction::ReturnToSupplier),
            None,
            &front_desk(),
        )
        .unwrap();

    gate.record_rejection(&mut state, form).await.unwrap();
    assert_eq!(state.status, WorkflowStatus::Rejected);
}

#[tokio::test]
async fn test_request_new_inspection_leaves_no_validation_path() {
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), MemoryPersistence::default());
    let mut state = gate.open(order(10.0, 100.0));

    let check = run_inspection("REC-2001", 18.0, QualityStatus::AVerifier).await;
    gate.record_quality_check(&mut state, check).unwrap();

    let policy = RoleAccessPolicy::standard();
    let mut verification = VerificationSubflow::new();
    let form = verification
        .submit(
            &policy,
            "reading implausible".to_string(),
            true,
            Some(VerificationAction::RequestNewInspection),
            None,
            &front_desk(),
        )
        .unwrap();

    let status = gate.record_verification(&mut state, form).unwrap();
    assert_eq!(status, WorkflowStatus::VerifiedReinspect);

    let progress = gate.progress(&state);
    assert!(progress.is_blocked);
    assert!(!progress.can_validate);

    // still blocked until a fresh Phase 1 verdict arrives
    assert!(gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .is_err());

    // a fresh inspection re-opens the gate
    let check = run_inspection("REC-2001", 11.0, QualityStatus::Conforme).await;
    gate.record_quality_check(&mut state, check).unwrap();

    let outcome = gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .unwrap();
    assert!(matches!(outcome, ReceptionOutcome::Validated { .. }));
}

#[tokio::test]
async fn test_finalize_is_idempotent_keyed_by_order_id() {
    let gate = ValidationGate::new(RoleAccessPolicy::standard(), MemoryPersistence::default());
    let mut state = gate.open(order(10.0, 100.0));

    let check = run_inspection("REC-2001", 10.0, QualityStatus::Conforme).await;
    gate.record_quality_check(&mut state, check).unwrap();
    gate.confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .unwrap();

    // a second confirmation attempt is refused outright
    let err = gate
        .confirm_quantity(&mut state, 10.0, &front_desk())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceptionError::Terminal(_)));
}

#[tokio::test]
async fn test_dropping_a_capture_future_leaves_step_disabled() {
    use std::time::Duration;

    struct SlowCapture;

    #[async_trait]
    impl EvidenceCapture for SlowCapture {
        async fn capture_photo(&self, _order_id: &str, _kind: EvidenceKind) -> Result<bool> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }
    }

    let capture = SlowCapture;
    let mut assessment = QualityAssessment::new("REC-2001", RoleAccessPolicy::standard());
    assessment.select_technician(technician()).unwrap();

    // abandon the capture mid-flight
    {
        let pending = assessment.capture_humidity_photo(&capture);
        let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;
        assert!(timed_out.is_err());
    }

    // the dependent control stays disabled; the step is not wedged
    assert!(!assessment.can_record_reading());
    assert!(assessment.attach_humidity_photo(true).is_ok());
    assert!(assessment.can_record_reading());
}
