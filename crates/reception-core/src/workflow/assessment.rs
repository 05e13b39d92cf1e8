//! Phase 1: technical quality assessment
//!
//! A strictly ordered four-step inspection. Every step stays disabled until
//! the previous one produced its required evidence; callers consult the
//! `can_*` guards to drive their controls and the mutating operations refuse
//! to run out of order. Submitting consumes the assessment, so the verdict
//! record is emitted exactly once.

use chrono::Utc;

use reception_types::{
    ActorIdentity, GravelInspection, HumidityTest, MaterialGrade, QualityCheckData, QualityStatus,
};

use crate::error::{ReceptionError, Result};
use crate::roles::{Capability, RoleAccessPolicy};

use super::traits::{EvidenceCapture, EvidenceKind};

/// Position inside the ordered inspection procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStep {
    SelectTechnician,
    HumidityTest,
    MaterialGrading,
    Verdict,
}

/// Snapshot the technician reviews before choosing a verdict
#[derive(Debug, Clone)]
pub struct AssessmentSummary {
    pub technician: ActorIdentity,
    pub humidity: HumidityTest,
    pub gravel: GravelInspection,
}

/// Phase 1 engine for one delivery
pub struct QualityAssessment {
    order_id: String,
    policy: RoleAccessPolicy,
    step: AssessmentStep,
    technician: Option<ActorIdentity>,
    humidity_photo_captured: bool,
    humidity: Option<HumidityTest>,
    gravel_photo_captured: bool,
    gravel: Option<GravelInspection>,
}

impl QualityAssessment {
    pub fn new(order_id: impl Into<String>, policy: RoleAccessPolicy) -> Self {
        Self {
            order_id: order_id.into(),
            policy,
            step: AssessmentStep::SelectTechnician,
            technician: None,
            humidity_photo_captured: false,
            humidity: None,
            gravel_photo_captured: false,
            gravel: None,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn current_step(&self) -> AssessmentStep {
        self.step
    }

    fn require_step(&self, expected: AssessmentStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ReceptionError::Validation(format!(
                "Step {:?} is not active (current step: {:?})",
                expected, self.step
            )))
        }
    }

    /// Step 1: choose the acting inspector from the technical pool
    pub fn select_technician(&mut self, actor: ActorIdentity) -> Result<()> {
        self.require_step(AssessmentStep::SelectTechnician)?;
        self.policy.require(&actor, Capability::PerformQualityCheck)?;

        log::info!(
            "Order {}: technician '{}' selected for inspection",
            self.order_id,
            actor.name
        );
        self.technician = Some(actor);
        self.step = AssessmentStep::HumidityTest;
        Ok(())
    }

    /// Run the humidity photo capture and record its result
    pub async fn capture_humidity_photo(&mut self, capture: &dyn EvidenceCapture) -> Result<bool> {
        self.require_step(AssessmentStep::HumidityTest)?;
        let captured = capture
            .capture_photo(&self.order_id, EvidenceKind::Humidity)
            .await?;
        self.attach_humidity_photo(captured)?;
        Ok(captured)
    }

    /// Record the resolved capture flag; a `false` result keeps the reading
    /// field disabled rather than erroring.
    pub fn attach_humidity_photo(&mut self, captured: bool) -> Result<()> {
        self.require_step(AssessmentStep::HumidityTest)?;
        self.humidity_photo_captured = captured;
        Ok(())
    }

    /// The numeric reading is only usable once a photo exists
    pub fn can_record_reading(&self) -> bool {
        self.step == AssessmentStep::HumidityTest && self.humidity_photo_captured
    }

    /// Step 2: record the humidity reading and advance to grading.
    ///
    /// A high reading does not block progression; it only flags elevated
    /// risk feeding the final verdict.
    pub fn record_humidity_reading(&mut self, reading: f64) -> Result<()> {
        if !self.can_record_reading() {
            return Err(ReceptionError::Validation(
                "Humidity photo must be captured before recording a reading".to_string(),
            ));
        }

        let test = HumidityTest::new(self.humidity_photo_captured, reading)
            .map_err(ReceptionError::Validation)?;

        if test.is_high_humidity() {
            log::warn!(
                "Order {}: elevated humidity reading {}",
                self.order_id,
                reading
            );
        }

        self.humidity = Some(test);
        self.step = AssessmentStep::MaterialGrading;
        Ok(())
    }

    /// Run the gravel photo capture and record its result
    pub async fn capture_gravel_photo(&mut self, capture: &dyn EvidenceCapture) -> Result<bool> {
        self.require_step(AssessmentStep::MaterialGrading)?;
        let captured = capture
            .capture_photo(&self.order_id, EvidenceKind::Gravel)
            .await?;
        self.attach_gravel_photo(captured)?;
        Ok(captured)
    }

    pub fn attach_gravel_photo(&mut self, captured: bool) -> Result<()> {
        self.require_step(AssessmentStep::MaterialGrading)?;
        self.gravel_photo_captured = captured;
        Ok(())
    }

    pub fn can_select_grade(&self) -> bool {
        self.step == AssessmentStep::MaterialGrading && self.gravel_photo_captured
    }

    /// Step 3: grade the material and advance to the verdict
    pub fn select_grade(&mut self, grade: MaterialGrade) -> Result<()> {
        if !self.can_select_grade() {
            return Err(ReceptionError::Validation(
                "Material photo must be captured before selecting a grade".to_string(),
            ));
        }

        self.gravel = Some(GravelInspection {
            photo_captured: self.gravel_photo_captured,
            grade,
        });
        self.step = AssessmentStep::Verdict;
        Ok(())
    }

    /// The captured evidence, available once both tests are complete
    pub fn summary(&self) -> Option<AssessmentSummary> {
        match (&self.technician, &self.humidity, &self.gravel) {
            (Some(technician), Some(humidity), Some(gravel)) => Some(AssessmentSummary {
                technician: technician.clone(),
                humidity: humidity.clone(),
                gravel: gravel.clone(),
            }),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.step == AssessmentStep::Verdict
    }

    /// Step 4: emit the immutable verdict record and end Phase 1.
    ///
    /// Consumes the assessment: there is exactly one submission per
    /// inspection run.
    pub fn submit(self, status: QualityStatus, notes: Option<String>) -> Result<QualityCheckData> {
        if !self.can_submit() {
            return Err(ReceptionError::Validation(format!(
                "Assessment cannot be submitted at step {:?}",
                self.step
            )));
        }

        // Guards above guarantee these are set by the time Verdict is active
        let technician = self
            .technician
            .ok_or_else(|| ReceptionError::Workflow("Missing technician".to_string()))?;
        let humidity = self
            .humidity
            .ok_or_else(|| ReceptionError::Workflow("Missing humidity test".to_string()))?;
        let gravel = self
            .gravel
            .ok_or_else(|| ReceptionError::Workflow("Missing gravel inspection".to_string()))?;

        log::info!(
            "Order {}: quality verdict {:?} by '{}'",
            self.order_id,
            status,
            technician.name
        );

        Ok(QualityCheckData {
            humidity,
            gravel,
            status,
            notes,
            technician,
            recorded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reception_types::Role;

    struct FixedCapture {
        result: bool,
    }

    #[async_trait]
    impl EvidenceCapture for FixedCapture {
        async fn capture_photo(&self, _order_id: &str, _kind: EvidenceKind) -> Result<bool> {
            Ok(self.result)
        }
    }

    fn technician() -> ActorIdentity {
        ActorIdentity::new("Karim Benali", Role::TechnicalResponsibility)
    }

    fn assessment() -> QualityAssessment {
        QualityAssessment::new("REC-001", RoleAccessPolicy::standard())
    }

    #[test]
    fn test_steps_are_strictly_ordered() {
        let mut a = assessment();
        assert_eq!(a.current_step(), AssessmentStep::SelectTechnician);

        // Nothing else is usable before a technician is chosen
        assert!(a.attach_humidity_photo(true).is_err());
        assert!(a.record_humidity_reading(12.0).is_err());
        assert!(a.select_grade(MaterialGrade::Medium).is_err());
        assert!(!a.can_submit());

        a.select_technician(technician()).unwrap();
        assert_eq!(a.current_step(), AssessmentStep::HumidityTest);
    }

    #[test]
    fn test_front_desk_cannot_act_as_technician() {
        let mut a = assessment();
        let err = a
            .select_technician(ActorIdentity::new("Sonia Mhiri", Role::FrontDesk))
            .unwrap_err();
        assert!(matches!(err, ReceptionError::Policy(_)));
    }

    #[test]
    fn test_reading_requires_photo() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();

        assert!(!a.can_record_reading());
        assert!(a.record_humidity_reading(12.0).is_err());

        a.attach_humidity_photo(true).unwrap();
        assert!(a.can_record_reading());
        a.record_humidity_reading(12.0).unwrap();
        assert_eq!(a.current_step(), AssessmentStep::MaterialGrading);
    }

    #[test]
    fn test_failed_capture_keeps_reading_disabled() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();

        a.attach_humidity_photo(false).unwrap();
        assert!(!a.can_record_reading());
        assert!(a.record_humidity_reading(12.0).is_err());
    }

    #[test]
    fn test_reading_out_of_range_rejected() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();
        a.attach_humidity_photo(true).unwrap();

        assert!(a.record_humidity_reading(0.0).is_err());
        assert!(a.record_humidity_reading(-1.0).is_err());
        assert!(a.record_humidity_reading(31.0).is_err());
        // Still at the humidity step after a rejected reading
        assert_eq!(a.current_step(), AssessmentStep::HumidityTest);
    }

    #[test]
    fn test_high_reading_does_not_block_progression() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();
        a.attach_humidity_photo(true).unwrap();

        a.record_humidity_reading(18.0).unwrap();
        assert_eq!(a.current_step(), AssessmentStep::MaterialGrading);
    }

    #[test]
    fn test_grade_requires_photo() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();
        a.attach_humidity_photo(true).unwrap();
        a.record_humidity_reading(12.0).unwrap();

        assert!(!a.can_select_grade());
        assert!(a.select_grade(MaterialGrade::Coarse).is_err());

        a.attach_gravel_photo(true).unwrap();
        a.select_grade(MaterialGrade::Coarse).unwrap();
        assert!(a.can_submit());
    }

    #[tokio::test]
    async fn test_full_run_emits_verdict() {
        let capture = FixedCapture { result: true };
        let mut a = assessment();

        a.select_technician(technician()).unwrap();
        assert!(a.capture_humidity_photo(&capture).await.unwrap());
        a.record_humidity_reading(18.0).unwrap();
        assert!(a.capture_gravel_photo(&capture).await.unwrap());
        a.select_grade(MaterialGrade::Medium).unwrap();

        let summary = a.summary().unwrap();
        assert!(summary.humidity.is_high_humidity());
        assert_eq!(summary.gravel.grade, MaterialGrade::Medium);

        let check = a
            .submit(QualityStatus::AVerifier, Some("elevated humidity".to_string()))
            .unwrap();
        assert_eq!(check.status, QualityStatus::AVerifier);
        assert_eq!(check.technician.name, "Karim Benali");
        assert!(check.humidity.is_high_humidity());
    }

    #[tokio::test]
    async fn test_unresolved_capture_leaves_step_disabled() {
        let capture = FixedCapture { result: false };
        let mut a = assessment();

        a.select_technician(technician()).unwrap();
        assert!(!a.capture_humidity_photo(&capture).await.unwrap());
        assert!(!a.can_record_reading());
    }

    #[test]
    fn test_submit_requires_verdict_step() {
        let mut a = assessment();
        a.select_technician(technician()).unwrap();

        let err = a.submit(QualityStatus::Conforme, None).unwrap_err();
        assert!(matches!(err, ReceptionError::Validation(_)));
    }
}
