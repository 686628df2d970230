//! # Wizard Scenario Tests
//!
//! End-to-end sessions against `MockKycService`: validation gating, the
//! identity check and its success cache, back navigation, submission
//! failure and success, and preview handle release.

use std::time::Duration;

use kyc_client::{
    KycApiError, KycService, KycSubmission, MockKycService, SubmitKycResponse,
    VerifyIdentityResponse,
};
use kyc_core::{FileRef, FormField, GhanaCardNumber};
use kyc_wizard::gate::VERIFY_UNAVAILABLE_MESSAGE;
use kyc_wizard::submission::SUBMIT_FAILED_MESSAGE;
use kyc_wizard::{
    ImageSlot, NextOutcome, NextStep, NotificationLevel, SubmitOutcome, SubmitStep,
    VerificationState, Wizard, WizardPhase, WizardStep,
};
use proptest::prelude::*;

const NUMBER: &str = "GHA-123456789-1";

fn jpeg(name: &str) -> Option<FileRef> {
    Some(FileRef::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF]))
}

fn fill_step_zero(w: &mut Wizard, number: &str) {
    w.set_identity_number(number).unwrap();
    w.set_identity_front_image(jpeg("front.jpg")).unwrap();
    w.set_identity_back_image(jpeg("back.jpg")).unwrap();
}

/// Drive a fresh session to the selfie step with every field valid.
async fn session_on_selfie_step(service: &MockKycService) -> Wizard {
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);
    assert_eq!(
        w.next(service).await.unwrap(),
        NextOutcome::Advanced(WizardStep::MobileMoney)
    );
    w.set_momo_number("244000000").unwrap();
    assert_eq!(
        w.next(service).await.unwrap(),
        NextOutcome::Advanced(WizardStep::Selfie)
    );
    w.set_selfie_image(jpeg("selfie.jpg")).unwrap();
    w
}

/// A service whose calls never complete.
struct StalledService;

impl KycService for StalledService {
    async fn verify_identity(
        &self,
        _number: &GhanaCardNumber,
    ) -> Result<VerifyIdentityResponse, KycApiError> {
        std::future::pending().await
    }

    async fn submit_kyc(
        &self,
        _submission: &KycSubmission,
    ) -> Result<SubmitKycResponse, KycApiError> {
        std::future::pending().await
    }

    fn service_name(&self) -> &str {
        "stalled"
    }
}

const WAIT: Duration = Duration::from_millis(20);

// ── Identity step ────────────────────────────────────────────────────

#[tokio::test]
async fn verified_number_advances_to_mobile_money() {
    let service = MockKycService::new().with_verification(VerifyIdentityResponse::verified());
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);

    let outcome = w.next(&service).await.unwrap();
    assert_eq!(outcome, NextOutcome::Advanced(WizardStep::MobileMoney));
    assert_eq!(w.verification(), &VerificationState::Verified);
    assert_eq!(
        service.verify_calls(),
        vec![GhanaCardNumber::new(NUMBER).unwrap()]
    );
}

#[tokio::test]
async fn unverified_number_stays_with_message_and_retries() {
    let service = MockKycService::new()
        .with_verification(VerifyIdentityResponse::rejected("Not found"))
        .with_verification(VerifyIdentityResponse::verified());
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);

    let outcome = w.next(&service).await.unwrap();
    assert_eq!(outcome, NextOutcome::VerificationFailed("Not found".into()));
    assert_eq!(w.current_step(), Some(WizardStep::IdentityDocument));
    assert_eq!(w.verification_error(), Some("Not found"));
    assert!(w.can_continue());

    // Failures are not cached: the retry calls the service again.
    let outcome = w.next(&service).await.unwrap();
    assert_eq!(outcome, NextOutcome::Advanced(WizardStep::MobileMoney));
    assert_eq!(service.verify_calls().len(), 2);
}

#[tokio::test]
async fn transport_fault_resolves_to_generic_failure() {
    let service = MockKycService::new().with_verification_unavailable();
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);

    match w.next(&service).await.unwrap() {
        NextOutcome::VerificationFailed(message) => {
            assert_eq!(message, kyc_wizard::gate::VERIFY_UNAVAILABLE_MESSAGE)
        }
        other => panic!("expected VerificationFailed, got: {other:?}"),
    }
    assert!(!w.is_busy());
}

#[tokio::test]
async fn malformed_number_never_reaches_the_service() {
    let service = MockKycService::new();
    let mut w = Wizard::new();
    fill_step_zero(&mut w, "GHA-12345678-1");

    match w.next(&service).await.unwrap() {
        NextOutcome::Invalid(errors) => {
            assert_eq!(
                errors.get(FormField::IdentityNumber),
                Some("Enter a valid Ghana Card number (GHA-XXXXXXXXX-X)")
            );
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected Invalid, got: {other:?}"),
    }
    assert!(service.verify_calls().is_empty());
    assert!(w.visible_errors().contains(FormField::IdentityNumber));
}

#[tokio::test]
async fn verification_is_cached_until_number_changes() {
    let service = MockKycService::new();
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);

    w.next(&service).await.unwrap();
    assert!(w.back());
    assert_eq!(
        w.next(&service).await.unwrap(),
        NextOutcome::Advanced(WizardStep::MobileMoney)
    );
    assert_eq!(service.verify_calls().len(), 1);

    // A new value needs its own check.
    assert!(w.back());
    w.set_identity_number("GHA-987654321-0").unwrap();
    assert_eq!(w.verification(), &VerificationState::NotStarted);
    w.next(&service).await.unwrap();
    assert_eq!(service.verify_calls().len(), 2);

    // Going back to the first value is a change too.
    assert!(w.back());
    w.set_identity_number(NUMBER).unwrap();
    w.next(&service).await.unwrap();
    assert_eq!(service.verify_calls().len(), 3);
}

#[test]
fn stale_verification_success_is_disregarded() {
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);
    let NextStep::Verify(ticket) = w.request_next().unwrap() else {
        panic!("expected a verification ticket");
    };

    w.set_identity_number("GHA-987654321-0").unwrap();
    let outcome = w
        .resolve_verification(ticket, Ok(VerifyIdentityResponse::verified()))
        .unwrap();

    assert_eq!(outcome, NextOutcome::Stale);
    assert_eq!(w.current_step(), Some(WizardStep::IdentityDocument));
    assert_eq!(w.verification(), &VerificationState::NotStarted);
}

// ── Back navigation ──────────────────────────────────────────────────

#[tokio::test]
async fn back_keeps_every_value() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;
    let before = w.values().clone();

    assert!(w.back());
    assert_eq!(w.current_step(), Some(WizardStep::MobileMoney));
    assert!(w.back());
    assert_eq!(w.current_step(), Some(WizardStep::IdentityDocument));
    assert!(!w.back());

    assert_eq!(w.values(), &before);
    assert_eq!(w.verification(), &VerificationState::Verified);
}

#[tokio::test]
async fn back_is_allowed_with_invalid_fields() {
    let service = MockKycService::new();
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);
    w.next(&service).await.unwrap();
    w.set_momo_number("12").unwrap();

    assert!(w.can_go_back());
    assert!(w.back());
    assert_eq!(w.values().momo.number, "12");
}

// ── Submission ───────────────────────────────────────────────────────

#[tokio::test]
async fn full_submission_shows_result() {
    let service = MockKycService::new().with_submission(SubmitKycResponse {
        message: "KYC Completed!".into(),
        full_name: Some("Jane Doe".into()),
    });
    let mut w = session_on_selfie_step(&service).await;
    let submitted = w.values().clone();

    let summary = match w.submit(&service).await.unwrap() {
        SubmitOutcome::Succeeded(summary) => summary,
        other => panic!("expected Succeeded, got: {other:?}"),
    };
    assert_eq!(summary.display_name(), "Jane Doe");
    assert_eq!(summary.momo, "+233 244000000");
    assert_eq!(w.phase(), WizardPhase::Result);

    match w.submission() {
        kyc_wizard::SubmissionState::Succeeded { snapshot, .. } => {
            assert_eq!(snapshot, &submitted)
        }
        other => panic!("expected Succeeded, got: {other:?}"),
    }

    let sent = service.submit_calls();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].number.as_str(), NUMBER);
    assert_eq!(sent[0].momo_number.as_str(), "244000000");
    assert_eq!(sent[0].momo_country_code.as_str(), "+233");
    assert_eq!(sent[0].selfie.name(), "selfie.jpg");

    let notes = w.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert_eq!(notes[0].message, "KYC Completed!");

    // The result screen owns no previews.
    assert_eq!(w.previews().live_count(), 0);
    assert!(w.result_summary().is_some());
    assert_eq!(
        w.set_selfie_image(None),
        Err(kyc_wizard::WizardError::Completed)
    );
}

#[tokio::test]
async fn failed_submission_keeps_values_on_final_step() {
    let service = MockKycService::new()
        .with_submission_rejected(422, r#"{"message":"Selfie does not match"}"#)
        .with_submission(SubmitKycResponse {
            message: "KYC Completed!".into(),
            full_name: None,
        });
    let mut w = session_on_selfie_step(&service).await;
    let before = w.values().clone();

    let outcome = w.submit(&service).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Failed("Selfie does not match".into()));
    assert_eq!(w.current_step(), Some(WizardStep::Selfie));
    assert_eq!(w.values(), &before);
    assert!(w.can_submit());

    let notes = w.drain_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Error);

    // Retry succeeds; no name resolved.
    match w.submit(&service).await.unwrap() {
        SubmitOutcome::Succeeded(summary) => assert_eq!(summary.display_name(), "—"),
        other => panic!("expected Succeeded, got: {other:?}"),
    }
}

#[tokio::test]
async fn missing_selfie_blocks_submission() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;
    w.set_selfie_image(None).unwrap();

    match w.submit(&service).await.unwrap() {
        SubmitOutcome::Invalid(errors) => {
            assert_eq!(errors.get(FormField::SelfieImage), Some("Selfie is required"))
        }
        other => panic!("expected Invalid, got: {other:?}"),
    }
    assert!(service.submit_calls().is_empty());
}

#[tokio::test]
async fn second_submit_while_pending_is_ignored() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;

    let SubmitStep::Send(ticket) = w.begin_submit().unwrap() else {
        panic!("expected a submission ticket");
    };
    assert!(!w.can_submit());
    assert!(matches!(
        w.begin_submit().unwrap(),
        SubmitStep::Done(SubmitOutcome::Ignored)
    ));

    let reply = Ok(SubmitKycResponse {
        message: "KYC Completed!".into(),
        full_name: Some("Jane Doe".into()),
    });
    assert!(matches!(
        w.resolve_submission(ticket, reply).unwrap(),
        SubmitOutcome::Succeeded(_)
    ));
}

#[tokio::test]
async fn snapshot_is_taken_when_submission_starts() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;

    let SubmitStep::Send(ticket) = w.begin_submit().unwrap() else {
        panic!("expected a submission ticket");
    };
    w.set_selfie_image(jpeg("other.jpg")).unwrap();

    let reply = Ok(SubmitKycResponse {
        message: "KYC Completed!".into(),
        full_name: None,
    });
    match w.resolve_submission(ticket, reply).unwrap() {
        SubmitOutcome::Succeeded(summary) => {
            assert_eq!(summary.documents[2].file_name, "selfie.jpg")
        }
        other => panic!("expected Succeeded, got: {other:?}"),
    }
}

#[tokio::test]
async fn back_during_pending_submission_then_success_reaches_result() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;

    let SubmitStep::Send(ticket) = w.begin_submit().unwrap() else {
        panic!("expected a submission ticket");
    };
    assert!(w.back());
    assert_eq!(w.current_step(), Some(WizardStep::MobileMoney));

    let reply = Ok(SubmitKycResponse {
        message: "KYC Completed!".into(),
        full_name: Some("Jane Doe".into()),
    });
    match w.resolve_submission(ticket, reply).unwrap() {
        SubmitOutcome::Succeeded(summary) => assert_eq!(summary.display_name(), "Jane Doe"),
        other => panic!("expected Succeeded, got: {other:?}"),
    }
    assert_eq!(w.phase(), WizardPhase::Result);
}

#[tokio::test]
async fn back_during_pending_submission_then_failure_returns_to_selfie() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;
    let before = w.values().clone();

    let SubmitStep::Send(ticket) = w.begin_submit().unwrap() else {
        panic!("expected a submission ticket");
    };
    assert!(w.back());
    assert!(w.back());
    assert_eq!(w.current_step(), Some(WizardStep::IdentityDocument));

    let reply = Err(KycApiError::Unavailable {
        endpoint: "POST /api/kyc/submit".into(),
        reason: "connection reset".into(),
    });
    assert_eq!(
        w.resolve_submission(ticket, reply).unwrap(),
        SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.into())
    );
    assert_eq!(w.current_step(), Some(WizardStep::Selfie));
    assert_eq!(w.values(), &before);
    assert!(w.can_submit());
    assert_eq!(
        w.transitions().last().map(|t| t.reason.as_str()),
        Some("submission failed")
    );
}

// ── Abandoned calls ──────────────────────────────────────────────────

#[tokio::test]
async fn timed_out_verification_does_not_leave_the_session_busy() {
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);

    assert!(tokio::time::timeout(WAIT, w.next(&StalledService))
        .await
        .is_err());
    assert!(!w.is_busy());
    assert!(w.can_continue());
    assert_eq!(w.verification_error(), Some(VERIFY_UNAVAILABLE_MESSAGE));

    w.set_identity_number("GHA-987654321-0").unwrap();
    let service = MockKycService::new();
    assert_eq!(
        w.next(&service).await.unwrap(),
        NextOutcome::Advanced(WizardStep::MobileMoney)
    );
    assert_eq!(
        service.verify_calls(),
        vec![GhanaCardNumber::new("GHA-987654321-0").unwrap()]
    );
}

#[test]
fn abandoned_verification_ticket_reenables_continue() {
    let mut w = Wizard::new();
    fill_step_zero(&mut w, NUMBER);
    let NextStep::Verify(ticket) = w.request_next().unwrap() else {
        panic!("expected a verification ticket");
    };
    assert!(!w.can_continue());

    assert_eq!(
        w.abandon_verification(ticket),
        NextOutcome::VerificationFailed(VERIFY_UNAVAILABLE_MESSAGE.into())
    );
    assert!(w.can_continue());
    assert!(matches!(w.request_next().unwrap(), NextStep::Verify(_)));
}

#[tokio::test]
async fn timed_out_submission_can_be_retried() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;

    assert!(tokio::time::timeout(WAIT, w.submit(&StalledService))
        .await
        .is_err());
    assert!(!w.is_busy());
    assert!(w.can_submit());
    assert_eq!(w.submission().error(), Some(SUBMIT_FAILED_MESSAGE));
    let notes = w.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);

    assert!(matches!(
        w.submit(&service).await.unwrap(),
        SubmitOutcome::Succeeded(_)
    ));
}

#[tokio::test]
async fn abandoned_submission_ticket_returns_to_selfie() {
    let service = MockKycService::new();
    let mut w = session_on_selfie_step(&service).await;
    let SubmitStep::Send(ticket) = w.begin_submit().unwrap() else {
        panic!("expected a submission ticket");
    };
    assert!(w.back());

    assert_eq!(
        w.abandon_submission(ticket).unwrap(),
        SubmitOutcome::Failed(SUBMIT_FAILED_MESSAGE.into())
    );
    assert_eq!(w.current_step(), Some(WizardStep::Selfie));
    assert!(w.can_submit());
}

// ── Previews ─────────────────────────────────────────────────────────

#[test]
fn replacing_an_image_revokes_only_its_handle() {
    let mut w = Wizard::new();
    w.set_identity_front_image(jpeg("front-1.jpg")).unwrap();
    w.set_identity_back_image(jpeg("back.jpg")).unwrap();
    let front = w.preview(ImageSlot::IdentityFront).unwrap().id();
    let back = w.preview(ImageSlot::IdentityBack).unwrap().id();

    w.set_identity_front_image(jpeg("front-2.jpg")).unwrap();
    assert_eq!(w.previews().revoked(), &[front]);
    assert!(w.previews().is_live(back));
    assert_eq!(w.previews().live_count(), 2);
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn malformed_numbers_never_request_verification(number in "\\PC{0,20}") {
        prop_assume!(!GhanaCardNumber::is_well_formed(&number));
        let mut w = Wizard::new();
        fill_step_zero(&mut w, &number);
        match w.request_next().unwrap() {
            NextStep::Done(NextOutcome::Invalid(errors)) => {
                prop_assert!(errors.contains(FormField::IdentityNumber));
            }
            other => prop_assert!(false, "expected Invalid, got: {:?}", other),
        }
        prop_assert_eq!(w.verification(), &VerificationState::NotStarted);
    }

    #[test]
    fn well_formed_numbers_request_one_check(digits in "[0-9]{9}", check in "[0-9]") {
        let number = format!("GHA-{digits}-{check}");
        let mut w = Wizard::new();
        fill_step_zero(&mut w, &number);
        match w.request_next().unwrap() {
            NextStep::Verify(ticket) => prop_assert_eq!(ticket.number().as_str(), number.as_str()),
            other => prop_assert!(false, "expected Verify, got: {:?}", other),
        }
    }
}
