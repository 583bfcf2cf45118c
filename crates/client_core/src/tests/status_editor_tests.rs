use super::*;
use crate::{
    aggregator::ApplicantAggregator,
    media::ObjectUrlRegistry,
    test_support::{application_record, credential, FakeApi, FakeReply},
};
use shared::domain::JobId;

fn application(status: &str) -> Application {
    application_record(3, 10, "Ana", "Garza", status).into_application()
}

#[test]
fn open_preselects_current_known_status() {
    let editor = StatusEditor::open(&application("UNDER_REVIEW"));

    assert_eq!(editor.key(), ApplicationKey::new(JobId(3), ProfileId(10)));
    assert_eq!(editor.applicant_name(), "Ana Garza");
    assert_eq!(editor.selected(), Some(ApplicationStatus::UnderReview));
}

#[test]
fn unrecognized_status_requires_explicit_choice() {
    let editor = StatusEditor::open(&application("ON_HOLD"));

    assert_eq!(editor.current(), &StatusValue::Unrecognized("ON_HOLD".into()));
    assert!(matches!(editor.request(), Err(ClientError::Validation(_))));
}

#[test]
fn blank_feedback_is_sent_as_null() {
    let mut editor = StatusEditor::open(&application("SUBMITTED"));
    editor.select_status(ApplicationStatus::OfferSent);
    editor.set_feedback("   ");

    let request = editor.request().expect("request");

    assert_eq!(request.new_status, ApplicationStatus::OfferSent);
    assert_eq!(request.rejection_feedback, None);
}

#[test]
fn any_status_can_be_selected_from_any_other() {
    for from in ApplicationStatus::ALL {
        for to in ApplicationStatus::ALL {
            let mut editor = StatusEditor::open(&application(from.as_wire()));
            editor.select_status(to);
            assert_eq!(editor.request().expect("request").new_status, to);
        }
    }
}

#[tokio::test]
async fn submitted_status_shows_up_after_reaggregation() {
    let api = FakeApi::new()
        .with_applications(3, FakeReply::Ok(vec![application_record(3, 10, "Ana", "Garza", "SUBMITTED")]))
        .await;
    let mut editor = StatusEditor::open(&application("SUBMITTED"));
    editor.select_status(ApplicationStatus::Rejected);
    editor.set_feedback("Needs more Rust experience");

    editor.submit(&api, &credential()).await.expect("submit");

    let registry = ObjectUrlRegistry::new();
    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(3)], &credential())
        .await;
    let application = &outcome.entries[0].application;
    assert_eq!(application.status.as_str(), "REJECTED");
    assert_eq!(application.feedback.as_deref(), Some("Needs more Rust experience"));
}

#[tokio::test]
async fn expired_credential_fails_with_auth_and_records_nothing() {
    let api = FakeApi::new();
    *api.status_reply.lock().await = FakeReply::Auth;
    let original = application("SUBMITTED");

    let err = submit_status(
        &api,
        original.key,
        ApplicationStatus::UnderReview,
        None,
        &credential(),
    )
    .await
    .expect_err("expired credential");

    assert!(err.is_auth());
    assert!(api.status_updates.lock().await.is_empty());
    assert_eq!(original.status.as_str(), "SUBMITTED");
}

#[tokio::test]
async fn resume_is_fetched_only_on_request() {
    let api = FakeApi::new();
    api.resumes.lock().await.insert(
        ProfileId(10),
        FakeReply::Ok(Blob::new(b"%PDF".to_vec(), Some("application/pdf".into()))),
    );
    assert!(api.calls_matching("GET /users/profile/10/resume").await.is_empty());

    let resume = fetch_resume(&api, ProfileId(10), &credential())
        .await
        .expect("resume");

    assert_eq!(resume.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(api.calls_matching("GET /users/profile/10/resume").await.len(), 1);
}
