use super::*;
use crate::{
    media::Blob,
    test_support::{application_record, credential, FakeApi, FakeReply},
};
use shared::domain::{ApplicationStatus, ProfileId, StatusValue};

fn png() -> FakeReply<Blob> {
    FakeReply::Ok(Blob::new(b"png".to_vec(), Some("image/png".into())))
}

fn names(outcome: &AggregateOutcome) -> Vec<String> {
    outcome.entries.iter().map(RosterEntry::full_name).collect()
}

#[tokio::test]
async fn issues_one_fetch_per_job() {
    let api = FakeApi::new()
        .with_applications(1, FakeReply::Ok(vec![application_record(1, 10, "Ana", "Garza", "SUBMITTED")]))
        .await
        .with_applications(2, FakeReply::Ok(Vec::new()))
        .await
        .with_applications(3, FakeReply::Ok(Vec::new()))
        .await;
    let registry = ObjectUrlRegistry::new();

    ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(1), JobId(2), JobId(3)], &credential())
        .await;

    let mut calls = api.calls_matching("GET /applications/").await;
    calls.sort();
    assert_eq!(
        calls,
        vec!["GET /applications/1", "GET /applications/2", "GET /applications/3"]
    );
}

#[tokio::test]
async fn missing_job_contributes_nothing_without_degrading() {
    let api = FakeApi::new()
        .with_applications(1, FakeReply::Ok(vec![application_record(1, 10, "Ana", "Garza", "SUBMITTED")]))
        .await
        .with_applications(2, FakeReply::NotFound)
        .await
        .with_applications(3, FakeReply::Ok(vec![application_record(3, 12, "Suhaib", "Tariq", "REJECTED")]))
        .await;
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(1), JobId(2), JobId(3)], &credential())
        .await;

    assert_eq!(names(&outcome), vec!["Ana Garza", "Suhaib Tariq"]);
    assert!(outcome.degraded.is_empty());
}

#[tokio::test]
async fn malformed_and_failing_jobs_degrade_independently() {
    let api = FakeApi::new()
        .with_applications(1, FakeReply::Malformed)
        .await
        .with_applications(2, FakeReply::Ok(vec![application_record(2, 11, "Lee", "Park", "UNDER_REVIEW")]))
        .await
        .with_applications(3, FakeReply::Service(500))
        .await;
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(1), JobId(2), JobId(3)], &credential())
        .await;

    assert_eq!(names(&outcome), vec!["Lee Park"]);
    let degraded: Vec<_> = outcome
        .degraded
        .iter()
        .map(|job| (job.job_id, job.reason))
        .collect();
    assert_eq!(
        degraded,
        vec![
            (JobId(1), ErrorCode::MalformedResponse),
            (JobId(3), ErrorCode::Service)
        ]
    );
}

#[tokio::test]
async fn keeps_job_order_then_response_order() {
    let api = FakeApi::new()
        .with_applications(
            7,
            FakeReply::Ok(vec![
                application_record(7, 2, "Zed", "Last", "SUBMITTED"),
                application_record(7, 1, "Amy", "First", "SUBMITTED"),
            ]),
        )
        .await
        .with_applications(4, FakeReply::Ok(vec![application_record(4, 1, "Amy", "First", "OFFER_SENT")]))
        .await;
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(7), JobId(4)], &credential())
        .await;

    let keys: Vec<_> = outcome
        .entries
        .iter()
        .map(|entry| (entry.key().job_id.0, entry.key().profile_id.0))
        .collect();
    assert_eq!(keys, vec![(7, 2), (7, 1), (4, 1)]);
    assert_eq!(
        outcome.entries[2].application.status,
        StatusValue::Known(ApplicationStatus::OfferSent)
    );
}

#[tokio::test]
async fn picture_failure_keeps_record_with_placeholder() {
    let api = FakeApi::new()
        .with_applications(
            1,
            FakeReply::Ok(vec![
                application_record(1, 10, "Ana", "Garza", "SUBMITTED"),
                application_record(1, 11, "Ben", "Ortiz", "SUBMITTED"),
            ]),
        )
        .await
        .with_picture(10, png())
        .await
        .with_picture(11, FakeReply::Service(500))
        .await;
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .with_placeholder("static/avatar.png")
        .aggregate(&[JobId(1)], &credential())
        .await;

    assert_eq!(outcome.entries.len(), 2);
    let picture = &outcome.entries[0].picture;
    assert!(!picture.is_placeholder());
    assert!(registry.resolve(picture.as_str()).is_some());
    assert_eq!(
        outcome.entries[1].picture,
        PictureRef::Placeholder("static/avatar.png".into())
    );
    assert_eq!(
        api.calls_matching("GET /users/profile/").await.len(),
        2,
        "one picture fetch per applicant"
    );
}

#[tokio::test]
async fn dropping_roster_releases_pictures() {
    let api = FakeApi::new()
        .with_applications(1, FakeReply::Ok(vec![application_record(1, 10, "Ana", "Garza", "SUBMITTED")]))
        .await
        .with_picture(10, png())
        .await;
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[JobId(1)], &credential())
        .await;
    assert_eq!(registry.live_count(), 1);

    drop(outcome);
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn empty_job_list_makes_no_requests() {
    let api = FakeApi::new();
    let registry = ObjectUrlRegistry::new();

    let outcome = ApplicantAggregator::new(&api, &registry)
        .aggregate(&[], &credential())
        .await;

    assert!(outcome.entries.is_empty());
    assert!(api.calls.lock().await.is_empty());
}

fn roster(names: &[(&str, &str)]) -> Vec<RosterEntry> {
    names
        .iter()
        .enumerate()
        .map(|(index, (first, last))| RosterEntry {
            application: application_record(1, index as i64, first, last, "SUBMITTED")
                .into_application(),
            picture: PictureRef::Placeholder(DEFAULT_PROFILE_PICTURE.into()),
        })
        .collect()
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let entries = roster(&[("Ana", "Garza"), ("Suhaib", "Tariq"), ("Joan", "Smith")]);

    let hits: Vec<_> = filter_by_name(&entries, "AN")
        .into_iter()
        .map(RosterEntry::full_name)
        .collect();

    assert_eq!(hits, vec!["Ana Garza", "Joan Smith"]);
}

#[test]
fn name_filter_spans_first_and_last_name() {
    let entries = roster(&[("Ana", "Garza"), ("Suhaib", "Tariq")]);

    let hits = filter_by_name(&entries, "a g");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].application.applicant.profile_id, ProfileId(0));
}

#[test]
fn blank_query_returns_everything_in_order() {
    let entries = roster(&[("Ana", "Garza"), ("Suhaib", "Tariq")]);

    for query in ["", "   "] {
        let hits = filter_by_name(&entries, query);
        assert_eq!(hits.len(), entries.len());
        assert_eq!(hits[0], &entries[0]);
        assert_eq!(hits[1], &entries[1]);
    }
}
