//! Flattens the applications of every owned job into one roster.

use futures::future::join_all;
use shared::{
    domain::{Application, ApplicationKey, JobId},
    error::ErrorCode,
};
use tracing::{debug, info, warn};

use crate::{
    credential::Credential,
    media::{ObjectUrlRegistry, PictureRef, DEFAULT_PROFILE_PICTURE},
    transport::RecruiterApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub application: Application,
    pub picture: PictureRef,
}

impl RosterEntry {
    pub fn key(&self) -> ApplicationKey {
        self.application.key
    }

    pub fn full_name(&self) -> String {
        self.application.applicant.full_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedJob {
    pub job_id: JobId,
    pub reason: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub entries: Vec<RosterEntry>,
    pub degraded: Vec<DegradedJob>,
}

pub struct ApplicantAggregator<'a> {
    api: &'a dyn RecruiterApi,
    registry: &'a ObjectUrlRegistry,
    placeholder: &'a str,
}

impl<'a> ApplicantAggregator<'a> {
    pub fn new(api: &'a dyn RecruiterApi, registry: &'a ObjectUrlRegistry) -> Self {
        Self {
            api,
            registry,
            placeholder: DEFAULT_PROFILE_PICTURE,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub async fn aggregate(&self, job_ids: &[JobId], credential: &Credential) -> AggregateOutcome {
        let contributions = join_all(
            job_ids
                .iter()
                .map(|&job_id| self.job_contribution(job_id, credential)),
        )
        .await;

        let mut outcome = AggregateOutcome::default();
        for contribution in contributions {
            match contribution {
                Ok(entries) => outcome.entries.extend(entries),
                Err(degraded) => outcome.degraded.push(degraded),
            }
        }

        info!(
            jobs = job_ids.len(),
            applications = outcome.entries.len(),
            degraded = outcome.degraded.len(),
            "aggregate: roster built"
        );
        outcome
    }

    async fn job_contribution(
        &self,
        job_id: JobId,
        credential: &Credential,
    ) -> Result<Vec<RosterEntry>, DegradedJob> {
        let records = match self.api.list_job_applications(job_id, credential).await {
            Ok(records) => records,
            Err(err) if err.is_not_found() => {
                debug!(job_id = %job_id, "aggregate: job has no applicants");
                return Ok(Vec::new());
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "aggregate: dropping job contribution");
                return Err(DegradedJob {
                    job_id,
                    reason: err.kind(),
                    message: err.to_string(),
                });
            }
        };

        Ok(join_all(
            records
                .into_iter()
                .map(|record| self.attach_picture(record.into_application(), credential)),
        )
        .await)
    }

    async fn attach_picture(&self, application: Application, credential: &Credential) -> RosterEntry {
        let profile_id = application.key.profile_id;
        let picture = match self.api.fetch_profile_picture(profile_id, credential).await {
            Ok(blob) if !blob.is_empty() => PictureRef::Object(self.registry.create(blob)),
            Ok(_) => {
                debug!(profile_id = %profile_id, "aggregate: empty picture, using placeholder");
                PictureRef::Placeholder(self.placeholder.to_string())
            }
            Err(err) => {
                debug!(profile_id = %profile_id, error = %err, "aggregate: picture unavailable, using placeholder");
                PictureRef::Placeholder(self.placeholder.to_string())
            }
        };
        RosterEntry {
            application,
            picture,
        }
    }
}

/// Case-insensitive substring match on "first last". A blank query keeps every entry.
pub fn filter_by_name<'r>(entries: &'r [RosterEntry], query: &str) -> Vec<&'r RosterEntry> {
    if query.trim().is_empty() {
        return entries.iter().collect();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.full_name().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "tests/aggregator_tests.rs"]
mod tests;
