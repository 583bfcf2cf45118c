use shared::domain::{Job, JobId};
use tracing::{info, warn};

use crate::{credential::Credential, error::ClientError, transport::RecruiterApi};

/// Resolves the jobs owned by the signed-in recruiter.
pub struct JobRoster<'a> {
    api: &'a dyn RecruiterApi,
}

impl<'a> JobRoster<'a> {
    pub fn new(api: &'a dyn RecruiterApi) -> Self {
        Self { api }
    }

    /// A 404 from the backend means the recruiter has no jobs yet.
    pub async fn owned_jobs(&self, credential: &Credential) -> Result<Vec<Job>, ClientError> {
        let records = match self.api.list_owned_jobs(credential).await {
            Ok(records) => records,
            Err(err) if err.is_not_found() => {
                info!("roster: recruiter owns no jobs");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let jobs: Vec<Job> = records
            .into_iter()
            .map(|record| {
                if record.has_partial_salary() {
                    warn!(
                        job_id = %record.id,
                        min = ?record.min_salary,
                        max = ?record.max_salary,
                        "roster: ignoring salary with a single bound"
                    );
                }
                record.into_job()
            })
            .collect();
        info!(count = jobs.len(), "roster: loaded owned jobs");
        Ok(jobs)
    }

    pub async fn list_owned_jobs(&self, credential: &Credential) -> Result<Vec<JobId>, ClientError> {
        Ok(self
            .owned_jobs(credential)
            .await?
            .into_iter()
            .map(|job| job.id)
            .collect())
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
