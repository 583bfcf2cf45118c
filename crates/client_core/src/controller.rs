use std::{collections::HashMap, sync::Arc};

use shared::domain::{ApplicationKey, ApplicationStatus, JobId, ProfileId};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    aggregator::{AggregateOutcome, ApplicantAggregator},
    credential::Credential,
    error::ClientError,
    media::{ObjectUrl, ObjectUrlRegistry, DEFAULT_PROFILE_PICTURE},
    roster::JobRoster,
    status_editor,
    transport::RecruiterApi,
    view::{RecruiterView, ViewError, ViewErrorContext},
};

#[derive(Clone)]
pub struct RecruiterController {
    api: Arc<dyn RecruiterApi>,
    credential: Credential,
    registry: ObjectUrlRegistry,
    placeholder: String,
    view: Arc<Mutex<RecruiterView>>,
}

impl RecruiterController {
    pub fn new(api: Arc<dyn RecruiterApi>, credential: Credential) -> Self {
        Self {
            api,
            credential,
            registry: ObjectUrlRegistry::new(),
            placeholder: DEFAULT_PROFILE_PICTURE.to_string(),
            view: Arc::new(Mutex::new(RecruiterView::new())),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn view(&self) -> &Arc<Mutex<RecruiterView>> {
        &self.view
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// Rebuilds the roster. `Ok(false)` means a newer refresh started meanwhile and this result
    /// was discarded.
    pub async fn refresh(&self) -> Result<bool, ViewError> {
        let generation = self.view.lock().await.begin_refresh();

        match self.load().await {
            Ok(outcome) => Ok(self.view.lock().await.apply_roster(generation, outcome)),
            Err(err) => {
                warn!(error = %err, generation = generation.value(), "controller: roster load failed");
                let error = ViewError::new(ViewErrorContext::LoadRoster, &err);
                self.view
                    .lock()
                    .await
                    .apply_failure(generation, error.clone());
                Err(error)
            }
        }
    }

    async fn load(&self) -> Result<AggregateOutcome, ClientError> {
        let jobs = JobRoster::new(self.api.as_ref())
            .owned_jobs(&self.credential)
            .await?;
        let job_ids: Vec<JobId> = jobs.iter().map(|job| job.id).collect();

        let mut outcome = ApplicantAggregator::new(self.api.as_ref(), &self.registry)
            .with_placeholder(&self.placeholder)
            .aggregate(&job_ids, &self.credential)
            .await;

        let titles: HashMap<JobId, &str> = jobs
            .iter()
            .map(|job| (job.id, job.title.as_str()))
            .collect();
        for entry in outcome
            .entries
            .iter_mut()
            .filter(|entry| entry.application.job_title.is_empty())
        {
            if let Some(title) = titles.get(&entry.application.key.job_id) {
                entry.application.job_title = (*title).to_string();
            }
        }
        Ok(outcome)
    }

    pub async fn submit_status(
        &self,
        key: ApplicationKey,
        status: ApplicationStatus,
        feedback: Option<&str>,
    ) -> Result<(), ViewError> {
        if let Err(err) =
            status_editor::submit_status(self.api.as_ref(), key, status, feedback, &self.credential)
                .await
        {
            return Err(self.fail(ViewErrorContext::SubmitStatus, &err).await);
        }
        self.refresh().await.map(|_| ())
    }

    /// Submits the open status dialog. The dialog stays open when the submit fails.
    pub async fn submit_editor(&self) -> Result<(), ViewError> {
        let editor = self.view.lock().await.editor().cloned();
        let Some(editor) = editor else {
            let err = ClientError::Validation("no application is open for editing".into());
            return Err(self.fail(ViewErrorContext::SubmitStatus, &err).await);
        };

        if let Err(err) = editor.submit(self.api.as_ref(), &self.credential).await {
            return Err(self.fail(ViewErrorContext::SubmitStatus, &err).await);
        }
        self.view.lock().await.close_editor();
        self.refresh().await.map(|_| ())
    }

    pub async fn open_resume(&self, profile_id: ProfileId) -> Result<ObjectUrl, ViewError> {
        let blob = match status_editor::fetch_resume(self.api.as_ref(), profile_id, &self.credential).await {
            Ok(blob) => blob,
            Err(err) => return Err(self.fail(ViewErrorContext::FetchResume, &err).await),
        };
        info!(profile_id = %profile_id, bytes = blob.len(), "controller: resume opened");
        let url = self.registry.create(blob);
        self.view.lock().await.open_resume(profile_id, url.clone());
        Ok(url)
    }

    pub async fn close_resume(&self) {
        self.view.lock().await.close_resume();
    }

    async fn fail(&self, context: ViewErrorContext, err: &ClientError) -> ViewError {
        warn!(error = %err, ?context, "controller: action failed");
        let error = ViewError::new(context, err);
        self.view.lock().await.record_error(error.clone());
        error
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
