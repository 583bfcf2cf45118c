use shared::{
    domain::{Application, ApplicationKey, ApplicationStatus, ProfileId, StatusValue},
    protocol::StatusUpdateRequest,
};
use tracing::{debug, info};

use crate::{credential::Credential, error::ClientError, media::Blob, transport::RecruiterApi};

/// Dialog state for moving one application to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEditor {
    key: ApplicationKey,
    applicant_name: String,
    current: StatusValue,
    selected: Option<ApplicationStatus>,
    feedback: String,
}

impl StatusEditor {
    pub fn open(application: &Application) -> Self {
        Self {
            key: application.key,
            applicant_name: application.applicant.full_name(),
            current: application.status.clone(),
            selected: application.status.known(),
            feedback: application.feedback.clone().unwrap_or_default(),
        }
    }

    pub fn key(&self) -> ApplicationKey {
        self.key
    }

    pub fn applicant_name(&self) -> &str {
        &self.applicant_name
    }

    pub fn current(&self) -> &StatusValue {
        &self.current
    }

    pub fn selected(&self) -> Option<ApplicationStatus> {
        self.selected
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn select_status(&mut self, status: ApplicationStatus) {
        let next = match self.current.known() {
            Some(current) => current.transition(status),
            None => status,
        };
        self.selected = Some(next);
    }

    pub fn set_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback = feedback.into();
    }

    pub fn request(&self) -> Result<StatusUpdateRequest, ClientError> {
        let new_status = self.selected.ok_or_else(|| {
            ClientError::Validation(format!("no status selected for application {}", self.key))
        })?;
        Ok(build_request(new_status, Some(&self.feedback)))
    }

    pub async fn submit(&self, api: &dyn RecruiterApi, credential: &Credential) -> Result<(), ClientError> {
        let request = self.request()?;
        send(api, self.key, &request, credential).await
    }
}

pub async fn submit_status(
    api: &dyn RecruiterApi,
    key: ApplicationKey,
    status: ApplicationStatus,
    feedback: Option<&str>,
    credential: &Credential,
) -> Result<(), ClientError> {
    send(api, key, &build_request(status, feedback), credential).await
}

/// Downloads the applicant's resume. Only called when a reviewer asks for it.
pub async fn fetch_resume(
    api: &dyn RecruiterApi,
    profile_id: ProfileId,
    credential: &Credential,
) -> Result<Blob, ClientError> {
    debug!(profile_id = %profile_id, "status: fetching resume");
    api.fetch_resume(profile_id, credential).await
}

fn build_request(new_status: ApplicationStatus, feedback: Option<&str>) -> StatusUpdateRequest {
    let rejection_feedback = feedback
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    StatusUpdateRequest {
        new_status,
        rejection_feedback,
    }
}

async fn send(
    api: &dyn RecruiterApi,
    key: ApplicationKey,
    request: &StatusUpdateRequest,
    credential: &Credential,
) -> Result<(), ClientError> {
    api.update_application_status(key, request, credential).await?;
    info!(
        job_id = %key.job_id,
        profile_id = %key.profile_id,
        status = %request.new_status,
        "status: application updated"
    );
    Ok(())
}

#[cfg(test)]
#[path = "tests/status_editor_tests.rs"]
mod tests;
