//! Job board, sign-in and applicant-side application calls.

use reqwest::Method;
use serde_json::Value;
use shared::{
    domain::{Application, ApplicationStatus, Job, JobId, Profile, SalaryRange, Skill},
    protocol::{
        ApplicationRecord, CreateJobRequest, JobPatchRequest, JobRecord, PasswordGrant,
        ProfilePatchRequest, ProfileRecord, SignUpRequest, SkillLabel, SkillRecord,
        TokenResponse, UserRecord,
    },
};
use tracing::{info, warn};

use crate::{
    credential::Credential,
    error::ClientError,
    transport::{decode_json, decode_list, HttpBackend},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub skills: Vec<String>,
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::Validation("job title must not be empty".into()));
        }
        validate_salary(self.min_salary, self.max_salary)?;
        validate_skills(&self.skills)
    }

    fn to_request(&self) -> CreateJobRequest {
        CreateJobRequest {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            company_name: self.company_name.clone(),
            location: self.location.clone(),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
        }
    }
}

/// Fields to change on an existing job. `skills` replaces the whole skill list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub salary: Option<SalaryRange>,
    pub skills: Option<Vec<String>>,
}

impl JobPatch {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(ClientError::Validation("job title must not be empty".into()));
        }
        if let Some(range) = self.salary {
            validate_salary(Some(range.min), Some(range.max))?;
        }
        if let Some(skills) = &self.skills {
            validate_skills(skills)?;
        }
        Ok(())
    }

    fn to_request(&self) -> JobPatchRequest {
        JobPatchRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            company_name: self.company_name.clone(),
            location: self.location.clone(),
            min_salary: self.salary.map(|range| range.min),
            max_salary: self.salary.map(|range| range.max),
        }
    }

    fn touches_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.company_name.is_some()
            || self.location.is_some()
            || self.salary.is_some()
    }
}

fn validate_salary(min: Option<i64>, max: Option<i64>) -> Result<(), ClientError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ClientError::Validation(format!(
            "minimum salary {min} exceeds maximum salary {max}"
        ))),
        (Some(_), None) | (None, Some(_)) => Err(ClientError::Validation(
            "salary range needs both a minimum and a maximum".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_skills(skills: &[String]) -> Result<(), ClientError> {
    if skills.iter().any(|label| label.trim().is_empty()) {
        return Err(ClientError::Validation("skill labels must not be empty".into()));
    }
    Ok(())
}

fn skill_labels(labels: &[String]) -> Vec<SkillLabel> {
    labels
        .iter()
        .map(|label| SkillLabel {
            skill: label.trim().to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.first_name.is_none() && self.last_name.is_none() {
            return Err(ClientError::Validation("nothing to update on the profile".into()));
        }
        let blank = |name: &Option<String>| name.as_deref().is_some_and(|n| n.trim().is_empty());
        if blank(&self.first_name) || blank(&self.last_name) {
            return Err(ClientError::Validation("profile names must not be empty".into()));
        }
        Ok(())
    }

    fn to_request(&self) -> ProfilePatchRequest {
        ProfilePatchRequest {
            first_name: self.first_name.as_deref().map(|n| n.trim().to_string()),
            last_name: self.last_name.as_deref().map(|n| n.trim().to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobBoard {
    backend: HttpBackend,
}

impl JobBoard {
    pub fn new(backend: HttpBackend) -> Self {
        Self { backend }
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Credential, ClientError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".into(),
            ));
        }

        let grant = PasswordGrant {
            grant_type: "password",
            username: username.trim(),
            password,
        };
        let response = self
            .backend
            .call(Method::POST, "/token", None, |r| r.form(&grant))
            .await?;
        let token: TokenResponse = decode_json("POST /token", response).await?;
        if !token.token_type.eq_ignore_ascii_case("bearer") {
            warn!(token_type = %token.token_type, "auth: unexpected token type");
        }
        info!(username = %grant.username, "auth: signed in");
        Ok(Credential::bearer(token.access_token))
    }

    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_recruiter: bool,
    ) -> Result<UserRecord, ClientError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username, email and password are required".into(),
            ));
        }
        let request = SignUpRequest {
            username: username.trim(),
            email: email.trim(),
            is_recruiter,
            password,
        };
        self.backend
            .send_json(Method::POST, "/users/", None, &request)
            .await
    }

    /// The backend answers `null` or 404 when no job is posted.
    pub async fn list_jobs(&self) -> Result<Vec<Job>, ClientError> {
        let body = match self.backend.get_json::<Value>("/jobs", None).await {
            Ok(body) => body,
            Err(err) if err.is_not_found() => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        if body.is_null() {
            return Ok(Vec::new());
        }
        let records: Vec<JobRecord> = decode_list("GET /jobs", body)?;
        Ok(records.into_iter().map(JobRecord::into_job).collect())
    }

    pub async fn get_job(&self, job_id: JobId) -> Result<Job, ClientError> {
        let record: JobRecord = self
            .backend
            .get_json(&format!("/jobs/{job_id}"), None)
            .await?;
        Ok(record.into_job())
    }

    /// Posts the job, then its skills when the draft lists any.
    pub async fn create_job(&self, draft: &JobDraft, credential: &Credential) -> Result<Job, ClientError> {
        draft.validate()?;
        let created: JobRecord = self
            .backend
            .send_json(Method::POST, "/jobs", Some(credential), &draft.to_request())
            .await?;
        info!(job_id = %created.id, title = %created.title, "jobs: created");

        if draft.skills.is_empty() {
            return Ok(created.into_job());
        }
        self.replace_skills(created.id, &draft.skills, credential)
            .await
    }

    pub async fn update_job(
        &self,
        job_id: JobId,
        patch: &JobPatch,
        credential: &Credential,
    ) -> Result<Job, ClientError> {
        patch.validate()?;
        if !patch.touches_fields() && patch.skills.is_none() {
            return Err(ClientError::Validation(format!(
                "nothing to update on job {job_id}"
            )));
        }

        let mut job = None;
        if patch.touches_fields() {
            let record: JobRecord = self
                .backend
                .send_json(
                    Method::PATCH,
                    &format!("/jobs/{job_id}"),
                    Some(credential),
                    &patch.to_request(),
                )
                .await?;
            job = Some(record.into_job());
        }
        if let Some(skills) = &patch.skills {
            job = Some(self.replace_skills(job_id, skills, credential).await?);
        }
        job.ok_or_else(|| ClientError::Validation(format!("nothing to update on job {job_id}")))
    }

    pub async fn replace_skills(
        &self,
        job_id: JobId,
        labels: &[String],
        credential: &Credential,
    ) -> Result<Job, ClientError> {
        validate_skills(labels)?;
        let body = skill_labels(labels);
        let record: JobRecord = self
            .backend
            .send_json(
                Method::POST,
                &format!("/jobs/skills/{job_id}"),
                Some(credential),
                &body,
            )
            .await?;
        Ok(record.into_job())
    }

    pub async fn delete_job(&self, job_id: JobId, credential: &Credential) -> Result<(), ClientError> {
        self.backend
            .call(Method::DELETE, &format!("/jobs/{job_id}"), Some(credential), |r| r)
            .await?;
        info!(job_id = %job_id, "jobs: deleted");
        Ok(())
    }

    pub async fn apply(&self, job_id: JobId, credential: &Credential) -> Result<Application, ClientError> {
        let path = format!("/applications/{job_id}");
        let response = self
            .backend
            .call(Method::POST, &path, Some(credential), |r| r)
            .await?;
        let record: ApplicationRecord = decode_json(&format!("POST {path}"), response).await?;
        info!(job_id = %job_id, "applications: submitted");
        Ok(record.into_application())
    }

    /// The applicant's own applications, optionally narrowed to one status. 404 means none.
    pub async fn my_applications(
        &self,
        status: Option<ApplicationStatus>,
        credential: &Credential,
    ) -> Result<Vec<Application>, ClientError> {
        let path = match status {
            Some(status) => format!("/applications/me?q={}", status.backend_id()),
            None => "/applications/me".to_string(),
        };
        match self
            .backend
            .get_list::<ApplicationRecord>(&path, Some(credential))
            .await
        {
            Ok(records) => Ok(records
                .into_iter()
                .map(ApplicationRecord::into_application)
                .collect()),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    pub async fn withdraw(&self, job_id: JobId, credential: &Credential) -> Result<(), ClientError> {
        self.backend
            .call(
                Method::DELETE,
                &format!("/applications/me/{job_id}"),
                Some(credential),
                |r| r,
            )
            .await?;
        info!(job_id = %job_id, "applications: withdrawn");
        Ok(())
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, ClientError> {
        let records: Vec<SkillRecord> = self.backend.get_list("/skills", None).await?;
        Ok(records.into_iter().map(Skill::from).collect())
    }

    pub async fn matched_jobs(&self, credential: &Credential) -> Result<Vec<Job>, ClientError> {
        let records: Vec<JobRecord> = self
            .backend
            .get_list("/job_matching/", Some(credential))
            .await?;
        Ok(records.into_iter().map(JobRecord::into_job).collect())
    }

    pub async fn my_profile(&self, credential: &Credential) -> Result<Profile, ClientError> {
        let record: ProfileRecord = self
            .backend
            .get_json("/users/profile/me", Some(credential))
            .await?;
        Ok(Profile::from(record))
    }

    pub async fn update_profile(
        &self,
        patch: &ProfilePatch,
        credential: &Credential,
    ) -> Result<Profile, ClientError> {
        patch.validate()?;
        let record: ProfileRecord = self
            .backend
            .send_json(
                Method::PATCH,
                "/users/profile/me",
                Some(credential),
                &patch.to_request(),
            )
            .await?;
        info!(profile_id = %record.user_id, "profile: updated");
        Ok(Profile::from(record))
    }

    pub async fn my_skills(&self, credential: &Credential) -> Result<Vec<Skill>, ClientError> {
        let records: Vec<SkillRecord> = self
            .backend
            .get_list("/users/profile/me/skills", Some(credential))
            .await?;
        Ok(records.into_iter().map(Skill::from).collect())
    }

    /// Replaces every profile skill. Labels the backend does not know are dropped by it.
    pub async fn replace_my_skills(
        &self,
        labels: &[String],
        credential: &Credential,
    ) -> Result<Profile, ClientError> {
        validate_skills(labels)?;
        let record: ProfileRecord = self
            .backend
            .send_json(
                Method::POST,
                "/users/profile/me/skills",
                Some(credential),
                &skill_labels(labels),
            )
            .await?;
        let profile = Profile::from(record);
        if profile.skills.len() < labels.len() {
            warn!(
                requested = labels.len(),
                kept = profile.skills.len(),
                "profile: backend dropped unknown skills"
            );
        }
        Ok(profile)
    }
}

#[cfg(test)]
#[path = "tests/jobs_tests.rs"]
mod tests;
