use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Applicant, Application, ApplicationKey, ApplicationStatus, Job, JobId, Profile, ProfileId,
    Recruiter, SalaryRange, Skill, SkillId, StatusValue,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: SkillId,
    pub skill: String,
}

impl From<SkillRecord> for Skill {
    fn from(record: SkillRecord) -> Self {
        Skill {
            id: record.id,
            label: record.skill,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillLabel {
    pub skill: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
}

impl From<ProfileRecord> for Applicant {
    fn from(record: ProfileRecord) -> Self {
        Applicant {
            profile_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
        }
    }
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Profile {
            profile_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            skills: record.skills.into_iter().map(Skill::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub user_profile_id: ProfileId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub owner: Option<ProfileRecord>,
}

impl JobRecord {
    /// True when exactly one salary bound is present.
    pub fn has_partial_salary(&self) -> bool {
        self.min_salary.is_some() != self.max_salary.is_some()
    }

    pub fn into_job(self) -> Job {
        let salary = SalaryRange::from_bounds(self.min_salary, self.max_salary);
        let (first_name, last_name) = self
            .owner
            .map(|owner| (owner.first_name, owner.last_name))
            .unwrap_or_default();
        Job {
            id: self.id,
            title: self.title,
            description: self.description,
            location: self.location,
            salary,
            skills: self.skills.into_iter().map(Skill::from).collect(),
            owner: Recruiter {
                profile_id: self.user_profile_id,
                first_name,
                last_name,
                company_name: self.company_name,
            },
        }
    }
}

/// Job fields embedded in an application; the backend omits the id there.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobHeadline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub user_profile_id: ProfileId,
    pub job_id: JobId,
    #[serde(default)]
    pub application_status_id: Option<i64>,
    #[serde(default)]
    pub application_status: Option<ApplicationStatusRecord>,
    #[serde(default)]
    pub application_submitted_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_reviewed_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_offer_sent_date: Option<NaiveDate>,
    #[serde(default)]
    pub application_rejected_date: Option<NaiveDate>,
    #[serde(default)]
    pub rejection_feedback: Option<String>,
    pub applicant: ProfileRecord,
    #[serde(default)]
    pub job: Option<JobHeadline>,
}

impl ApplicationRecord {
    /// A parseable status string wins, then the status row id, then the record's status id.
    pub fn status(&self) -> StatusValue {
        let record = self.application_status.as_ref();
        if let Some(StatusValue::Known(status)) = record.map(|r| StatusValue::from(r.status.clone())) {
            return StatusValue::Known(status);
        }
        let by_id = record
            .and_then(|r| r.id)
            .or(self.application_status_id)
            .and_then(ApplicationStatus::from_backend_id);
        match (by_id, record) {
            (Some(status), _) => StatusValue::Known(status),
            (None, Some(record)) => StatusValue::Unrecognized(record.status.clone()),
            (None, None) => StatusValue::Unrecognized(String::new()),
        }
    }

    pub fn into_application(self) -> Application {
        let status = self.status();
        Application {
            key: ApplicationKey::new(self.job_id, self.user_profile_id),
            job_title: self.job.map(|job| job.title).unwrap_or_default(),
            applicant: Applicant::from(self.applicant),
            status,
            feedback: self.rejection_feedback,
            submitted_on: self.application_submitted_date,
            reviewed_on: self.application_reviewed_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub new_status: ApplicationStatus,
    pub rejection_feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrant<'a> {
    pub grant_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub is_recruiter: bool,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_recruiter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<i64>,
}
