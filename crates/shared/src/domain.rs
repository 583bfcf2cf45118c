use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(JobId);
id_newtype!(ProfileId);
id_newtype!(SkillId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub label: String,
}

/// Salary bounds of a job. Either both ends are known or the job has no range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

impl SalaryRange {
    pub fn from_bounds(min: Option<i64>, max: Option<i64>) -> Option<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Some(Self { min, max }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruiter {
    pub profile_id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: Option<SalaryRange>,
    pub skills: Vec<Skill>,
    pub owner: Recruiter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub profile_id: ProfileId,
    pub first_name: String,
    pub last_name: String,
}

impl Applicant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The signed-in user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    UndergoingFurtherScreening,
    Rejected,
    OfferSent,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::UndergoingFurtherScreening,
        ApplicationStatus::Rejected,
        ApplicationStatus::OfferSent,
    ];

    pub fn as_wire(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::UnderReview => "UNDER_REVIEW",
            ApplicationStatus::UndergoingFurtherScreening => "UNDERGOING_FURTHER_SCREENING",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::OfferSent => "OFFER_SENT",
        }
    }

    /// Row ids of the backend's `application_status` table.
    pub fn from_backend_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(ApplicationStatus::Submitted),
            2 => Some(ApplicationStatus::UnderReview),
            3 => Some(ApplicationStatus::UndergoingFurtherScreening),
            4 => Some(ApplicationStatus::Rejected),
            5 => Some(ApplicationStatus::OfferSent),
            _ => None,
        }
    }

    pub fn backend_id(self) -> i64 {
        match self {
            ApplicationStatus::Submitted => 1,
            ApplicationStatus::UnderReview => 2,
            ApplicationStatus::UndergoingFurtherScreening => 3,
            ApplicationStatus::Rejected => 4,
            ApplicationStatus::OfferSent => 5,
        }
    }

    /// Every status may move to every other status; the backend owns workflow rules.
    pub fn transition(self, to: ApplicationStatus) -> ApplicationStatus {
        to
    }

    pub fn category(self) -> StatusCategory {
        match self {
            ApplicationStatus::Submitted => StatusCategory::Info,
            ApplicationStatus::UnderReview => StatusCategory::Warning,
            ApplicationStatus::UndergoingFurtherScreening => StatusCategory::Secondary,
            ApplicationStatus::Rejected => StatusCategory::Error,
            ApplicationStatus::OfferSent => StatusCategory::Success,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_wire() == normalized)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Info,
    Warning,
    Secondary,
    Error,
    Success,
    Neutral,
}

/// Status as received from the backend. Values outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusValue {
    Known(ApplicationStatus),
    Unrecognized(String),
}

impl StatusValue {
    pub fn known(&self) -> Option<ApplicationStatus> {
        match self {
            StatusValue::Known(status) => Some(*status),
            StatusValue::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusValue::Known(status) => status.as_wire(),
            StatusValue::Unrecognized(raw) => raw,
        }
    }

    pub fn category(&self) -> StatusCategory {
        self.known()
            .map(ApplicationStatus::category)
            .unwrap_or(StatusCategory::Neutral)
    }
}

impl From<String> for StatusValue {
    fn from(raw: String) -> Self {
        match raw.parse::<ApplicationStatus>() {
            Ok(status) => StatusValue::Known(status),
            Err(_) => StatusValue::Unrecognized(raw),
        }
    }
}

impl From<StatusValue> for String {
    fn from(value: StatusValue) -> Self {
        value.as_str().to_string()
    }
}

impl From<ApplicationStatus> for StatusValue {
    fn from(status: ApplicationStatus) -> Self {
        StatusValue::Known(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationKey {
    pub job_id: JobId,
    pub profile_id: ProfileId,
}

impl ApplicationKey {
    pub fn new(job_id: JobId, profile_id: ProfileId) -> Self {
        Self { job_id, profile_id }
    }
}

impl fmt::Display for ApplicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.job_id, self.profile_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub key: ApplicationKey,
    pub job_title: String,
    pub applicant: Applicant,
    pub status: StatusValue,
    pub feedback: Option<String>,
    pub submitted_on: Option<NaiveDate>,
    pub reviewed_on: Option<NaiveDate>,
}
