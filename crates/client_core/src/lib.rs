//! Client for the CyberHire job-marketplace backend.

pub mod aggregator;
pub mod controller;
pub mod credential;
pub mod error;
pub mod jobs;
pub mod media;
pub mod roster;
pub mod status_editor;
pub mod transport;
pub mod view;

pub use aggregator::{filter_by_name, AggregateOutcome, ApplicantAggregator, DegradedJob, RosterEntry};
pub use controller::RecruiterController;
pub use credential::Credential;
pub use error::ClientError;
pub use jobs::{JobBoard, JobDraft, JobPatch, ProfilePatch};
pub use media::{Blob, ObjectUrl, ObjectUrlRegistry, PictureRef, DEFAULT_PROFILE_PICTURE};
pub use roster::JobRoster;
pub use status_editor::{fetch_resume, submit_status, StatusEditor};
pub use transport::{HttpBackend, RecruiterApi};
pub use view::{Generation, RecruiterView, ViewError, ViewErrorCategory, ViewErrorContext};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
