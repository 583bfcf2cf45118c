//! State of the recruiter review screen, kept in one record.

use shared::{
    domain::{ApplicationKey, ProfileId},
    error::ErrorCode,
};
use tracing::debug;

use crate::{
    aggregator::{filter_by_name, AggregateOutcome, DegradedJob, RosterEntry},
    error::ClientError,
    media::ObjectUrl,
    status_editor::StatusEditor,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewErrorCategory {
    Auth,
    NotFound,
    Service,
    Malformed,
    Validation,
}

impl From<ErrorCode> for ViewErrorCategory {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Unauthorized => ViewErrorCategory::Auth,
            ErrorCode::NotFound => ViewErrorCategory::NotFound,
            ErrorCode::Service => ViewErrorCategory::Service,
            ErrorCode::MalformedResponse => ViewErrorCategory::Malformed,
            ErrorCode::Validation => ViewErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewErrorContext {
    LoadRoster,
    SubmitStatus,
    FetchResume,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    category: ViewErrorCategory,
    context: ViewErrorContext,
    message: String,
}

impl ViewError {
    pub fn new(context: ViewErrorContext, err: &ClientError) -> Self {
        Self {
            category: err.kind().into(),
            context,
            message: err.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == ViewErrorCategory::Auth
    }

    pub fn category(&self) -> ViewErrorCategory {
        self.category
    }

    pub fn context(&self) -> ViewErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ViewError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenResume {
    pub profile_id: ProfileId,
    pub url: ObjectUrl,
}

#[derive(Debug, Default)]
pub struct RecruiterView {
    roster: Vec<RosterEntry>,
    degraded: Vec<DegradedJob>,
    filter_query: String,
    selected: Option<ApplicationKey>,
    editor: Option<StatusEditor>,
    resume: Option<OpenResume>,
    last_error: Option<ViewError>,
    redirect_to_sign_in: bool,
    issued: Generation,
    applied: Generation,
    loading: bool,
}

impl RecruiterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&mut self) -> Generation {
        self.issued = self.issued.next();
        self.loading = true;
        self.issued
    }

    fn is_stale(&self, generation: Generation) -> bool {
        generation != self.issued || generation <= self.applied
    }

    /// Installs a freshly aggregated roster. Returns `false` when the result is stale.
    pub fn apply_roster(&mut self, generation: Generation, outcome: AggregateOutcome) -> bool {
        if self.is_stale(generation) {
            debug!(
                generation = generation.value(),
                newest = self.issued.value(),
                "view: dropping stale roster"
            );
            return false;
        }

        self.roster = outcome.entries;
        self.degraded = outcome.degraded;
        self.applied = generation;
        self.loading = false;
        self.last_error = None;

        if let Some(key) = self.selected {
            if !self.roster.iter().any(|entry| entry.key() == key) {
                self.selected = None;
            }
        }
        if let Some(editor) = &self.editor {
            if self.selected != Some(editor.key()) {
                self.editor = None;
            }
        }
        true
    }

    /// Records a failed refresh. The previous roster stays in place.
    pub fn apply_failure(&mut self, generation: Generation, error: ViewError) -> bool {
        if generation != self.issued {
            debug!(
                generation = generation.value(),
                newest = self.issued.value(),
                "view: dropping stale failure"
            );
            return false;
        }
        self.loading = false;
        self.record_error(error);
        true
    }

    pub fn record_error(&mut self, error: ViewError) {
        if error.requires_reauth() {
            self.redirect_to_sign_in = true;
        }
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn degraded(&self) -> &[DegradedJob] {
        &self.degraded
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter_query = query.into();
    }

    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    pub fn visible(&self) -> Vec<&RosterEntry> {
        filter_by_name(&self.roster, &self.filter_query)
    }

    pub fn select(&mut self, key: ApplicationKey) -> bool {
        if self.roster.iter().any(|entry| entry.key() == key) {
            self.selected = Some(key);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&RosterEntry> {
        let key = self.selected?;
        self.roster.iter().find(|entry| entry.key() == key)
    }

    /// Opens the status dialog for the selected row.
    pub fn open_editor(&mut self) -> Option<&mut StatusEditor> {
        let editor = StatusEditor::open(&self.selected()?.application);
        self.editor = Some(editor);
        self.editor.as_mut()
    }

    pub fn editor(&self) -> Option<&StatusEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut StatusEditor> {
        self.editor.as_mut()
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub fn open_resume(&mut self, profile_id: ProfileId, url: ObjectUrl) {
        self.resume = Some(OpenResume { profile_id, url });
    }

    pub fn resume(&self) -> Option<&OpenResume> {
        self.resume.as_ref()
    }

    pub fn close_resume(&mut self) {
        self.resume = None;
    }

    pub fn last_error(&self) -> Option<&ViewError> {
        self.last_error.as_ref()
    }

    pub fn redirect_to_sign_in(&self) -> bool {
        self.redirect_to_sign_in
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> Generation {
        self.applied
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
