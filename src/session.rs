//! Search / select / export state machine.
//!
//! [`Session`] performs no I/O. Each transition returns the [`Effect`]s the
//! presentation layer has to carry out (issue a request, notify a selection,
//! run an export) and feeds the outcome back through `on_response` or
//! `on_export_finished`.
use crate::api::sanitize_query;
use crate::error::{ExportError, SuggestError};
use crate::export::ExportOutcome;
use crate::models::{Suggestions, Well};
use log::warn;

pub const CONFIRMATION_MESSAGE: &str = "File created.";

/// Identifies one issued suggestion request. Tokens only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Details {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    ResultsShown,
    Selected { details: Details },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { token: RequestToken, query: String },
    WellSelected(Box<Well>),
    Export { wells: Vec<Well>, search: String },
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    input: String,
    suggestions: Vec<Well>,
    message: Option<String>,
    selected: Option<Well>,
    details_expanded: bool,
    error: Option<SuggestError>,
    has_results: bool,
    export_error: Option<String>,
    confirmation: Option<String>,
    issued: u64,
    pending: Option<RequestToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.selected.is_some() {
            let details = if self.details_expanded {
                Details::Expanded
            } else {
                Details::Collapsed
            };
            Phase::Selected { details }
        } else if self.pending.is_some() {
            Phase::Searching
        } else if self.has_results {
            Phase::ResultsShown
        } else {
            Phase::Idle
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[Well] {
        &self.suggestions
    }

    /// Message that came with the last accepted envelope, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn selected(&self) -> Option<&Well> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&SuggestError> {
        self.error.as_ref()
    }

    pub fn export_error(&self) -> Option<&str> {
        self.export_error.as_deref()
    }

    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    pub fn pending(&self) -> Option<RequestToken> {
        self.pending
    }

    /// The query box changed.
    ///
    /// Drops the current list and error right away and supersedes any request
    /// still in flight. Issues at most one fetch. Ignored while a well is
    /// selected, because the query box is not shown then.
    pub fn on_input(&mut self, raw: &str) -> Vec<Effect> {
        if self.selected.is_some() {
            return Vec::new();
        }
        self.input = raw.to_string();
        self.suggestions.clear();
        self.message = None;
        self.error = None;
        self.has_results = false;
        self.pending = None;

        let query = sanitize_query(raw);
        if query.is_empty() {
            return Vec::new();
        }
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.pending = Some(token);
        vec![Effect::Fetch { token, query }]
    }

    /// Apply the outcome of a fetch. Returns `false` when the response was
    /// superseded and discarded. `Ok(None)` means no request went out and
    /// leaves the list empty.
    pub fn on_response(
        &mut self,
        token: RequestToken,
        result: Result<Option<Suggestions>, SuggestError>,
    ) -> bool {
        if self.pending != Some(token) {
            warn!("discarding stale response for request {}", token.0);
            return false;
        }
        self.pending = None;
        self.has_results = true;
        match result {
            Ok(Some(found)) => {
                self.suggestions = found.wells;
                self.message = found.message;
            }
            Ok(None) => self.suggestions.clear(),
            Err(e) => {
                self.suggestions.clear();
                self.error = Some(e);
            }
        }
        true
    }

    /// Choose the suggestion at `index`. Replaces any earlier selection.
    pub fn select(&mut self, index: usize) -> Vec<Effect> {
        let Some(well) = self.suggestions.get(index).cloned() else {
            return Vec::new();
        };
        self.selected = Some(well.clone());
        self.details_expanded = false;
        vec![Effect::WellSelected(Box::new(well))]
    }

    /// Flip between expanded and collapsed details. Returns the new phase.
    pub fn toggle_details(&mut self) -> Phase {
        if self.selected.is_some() {
            self.details_expanded = !self.details_expanded;
        }
        self.phase()
    }

    /// Export the selected well, or every suggestion when nothing is selected.
    pub fn request_export(&self) -> Vec<Effect> {
        let wells = match &self.selected {
            Some(w) => vec![w.clone()],
            None => self.suggestions.clone(),
        };
        vec![Effect::Export {
            wells,
            search: self.input.clone(),
        }]
    }

    pub fn on_export_finished(&mut self, result: &Result<ExportOutcome, ExportError>) {
        match result {
            Ok(ExportOutcome::Written { .. }) => {
                self.export_error = None;
                self.confirmation = Some(CONFIRMATION_MESSAGE.to_string());
            }
            Ok(ExportOutcome::NothingToExport) => {}
            Err(e) => self.export_error = Some(e.to_string()),
        }
    }

    pub fn acknowledge_confirmation(&mut self) {
        self.confirmation = None;
    }

    /// Back to the initial empty state. Token numbering continues, so a
    /// response still in flight is discarded when it arrives.
    pub fn reset(&mut self) {
        let issued = self.issued;
        *self = Self {
            issued,
            ..Self::default()
        };
    }
}
