//! crates/student_admin_core/src/controller.rs
//!
//! The students page as a state machine.
//!
//! All state lives in one `ViewState` value. It only changes by feeding an
//! `Action` to the pure `reduce` function; `StudentsController` is the async
//! driver that performs the network calls and dispatches the resulting
//! actions in order. The visible page is never patched: every mutation is
//! followed by a full refetch and a fresh slice of the snapshot.

use crate::decode;
use crate::domain::{RecordId, Student};
use crate::normalize;
use crate::pager::{self, BULK_FETCH_SIZE, PAGE_SIZE};
use crate::ports::{PortError, StudentService};
use crate::toast::{self, Toast};
use crate::validation::{Field, StudentForm, ValidationErrors};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{error, info};

//=========================================================================================
// State
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last fetch failed; holds the message shown next to the retry button.
    LoadError(String),
}

/// The full snapshot and where the user is in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    all_records: Vec<Student>,
    current_page: usize,
    page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            all_records: Vec::new(),
            current_page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl PageState {
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_count(&self) -> usize {
        self.all_records.len()
    }

    pub fn total_pages(&self) -> usize {
        pager::total_pages(self.total_count(), self.page_size)
    }

    /// The rows on the current page.
    pub fn visible(&self) -> &[Student] {
        pager::paginate(&self.all_records, self.current_page, self.page_size)
    }

    pub fn find(&self, id: &RecordId) -> Option<&Student> {
        self.all_records.iter().find(|s| s.id == *id)
    }
}

/// The create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormDialog {
    #[default]
    Closed,
    Creating,
    Editing(Student),
}

impl FormDialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormDialog::Closed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub phase: Phase,
    pub page: PageState,
    pub form: FormDialog,
    pub form_errors: ValidationErrors,
    pub pending_delete: Option<Student>,
    pub submitting: bool,
    pub deleting: bool,
    pub toast: Option<Toast>,
}

impl ViewState {
    pub fn is_busy(&self) -> bool {
        self.submitting || self.deleting
    }

    /// Text for the delete confirmation dialog, if one is open.
    pub fn delete_prompt(&self) -> Option<String> {
        self.pending_delete.as_ref().map(|student| {
            let name = student.full_name();
            let name = if name.is_empty() { "this student" } else { name.as_str() };
            format!(
                "Are you sure you want to delete {}? This action cannot be undone.",
                name
            )
        })
    }
}

//=========================================================================================
// Actions and the Reducer
//=========================================================================================

/// Which page to land on once a fetch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    /// Exactly this page, even if it is now past the end.
    Exact(usize),
    /// Page 1.
    First,
    /// This page, pulled back to the last page if the list shrank.
    Clamped(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchStarted,
    FetchSucceeded { records: Vec<Student>, target: PageTarget },
    FetchFailed(String),
    PageRequested(usize),
    CreateOpened,
    EditOpened(Student),
    FormClosed,
    FieldEdited(Field),
    ValidationFailed(ValidationErrors),
    SubmitStarted,
    SubmitSucceeded { updated: bool },
    SubmitFailed(String),
    SubmitFinished,
    DeleteRequested(Student),
    DeleteCancelled,
    DeleteStarted,
    DeleteSucceeded,
    DeleteFailed(String),
    DeleteFinished,
    ToastDismissed,
}

/// Computes the next state. Pure: no I/O, no clock.
pub fn reduce(mut state: ViewState, action: Action) -> ViewState {
    match action {
        Action::FetchStarted => {
            state.phase = Phase::Loading;
        }
        Action::FetchSucceeded { records, target } => {
            let total_pages = pager::total_pages(records.len(), state.page.page_size);
            state.page.current_page = match target {
                PageTarget::Exact(page) => page.max(1),
                PageTarget::First => 1,
                PageTarget::Clamped(page) => page.clamp(1, total_pages),
            };
            state.page.all_records = records;
            state.phase = Phase::Loaded;
        }
        Action::FetchFailed(message) => {
            state.phase = Phase::LoadError(message);
            state.toast = Some(Toast::error(toast::LOAD_FAILED));
        }
        Action::PageRequested(page) => {
            state.page.current_page = page.max(1);
        }
        Action::CreateOpened => {
            state.form = FormDialog::Creating;
            state.form_errors = ValidationErrors::new();
        }
        Action::EditOpened(student) => {
            state.form = FormDialog::Editing(student);
            state.form_errors = ValidationErrors::new();
        }
        Action::FormClosed => {
            state.form = FormDialog::Closed;
            state.form_errors = ValidationErrors::new();
        }
        Action::FieldEdited(field) => {
            state.form_errors.clear(field);
        }
        Action::ValidationFailed(errors) => {
            state.form_errors = errors;
        }
        Action::SubmitStarted => {
            state.submitting = true;
            state.form_errors = ValidationErrors::new();
        }
        Action::SubmitSucceeded { updated } => {
            let message = if updated { toast::STUDENT_UPDATED } else { toast::STUDENT_CREATED };
            state.toast = Some(Toast::success(message));
            state.form = FormDialog::Closed;
        }
        Action::SubmitFailed(message) => {
            // The form stays open so the user can retry.
            state.toast = Some(Toast::error(or_fallback(message, toast::SAVE_FAILED)));
        }
        Action::SubmitFinished => {
            state.submitting = false;
        }
        Action::DeleteRequested(student) => {
            state.pending_delete = Some(student);
        }
        Action::DeleteCancelled => {
            state.pending_delete = None;
        }
        Action::DeleteStarted => {
            state.deleting = true;
        }
        Action::DeleteSucceeded => {
            state.toast = Some(Toast::success(toast::STUDENT_DELETED));
            state.pending_delete = None;
        }
        Action::DeleteFailed(message) => {
            state.toast = Some(Toast::error(or_fallback(message, toast::DELETE_FAILED)));
        }
        Action::DeleteFinished => {
            state.deleting = false;
        }
        Action::ToastDismissed => {
            state.toast = None;
        }
    }
    state
}

fn or_fallback(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

//=========================================================================================
// Outcomes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No form is open.
    NoForm,
    /// Another submit or delete is still running.
    Busy,
    /// Nothing was sent; see `ViewState::form_errors`.
    Invalid(ValidationErrors),
    Saved,
    /// The server refused; the form is still open.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NothingPending,
    Busy,
    Deleted,
    Failed(String),
}

//=========================================================================================
// The Async Driver
//=========================================================================================

pub struct StudentsController {
    service: Arc<dyn StudentService>,
    state: ViewState,
    today: fn() -> NaiveDate,
}

impl StudentsController {
    pub fn new(service: Arc<dyn StudentService>) -> Self {
        Self {
            service,
            state: ViewState::default(),
            today: || Local::now().date_naive(),
        }
    }

    /// Replaces the clock used for the date-of-birth check.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Loads the snapshot and shows `page`.
    pub async fn mount(&mut self, page: usize) -> Result<(), PortError> {
        self.refetch(PageTarget::Exact(page)).await
    }

    /// Re-runs the load at the current page, pulled back to the last page
    /// if the list shrank since (a delete whose refetch failed).
    pub async fn retry(&mut self) -> Result<(), PortError> {
        let page = self.state.page.current_page;
        self.refetch(PageTarget::Clamped(page)).await
    }

    /// Moves to `page`. Served from the snapshot when there is one.
    pub async fn change_page(&mut self, page: usize) -> Result<(), PortError> {
        if self.state.page.all_records.is_empty() {
            return self.refetch(PageTarget::Exact(page)).await;
        }
        self.dispatch(Action::PageRequested(page));
        Ok(())
    }

    pub fn open_create_form(&mut self) {
        self.dispatch(Action::CreateOpened);
    }

    pub fn open_edit_form(&mut self, student: Student) {
        self.dispatch(Action::EditOpened(student));
    }

    pub fn close_form(&mut self) {
        self.dispatch(Action::FormClosed);
    }

    pub fn field_edited(&mut self, field: Field) {
        self.dispatch(Action::FieldEdited(field));
    }

    /// Validates and sends the open form.
    pub async fn submit(&mut self, form: &StudentForm) -> SubmitOutcome {
        let editing = match &self.state.form {
            FormDialog::Closed => return SubmitOutcome::NoForm,
            FormDialog::Creating => None,
            FormDialog::Editing(student) => Some(student.id.clone()),
        };
        if self.state.is_busy() {
            return SubmitOutcome::Busy;
        }

        let errors = form.validate_as_of((self.today)());
        if !errors.is_empty() {
            self.dispatch(Action::ValidationFailed(errors.clone()));
            return SubmitOutcome::Invalid(errors);
        }

        let request = form.to_request();
        self.dispatch(Action::SubmitStarted);
        let result = match &editing {
            Some(id) => self.service.update_student(id, &request).await,
            None => self.service.create_student(&request).await,
        };

        let outcome = match result {
            Ok(_) => {
                info!("Saved student ({})", if editing.is_some() { "update" } else { "create" });
                self.dispatch(Action::SubmitSucceeded { updated: editing.is_some() });
                // An edited row stays where it was; a new one may land
                // anywhere in server order, so go back to the start.
                let target = match editing {
                    Some(_) => PageTarget::Exact(self.state.page.current_page),
                    None => PageTarget::First,
                };
                // A failed refetch is reported through `Phase::LoadError`;
                // the save itself went through.
                let _ = self.refetch(target).await;
                SubmitOutcome::Saved
            }
            Err(e) => {
                error!("Failed to save student: {}", e);
                self.dispatch(Action::SubmitFailed(e.message.clone()));
                SubmitOutcome::Failed(e.message)
            }
        };
        self.dispatch(Action::SubmitFinished);
        outcome
    }

    pub fn request_delete(&mut self, student: Student) {
        self.dispatch(Action::DeleteRequested(student));
    }

    pub fn cancel_delete(&mut self) {
        self.dispatch(Action::DeleteCancelled);
    }

    /// Deletes the student awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> DeleteOutcome {
        let id = match &self.state.pending_delete {
            Some(student) => student.id.clone(),
            None => return DeleteOutcome::NothingPending,
        };
        if self.state.is_busy() {
            return DeleteOutcome::Busy;
        }

        self.dispatch(Action::DeleteStarted);
        let outcome = match self.service.delete_student(&id).await {
            Ok(()) => {
                info!("Deleted student {}", id);
                self.dispatch(Action::DeleteSucceeded);
                let page = self.state.page.current_page;
                let _ = self.refetch(PageTarget::Clamped(page)).await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!("Failed to delete student: {}", e);
                self.dispatch(Action::DeleteFailed(e.message.clone()));
                DeleteOutcome::Failed(e.message)
            }
        };
        self.dispatch(Action::DeleteFinished);
        outcome
    }

    pub fn dismiss_toast(&mut self) {
        self.dispatch(Action::ToastDismissed);
    }

    /// Pulls the whole list in one request and replaces the snapshot.
    async fn refetch(&mut self, target: PageTarget) -> Result<(), PortError> {
        self.dispatch(Action::FetchStarted);
        match self.service.list_students(1, BULK_FETCH_SIZE).await {
            Ok(envelope) => {
                let records = decode::students(normalize::into_records(envelope));
                info!("Loaded {} students", records.len());
                self.dispatch(Action::FetchSucceeded { records, target });
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch students: {}", e);
                self.dispatch(Action::FetchFailed(e.message.clone()));
                Err(e)
            }
        }
    }
}
