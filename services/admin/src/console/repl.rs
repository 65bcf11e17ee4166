//! services/admin/src/console/repl.rs
//!
//! The interactive loop: reads one command per line, drives the controller,
//! and prints whatever changed. Generic over its input and output so a whole
//! session can be scripted in tests.

use crate::console::commands::{self, Command, CommandError, HELP};
use crate::console::render;
use crate::error::AppError;
use std::sync::Arc;
use student_admin_core::chat::ChatSession;
use student_admin_core::controller::{DeleteOutcome, Phase, StudentsController, SubmitOutcome};
use student_admin_core::domain::{Class, RecordId, Student};
use student_admin_core::ports::ClassService;
use student_admin_core::validation::{Field, StudentForm, CLASSES_UNAVAILABLE};
use student_admin_core::{decode, normalize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{error, info};

const TEXT_FIELDS: [(Field, &str); 4] = [
    (Field::FirstName, "First Name"),
    (Field::LastName, "Last Name"),
    (Field::Email, "Email"),
    (Field::DateOfBirth, "Date of Birth (YYYY-MM-DD)"),
];

/// Answer that abandons the form at any prompt.
const CANCEL: &str = "!";

pub struct Console<R, W> {
    controller: StudentsController,
    classes: Arc<dyn ClassService>,
    chat: Option<ChatSession>,
    chat_opened: bool,
    input: Lines<R>,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        controller: StudentsController,
        classes: Arc<dyn ClassService>,
        chat: Option<ChatSession>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            controller,
            classes,
            chat,
            chat_opened: false,
            input: input.lines(),
            output,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn controller(&self) -> &StudentsController {
        &self.controller
    }

    /// Loads the first page, then serves commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<(), AppError> {
        info!("Console started");
        // Load failures are shown through the page state.
        let _ = self.controller.mount(1).await;
        self.show_page().await?;

        loop {
            let Some(line) = self.prompt("> ").await? else {
                break;
            };
            match commands::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.handle(command).await?,
                Err(CommandError::Empty) => {}
                Err(e) => self.say(&e.to_string()).await?,
            }
        }
        self.output.flush().await?;
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<(), AppError> {
        match command {
            Command::List => self.show_page().await?,
            Command::Page(page) => self.go_to(page).await?,
            Command::Next => {
                let page = &self.controller.state().page;
                if page.current_page() >= page.total_pages() {
                    self.say("Already on the last page").await?;
                } else {
                    let next = page.current_page() + 1;
                    self.go_to(next).await?;
                }
            }
            Command::Prev => {
                let current = self.controller.state().page.current_page();
                if current <= 1 {
                    self.say("Already on the first page").await?;
                } else {
                    self.go_to(current - 1).await?;
                }
            }
            Command::Add => {
                self.controller.open_create_form();
                self.say("Add New Student").await?;
                self.run_form(StudentForm::empty()).await?;
            }
            Command::Edit(id) => {
                if let Some(student) = self.lookup(&id).await? {
                    self.say(&format!("Edit Student (ID {})", student.id)).await?;
                    let form = StudentForm::from_student(&student);
                    self.controller.open_edit_form(student);
                    self.run_form(form).await?;
                }
            }
            Command::Delete(id) => {
                if let Some(student) = self.lookup(&id).await? {
                    self.controller.request_delete(student);
                    self.run_delete().await?;
                }
            }
            Command::Retry => {
                let _ = self.controller.retry().await;
                self.show_page().await?;
            }
            Command::Classes => {
                let classes = self.load_classes().await?;
                self.say(&render::class_choices(&classes, &[])).await?;
            }
            Command::Chat(text) => self.chat(&text).await?,
            Command::Help => self.say(HELP).await?,
            Command::Quit => {}
        }
        Ok(())
    }

    async fn go_to(&mut self, page: usize) -> Result<(), AppError> {
        let _ = self.controller.change_page(page).await;
        self.show_page().await
    }

    /// Finds a student in the snapshot, or says it is not there.
    async fn lookup(&mut self, id: &RecordId) -> Result<Option<Student>, AppError> {
        let found = self.controller.state().page.find(id).cloned();
        if found.is_none() {
            self.say(&format!("No student with ID {}", id)).await?;
        }
        Ok(found)
    }

    //=====================================================================================
    // Form and Dialog Flows
    //=====================================================================================

    async fn run_form(&mut self, mut form: StudentForm) -> Result<(), AppError> {
        let classes = self.load_classes().await?;
        self.say("(Enter keeps the current value, '-' clears it, '!' cancels)")
            .await?;

        loop {
            for (field, label) in TEXT_FIELDS {
                let current = match field {
                    Field::FirstName => form.first_name.clone(),
                    Field::LastName => form.last_name.clone(),
                    Field::Email => form.email.clone(),
                    _ => form.date_of_birth.clone(),
                };
                let Some(answer) = self.prompt(&format!("{} [{}]: ", label, current)).await? else {
                    return self.cancel_form().await;
                };
                match answer.trim() {
                    "" => {}
                    CANCEL => return self.cancel_form().await,
                    "-" => {
                        form.set_field(field, "");
                        self.controller.field_edited(field);
                    }
                    _ => {
                        form.set_field(field, answer.clone());
                        self.controller.field_edited(field);
                    }
                }
            }

            if !classes.is_empty() {
                self.say(&render::class_choices(&classes, &form.class_ids)).await?;
                let Some(answer) = self
                    .prompt("Toggle classes by number (space separated, Enter keeps): ")
                    .await?
                else {
                    return self.cancel_form().await;
                };
                if answer.trim() == CANCEL {
                    return self.cancel_form().await;
                }
                let mut toggled = false;
                for token in answer.split_whitespace() {
                    match token.parse::<usize>().ok().and_then(|n| classes.get(n.wrapping_sub(1))) {
                        Some(class) => {
                            form.toggle_class(class.id.clone());
                            toggled = true;
                        }
                        None => self.say(&format!("Ignoring '{}'", token)).await?,
                    }
                }
                if toggled {
                    self.controller.field_edited(Field::ClassIds);
                }
            }

            match self.controller.submit(&form).await {
                SubmitOutcome::Saved => {
                    self.show_page().await?;
                    return Ok(());
                }
                SubmitOutcome::Invalid(errors) => {
                    self.say("Please fix the following:").await?;
                    self.say(&render::validation_errors(&errors)).await?;
                }
                SubmitOutcome::Failed(_) => self.show_toast().await?,
                SubmitOutcome::Busy | SubmitOutcome::NoForm => return Ok(()),
            }

            if !self.confirm("Try again? [Y/n] ", true).await? {
                return self.cancel_form().await;
            }
        }
    }

    async fn cancel_form(&mut self) -> Result<(), AppError> {
        self.controller.close_form();
        self.say("Cancelled").await
    }

    async fn run_delete(&mut self) -> Result<(), AppError> {
        loop {
            let prompt = self.controller.state().delete_prompt().unwrap_or_default();
            self.say(&prompt).await?;
            if !self.confirm("Delete? [y/N] ", false).await? {
                self.controller.cancel_delete();
                return self.say("Cancelled").await;
            }
            match self.controller.confirm_delete().await {
                DeleteOutcome::Deleted => return self.show_page().await,
                DeleteOutcome::Failed(_) => self.show_toast().await?,
                DeleteOutcome::Busy | DeleteOutcome::NothingPending => return Ok(()),
            }
        }
    }

    /// Fetches the class list for the picker. A failure is reported and
    /// leaves the picker empty.
    async fn load_classes(&mut self) -> Result<Vec<Class>, AppError> {
        match self.classes.list_classes().await {
            Ok(envelope) => Ok(decode::classes(normalize::into_records(envelope))),
            Err(e) => {
                error!("Failed to load classes: {}", e);
                self.say(&format!("  {}: {}", Field::Classes, CLASSES_UNAVAILABLE)).await?;
                Ok(Vec::new())
            }
        }
    }

    //=====================================================================================
    // Chat
    //=====================================================================================

    async fn chat(&mut self, text: &str) -> Result<(), AppError> {
        let Some(session) = self.chat.as_mut() else {
            return self.say("Chat is not configured (set CHATBOT_API)").await;
        };

        let mut intro = Vec::new();
        if !self.chat_opened {
            self.chat_opened = true;
            intro.extend(session.messages().iter().map(render::chat_message));
            for (index, question) in session.suggestions().iter().enumerate() {
                intro.push(format!("  ({}) {}", index + 1, question));
            }
        }

        // A bare number picks one of the suggested questions while they are offered.
        let suggestion = text
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1 && *n <= session.suggestions().len());
        let reply = match suggestion {
            Some(n) => session.send_suggestion(n - 1).await,
            None => session.send(text).await,
        }
        .map(render::chat_message);

        for line in intro {
            self.say(&line).await?;
        }
        if let Some(reply) = reply {
            self.say(&reply).await?;
        }
        Ok(())
    }

    //=====================================================================================
    // Output Helpers
    //=====================================================================================

    async fn show_page(&mut self) -> Result<(), AppError> {
        let state = self.controller.state();
        let text = match &state.phase {
            Phase::LoadError(message) => render::load_error(message),
            Phase::Idle | Phase::Loading => "Loading...".to_string(),
            Phase::Loaded => {
                let visible = state.page.visible();
                let mut text = render::students_table(visible);
                if !visible.is_empty() {
                    text.push('\n');
                    text.push_str(&render::pagination(&state.page));
                }
                text
            }
        };
        self.say(&text).await?;
        self.show_toast().await
    }

    /// Prints the pending toast once, then dismisses it.
    async fn show_toast(&mut self) -> Result<(), AppError> {
        if let Some(toast) = self.controller.state().toast.clone() {
            self.say(&render::toast(&toast)).await?;
            self.controller.dismiss_toast();
        }
        Ok(())
    }

    async fn confirm(&mut self, question: &str, default: bool) -> Result<bool, AppError> {
        let answer = self.prompt(question).await?;
        Ok(match answer.as_deref().map(str::trim) {
            None => false,
            Some("") => default,
            Some(a) => a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes"),
        })
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>, AppError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.input.next_line().await?)
    }

    async fn say(&mut self, text: &str) -> Result<(), AppError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        Ok(())
    }
}
