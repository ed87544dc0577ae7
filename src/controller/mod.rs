//! View-state controller.
//!
//! Owns the collection snapshot, the draft form and the edit-mode flag, and
//! keeps them in step with the remote collection by re-fetching after every
//! successful write. The snapshot is never patched locally.
//!
//! The controller performs no I/O itself. Each transition that needs the
//! network hands back a [`Command`]; the caller executes it against an
//! [`EmployeeApi`] and feeds the [`Completion`] into [`EmployeeController::complete`].
//! [`EmployeeController::drive`] does both in a loop for callers that can
//! simply await.

use thiserror::Error;

use crate::client::{ClientResult, EmployeeApi};
use crate::errors::ClientError;
use crate::models::{Employee, Field};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this employee?";

/// Blocking user-interaction gates used by the controller.
pub trait Interaction {
    /// Ask a yes/no question; `true` means go ahead.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Acknowledge a completed action.
    fn notify(&mut self, message: &str);
}

/// What the controller is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Submitting,
}

/// A write against the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(Employee),
    Update { id: String, employee: Employee },
    Delete { id: String },
}

impl Mutation {
    fn success_message(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "Employee added successfully!",
            Mutation::Update { .. } => "Employee updated successfully!",
            Mutation::Delete { .. } => "Employee deleted successfully!",
        }
    }

    fn failure_context(&self) -> &'static str {
        match self {
            Mutation::Create(_) | Mutation::Update { .. } => "Error saving employee",
            Mutation::Delete { .. } => "Error deleting employee",
        }
    }

    fn is_submit(&self) -> bool {
        !matches!(self, Mutation::Delete { .. })
    }
}

/// Network effect requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load,
    Mutate(Mutation),
}

impl Command {
    /// Run the command against `api`, producing the completion to feed back.
    pub async fn execute<A: EmployeeApi + ?Sized>(self, api: &A) -> Completion {
        match self {
            Command::Load => Completion::Loaded(api.list().await),
            Command::Mutate(mutation) => {
                let result = match &mutation {
                    Mutation::Create(draft) => api.create(draft).await.map(|_| ()),
                    Mutation::Update { id, employee } => {
                        api.update(id, employee).await.map(|_| ())
                    }
                    Mutation::Delete { id } => api.delete(id).await,
                };
                Completion::Mutated(result)
            }
        }
    }
}

/// Result of an executed [`Command`].
#[derive(Debug)]
pub enum Completion {
    Loaded(ClientResult<Vec<Employee>>),
    Mutated(ClientResult<()>),
}

/// A user action the controller refused to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("a request is already in flight")]
    Busy,
    #[error("no employee with id {0}")]
    UnknownRecord(String),
}

/// State-synchronization controller for the employee page.
pub struct EmployeeController<I> {
    interaction: I,
    employees: Vec<Employee>,
    draft: Employee,
    editing: bool,
    phase: Phase,
    in_flight: Option<Mutation>,
    last_error: Option<String>,
}

impl<I: Interaction> EmployeeController<I> {
    pub fn new(interaction: I) -> Self {
        Self {
            interaction,
            employees: Vec::new(),
            draft: Employee::default(),
            editing: false,
            phase: Phase::Idle,
            in_flight: None,
            last_error: None,
        }
    }

    /// The collection as last fetched.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn draft(&self) -> &Employee {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Message of the most recent failed request, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing {
            "Update Employee"
        } else {
            "Add Employee"
        }
    }

    /// First activation: start from an empty form and load the collection.
    pub fn mount(&mut self) -> Result<Command, Rejected> {
        self.ensure_idle()?;
        self.clear_draft();
        Ok(self.begin_load())
    }

    /// Re-fetch the collection without touching the draft.
    pub fn reload(&mut self) -> Result<Command, Rejected> {
        self.ensure_idle()?;
        Ok(self.begin_load())
    }

    /// Change one draft field. Purely local.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }

    /// Create or update the draft depending on edit-mode.
    pub fn submit(&mut self) -> Result<Command, Rejected> {
        self.ensure_idle()?;

        let mutation = if self.editing {
            Mutation::Update {
                id: self.draft.id.clone(),
                employee: self.draft.clone(),
            }
        } else {
            Mutation::Create(self.draft.clone())
        };

        Ok(self.begin_mutation(mutation))
    }

    /// Copy the selected record into the draft and switch to edit-mode.
    pub fn enter_edit(&mut self, id: &str) -> Result<(), Rejected> {
        self.ensure_idle()?;
        let selected = self.find(id)?.clone();
        tracing::debug!("Editing employee {}", selected.id);
        self.draft = selected;
        self.editing = true;
        Ok(())
    }

    /// Delete the selected record once the user confirms.
    ///
    /// Returns `Ok(None)` when the user declines.
    pub fn delete(&mut self, id: &str) -> Result<Option<Command>, Rejected> {
        self.ensure_idle()?;
        let id = self.find(id)?.id.clone();

        if !self.interaction.confirm(DELETE_PROMPT) {
            tracing::debug!("Deletion of employee {} declined", id);
            return Ok(None);
        }

        Ok(Some(self.begin_mutation(Mutation::Delete { id })))
    }

    /// Drop the draft and leave edit-mode.
    pub fn reset(&mut self) -> Result<(), Rejected> {
        self.ensure_idle()?;
        self.clear_draft();
        Ok(())
    }

    /// Apply the result of an executed command.
    ///
    /// A successful write asks for a reload; everything else ends in Idle.
    pub fn complete(&mut self, completion: Completion) -> Option<Command> {
        match completion {
            Completion::Loaded(Ok(employees)) => {
                tracing::debug!("Loaded {} employees", employees.len());
                self.employees = employees;
                self.last_error = None;
                self.phase = Phase::Idle;
                None
            }
            Completion::Loaded(Err(err)) => {
                self.fail("Error fetching employees", &err);
                None
            }
            Completion::Mutated(result) => {
                let Some(mutation) = self.in_flight.take() else {
                    tracing::warn!("Ignoring a write completion with nothing in flight");
                    return None;
                };

                match result {
                    Ok(()) => {
                        if mutation.is_submit() {
                            self.clear_draft();
                        }
                        self.last_error = None;
                        self.interaction.notify(mutation.success_message());
                        Some(self.begin_load())
                    }
                    Err(err) => {
                        self.fail(mutation.failure_context(), &err);
                        None
                    }
                }
            }
        }
    }

    /// Execute `command` and everything it leads to until the controller is idle.
    pub async fn drive<A: EmployeeApi + ?Sized>(&mut self, api: &A, command: Command) {
        let mut next = Some(command);
        while let Some(command) = next.take() {
            let completion = command.execute(api).await;
            next = self.complete(completion);
        }
    }

    fn ensure_idle(&self) -> Result<(), Rejected> {
        if self.phase == Phase::Idle {
            Ok(())
        } else {
            tracing::debug!("Rejecting action while {:?}", self.phase);
            Err(Rejected::Busy)
        }
    }

    fn find(&self, id: &str) -> Result<&Employee, Rejected> {
        self.employees
            .iter()
            .find(|employee| employee.id == id)
            .ok_or_else(|| Rejected::UnknownRecord(id.to_string()))
    }

    fn clear_draft(&mut self) {
        self.draft = Employee::default();
        self.editing = false;
    }

    fn begin_load(&mut self) -> Command {
        self.phase = Phase::Loading;
        Command::Load
    }

    fn begin_mutation(&mut self, mutation: Mutation) -> Command {
        self.phase = Phase::Submitting;
        self.in_flight = Some(mutation.clone());
        Command::Mutate(mutation)
    }

    // Failures never leave Idle and never touch the snapshot or the draft.
    fn fail(&mut self, context: &str, err: &ClientError) {
        tracing::error!("{}: {}", context, err);
        self.last_error = Some(format!("{}: {}", context, err));
        self.phase = Phase::Idle;
    }
}
