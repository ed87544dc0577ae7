//! Interactive terminal front end for the employee controller.
//!
//! Input lines are read on a blocking thread while requests run as spawned
//! tasks, so the page stays responsive (and the busy guard matters) while a
//! write is in flight. Completions come back over a channel and re-render
//! the page. On exit the loop keeps draining completions until the
//! controller is idle again, so an accepted write is never abandoned.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use crate::client::EmployeeApi;
use crate::controller::{Command, Completion, EmployeeController, Interaction, Phase, Rejected};
use crate::models::{is_well_formed_email, Employee, Field};
use crate::view;

const HELP: &str = "\
Commands:
  name <value>         set the name field
  email <value>        set the email field
  department <value>   set the department field
  submit               add the employee, or update it while editing
  edit <id>            load a record into the form
  delete <id>          delete a record (asks for confirmation)
  reset                clear the form and leave edit mode
  refresh              reload the table from the server
  show                 print the page again
  help                 show this help
  quit                 leave";

/// A parsed console input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Set(Field, String),
    Submit,
    Edit(String),
    Delete(String),
    Reset,
    Refresh,
    Show,
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `Show`.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    if let Ok(field) = word.parse::<Field>() {
        return Ok(ConsoleCommand::Set(field, rest.to_string()));
    }

    let require_id = |command: fn(String) -> ConsoleCommand| {
        if rest.is_empty() {
            Err(format!("'{}' needs an employee id", word))
        } else {
            Ok(command(rest.to_string()))
        }
    };

    match word.to_ascii_lowercase().as_str() {
        "" | "show" => Ok(ConsoleCommand::Show),
        "submit" | "save" => Ok(ConsoleCommand::Submit),
        "edit" => require_id(ConsoleCommand::Edit),
        "delete" | "rm" => require_id(ConsoleCommand::Delete),
        "reset" | "clear" => Ok(ConsoleCommand::Reset),
        "refresh" | "reload" => Ok(ConsoleCommand::Refresh),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => Err(format!("unknown command '{}', type 'help'", other)),
    }
}

/// Input-layer checks a form would enforce before allowing submit.
pub fn check_draft(draft: &Employee) -> Result<(), String> {
    let missing: Vec<&str> = Field::ALL
        .iter()
        .filter(|field| draft.field(**field).trim().is_empty())
        .map(Field::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(format!("Please fill in: {}", missing.join(", ")));
    }
    if !is_well_formed_email(draft.email.trim()) {
        return Err(format!("'{}' is not a valid email address", draft.email));
    }
    Ok(())
}

/// What the event loop should do after handling a line.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Render,
    Dispatch(Command),
    Print(String),
    Quit,
}

/// Apply one input line to the controller.
pub fn handle_line<I: Interaction>(controller: &mut EmployeeController<I>, line: &str) -> Step {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => return Step::Print(message),
    };

    let outcome = match command {
        ConsoleCommand::Set(field, value) => {
            controller.set_field(field, value);
            return Step::Render;
        }
        ConsoleCommand::Submit => {
            if let Err(message) = check_draft(controller.draft()) {
                return Step::Print(message);
            }
            controller.submit().map(Some)
        }
        ConsoleCommand::Edit(id) => controller.enter_edit(&id).map(|()| None),
        ConsoleCommand::Delete(id) => controller.delete(&id),
        ConsoleCommand::Reset => controller.reset().map(|()| None),
        ConsoleCommand::Refresh => controller.reload().map(Some),
        ConsoleCommand::Show => return Step::Render,
        ConsoleCommand::Help => return Step::Print(HELP.to_string()),
        ConsoleCommand::Quit => return Step::Quit,
    };

    match outcome {
        Ok(Some(command)) => Step::Dispatch(command),
        Ok(None) => Step::Render,
        Err(Rejected::Busy) => Step::Print("Please wait for the current request to finish.".into()),
        Err(rejected) => Step::Print(rejected.to_string()),
    }
}

/// Confirmation and notices on the terminal, sharing the console's input.
pub struct ConsoleInteraction<R> {
    input: Arc<Mutex<R>>,
}

impl<R> ConsoleInteraction<R> {
    pub fn new(input: Arc<Mutex<R>>) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Interaction for ConsoleInteraction<R> {
    // Called from the event loop, so this parks its worker until the answer
    // arrives. No line read is pending while a command is handled, and the
    // loop has nothing else to do until the user answers.
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();
        match read_line(&self.input) {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }

    fn notify(&mut self, message: &str) {
        println!("* {}", message);
    }
}

/// Run the console over `input` until the user quits or the input ends.
///
/// Writes still in flight at that point, and the reloads they trigger, are
/// awaited before returning.
pub async fn run<A, R>(api: Arc<A>, input: R) -> io::Result<()>
where
    A: EmployeeApi + ?Sized + 'static,
    R: BufRead + Send + 'static,
{
    let input = Arc::new(Mutex::new(input));
    let mut controller = EmployeeController::new(ConsoleInteraction::new(Arc::clone(&input)));
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    if let Ok(command) = controller.mount() {
        controller.drive(api.as_ref(), command).await;
    }
    print_page(&controller);
    println!("Type 'help' for commands.");

    let mut pending_line: Option<JoinHandle<io::Result<Option<String>>>> = None;
    loop {
        let reader = pending_line.get_or_insert_with(|| {
            let input = Arc::clone(&input);
            tokio::task::spawn_blocking(move || read_line(&input))
        });

        tokio::select! {
            joined = reader => {
                pending_line = None;
                let Some(line) = joined.map_err(io::Error::other)?? else {
                    tracing::debug!("Console input closed");
                    break;
                };

                match handle_line(&mut controller, &line) {
                    Step::Render => print_page(&controller),
                    Step::Dispatch(command) => {
                        dispatch(&api, &tx, command);
                        print_page(&controller);
                    }
                    Step::Print(message) => println!("{}", message),
                    Step::Quit => break,
                }
            }
            Some(completion) = rx.recv() => {
                if let Some(next) = controller.complete(completion) {
                    dispatch(&api, &tx, next);
                }
                print_page(&controller);
            }
        }
    }

    while controller.phase() != Phase::Idle {
        tracing::debug!("Waiting for {:?} to finish before exit", controller.phase());
        let Some(completion) = rx.recv().await else {
            break;
        };
        if let Some(next) = controller.complete(completion) {
            dispatch(&api, &tx, next);
        }
        print_page(&controller);
    }

    Ok(())
}

fn dispatch<A>(api: &Arc<A>, tx: &UnboundedSender<Completion>, command: Command)
where
    A: EmployeeApi + ?Sized + 'static,
{
    let api = Arc::clone(api);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = command.execute(api.as_ref()).await;
        // The receiver only goes away once the console has returned.
        let _ = tx.send(completion);
    });
}

fn print_page<I: Interaction>(controller: &EmployeeController<I>) {
    println!();
    print!("{}", view::render(controller));
    let _ = io::stdout().flush();
}

fn read_line<R: BufRead>(input: &Mutex<R>) -> io::Result<Option<String>> {
    let mut input = input
        .lock()
        .map_err(|_| io::Error::other("console input lock poisoned"))?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
