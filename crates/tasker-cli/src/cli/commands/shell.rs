//! Interactive line mode.
//!
//! Each line becomes one gesture; the screen is re-rendered after it is
//! handled and the notice is then dismissed so it shows once.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use tasker_core::{NewTask, Priority, TaskPatch};
use tasker_ui::{AuthForm, Gesture, Runtime, Services, render};

use super::StdinPrompter;
use super::tasks::parse_deadline_change;

const HELP: &str = "\
Account:
  signup                            show the sign-up form
  signup <email> <password> <name>  create an account
  verify <code>                     confirm the emailed code
  resend                            send the code again
  login                             show the login form
  login <email> <password>          log in
  logout                            log out
Tasks:
  list                              show tasks
  add <name>                        add a task
  edit <id> <field> [value]         field: name, description, deadline, priority
  complete <id>                     mark a task completed
  delete <id>                       delete a task
  filter all|pending|completed
  sort newest|oldest|name
  refresh                           reload from storage
Other:
  help, quit";

#[derive(Debug)]
enum Input {
    Empty,
    Help,
    Quit,
    Show,
    Gesture(Gesture),
}

pub async fn run(services: Services) -> Result<()> {
    let mut runtime = Runtime::new(services, StdinPrompter::default());
    runtime.start().await;
    show(&mut runtime).await;

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().context("flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("read input")? == 0 {
            break;
        }

        match parse_line(&line) {
            Ok(Input::Empty) => {}
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Ok(Input::Show) => show(&mut runtime).await,
            Ok(Input::Gesture(gesture)) => {
                runtime.gesture(gesture).await;
                show(&mut runtime).await;
            }
            Err(message) => println!("✗ {message}"),
        }
    }
    Ok(())
}

async fn show(runtime: &mut Runtime<StdinPrompter>) {
    print!("{}", render(runtime.state(), Utc::now()));
    runtime.gesture(Gesture::NoticeDismissed).await;
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, r)| (c, r.trim()));

    let gesture = match command.to_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "list" | "ls" | "show" => return Ok(Input::Show),
        "signup" if rest.is_empty() => Gesture::ShowForm(AuthForm::SignUp),
        "signup" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let email = parts.next().unwrap_or_default();
            let password = parts.next().unwrap_or_default();
            let name = parts.next().unwrap_or_default().trim();
            Gesture::SignUpSubmitted {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            }
        }
        "verify" => Gesture::VerifySubmitted {
            code: rest.to_string(),
        },
        "resend" => Gesture::ResendClicked,
        "login" if rest.is_empty() => Gesture::ShowForm(AuthForm::Login),
        "login" => {
            let (email, password) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(e, p)| (e, p.trim()));
            Gesture::LoginSubmitted {
                email: email.to_string(),
                password: password.to_string(),
            }
        }
        "logout" => Gesture::LogoutClicked,
        "add" => Gesture::AddSubmitted(NewTask::new(rest)),
        "edit" => parse_edit(rest)?,
        "complete" | "done" => Gesture::CompleteClicked {
            id: required_id(rest)?,
        },
        "delete" | "rm" => Gesture::DeleteClicked {
            id: required_id(rest)?,
        },
        "filter" => Gesture::FilterClicked(rest.parse()?),
        "sort" => Gesture::SortChanged(rest.parse()?),
        "refresh" => Gesture::RefreshClicked,
        other => return Err(format!("Unknown command: {other} (try `help`)")),
    };
    Ok(Input::Gesture(gesture))
}

fn required_id(rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        return Err("Missing task id".to_string());
    }
    Ok(rest.to_string())
}

fn parse_edit(rest: &str) -> Result<Gesture, String> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let id = required_id(parts.next().unwrap_or_default())?;
    let field = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default().trim();

    let mut patch = TaskPatch::default();
    match field {
        "name" => patch.name = Some(value.to_string()),
        "description" => patch.description = Some(value.to_string()),
        "deadline" => {
            patch.deadline = parse_deadline_change(Some(value)).map_err(|e| e.to_string())?;
        }
        "priority" => patch.priority = Some(value.parse::<Priority>()?),
        "" => return Err("Missing field (name, description, deadline, priority)".to_string()),
        other => return Err(format!("Unknown field: {other}")),
    }
    Ok(Gesture::EditSubmitted { id, patch })
}
