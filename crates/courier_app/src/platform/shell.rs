//! Line-oriented interactive session.
//!
//! Engine events are applied between commands and redrawn when they changed
//! the state. `submit` returns at once; `wait` blocks until the outstanding
//! upload has finished.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use courier_core::UploadState;

use super::app::Session;
use super::picker::collect_files;
use super::render::{render_add_report, render_catalog, render_result, render_status};

const HELP: &str = "\
Commands:
  add <paths...>      add files; directories contribute their *.pdf files
  remove <name>       remove a selected file by name
  toggle <action-id>  select or deselect an action
  actions             list the available actions
  submit              send the selected files and actions
  cancel              abort the upload in progress
  wait                block until the upload in progress finishes
  status              show selections and upload state
  help                show this text
  quit                leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(Vec<PathBuf>),
    Remove(String),
    Toggle(String),
    Actions,
    Submit,
    Cancel,
    Wait,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "add" if !rest.is_empty() => {
            ShellCommand::Add(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "remove" if !rest.is_empty() => ShellCommand::Remove(rest.to_string()),
        "toggle" if !rest.is_empty() => ShellCommand::Toggle(rest.to_string()),
        "add" | "remove" | "toggle" => return Err(format!("{word} needs an argument")),
        "actions" => ShellCommand::Actions,
        "submit" => ShellCommand::Submit,
        "cancel" => ShellCommand::Cancel,
        "wait" => ShellCommand::Wait,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}; try help")),
    };
    Ok(Some(command))
}

/// Run the shell until `quit` or end of input.
pub fn run_shell(
    session: &mut Session,
    input: impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    write!(out, "{}", render_catalog(&session.view()))?;
    writeln!(out, "Type help for commands.")?;
    session.consume_dirty();

    for line in input.lines() {
        let line = line?;
        let was_in_flight = session.state().is_in_flight();
        session.pump();
        report_changes(session, was_in_flight, out)?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        execute(session, command, out)?;
        // The command printed its own outcome.
        session.consume_dirty();
        out.flush()?;
    }
    Ok(())
}

fn execute(session: &mut Session, command: ShellCommand, out: &mut impl Write) -> io::Result<()> {
    match command {
        ShellCommand::Add(paths) => {
            let picked = collect_files(&paths, false);
            for (path, reason) in &picked.rejected {
                writeln!(out, "Skipped {}: {reason}", path.display())?;
            }
            if picked.files.is_empty() {
                writeln!(out, "No files to add.")?;
                return Ok(());
            }
            session.add_files(picked.files);
            if let Some(line) = render_add_report(&session.view()) {
                writeln!(out, "{line}")?;
            }
        }
        ShellCommand::Remove(name) => match session.remove_file_named(&name) {
            Ok(()) => writeln!(out, "Removed {name}.")?,
            Err(err) => writeln!(out, "{err}")?,
        },
        ShellCommand::Toggle(id) => match session.toggle_action(&id) {
            Ok(()) => write!(out, "{}", render_status(&session.view()))?,
            Err(err) => writeln!(out, "{err}")?,
        },
        ShellCommand::Actions => write!(out, "{}", render_catalog(&session.view()))?,
        ShellCommand::Submit => {
            let already_in_flight = session.state().is_in_flight();
            session.submit();
            match session.state().upload() {
                UploadState::InFlight { request_id, .. } if !already_in_flight => {
                    writeln!(out, "Submitted request {request_id}.")?
                }
                UploadState::InFlight { .. } => {
                    writeln!(out, "An upload is already in progress.")?
                }
                UploadState::Idle => writeln!(
                    out,
                    "Nothing to submit: select at least one file and one action."
                )?,
            }
        }
        ShellCommand::Cancel => {
            if session.state().is_in_flight() {
                session.cancel();
                writeln!(out, "Cancelling.")?;
            } else {
                writeln!(out, "No upload in progress.")?;
            }
        }
        ShellCommand::Wait => {
            if !session.state().is_in_flight() {
                writeln!(out, "No upload in progress.")?;
                return Ok(());
            }
            session.wait_for_idle(None);
            report_finished(session, true, out)?;
        }
        ShellCommand::Status => write!(out, "{}", render_status(&session.view()))?,
        ShellCommand::Help => write!(out, "{HELP}")?,
        ShellCommand::Quit => {}
    }
    Ok(())
}

/// Redraw the status when engine events changed the state since the last
/// command. Returns whether anything was printed.
pub fn report_changes(
    session: &mut Session,
    was_in_flight: bool,
    out: &mut impl Write,
) -> io::Result<bool> {
    if !session.consume_dirty() {
        return Ok(false);
    }
    report_finished(session, was_in_flight, out)?;
    write!(out, "{}", render_status(&session.view()))?;
    Ok(true)
}

fn report_finished(session: &Session, was_in_flight: bool, out: &mut impl Write) -> io::Result<()> {
    if was_in_flight && !session.state().is_in_flight() {
        if let Some(result) = session.state().last_result() {
            writeln!(out, "Upload {}.", render_result(result))?;
        }
    }
    Ok(())
}
