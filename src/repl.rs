//! Line commands for the interactive `session` subcommand.

use crate::session::{Event, Session};

pub const HELP: &str = "\
Commands:
  main <text>     set the main drawing instruction
  update <text>   set the refinement for the next submit
  submit          send main + update to the interpreter
  undo            step back to the previous drawing
  redo            step forward again
  reset           clear queries, history and errors
  json            print the current drawing as JSON
  history         print the instructions sent so far
  help            show this text
  quit            leave the session";

#[derive(Debug)]
pub enum Input {
    Event(Event),
    ShowJson,
    ShowHistory,
    Help,
    Quit,
    Nothing,
}

pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Nothing);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "main" => Input::Event(Event::SetMainQuery(rest.to_string())),
        "update" => Input::Event(Event::SetUpdateQuery(rest.to_string())),
        "submit" => Input::Event(Event::Submit),
        "undo" => Input::Event(Event::Undo),
        "redo" => Input::Event(Event::Redo),
        "reset" => Input::Event(Event::Reset),
        "json" => Input::ShowJson,
        "history" => Input::ShowHistory,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
    };

    let takes_text = matches!(command.to_ascii_lowercase().as_str(), "main" | "update");
    if !takes_text && !rest.is_empty() {
        return Err(format!("'{}' takes no arguments", command));
    }
    Ok(input)
}

/// One-line summary printed after each event.
pub fn status_line(session: &Session) -> String {
    let history = session.history();
    let shapes = session
        .current()
        .map(|drawing| drawing.shapes.len())
        .unwrap_or(0);
    format!(
        "[{}] versions: {} | shapes: {} | undo: {} | redo: {}",
        session.submit_label(),
        history.past_len(),
        shapes,
        if history.can_undo() { "yes" } else { "no" },
        if history.can_redo() { "yes" } else { "no" },
    )
}

pub fn render_query_log(session: &Session) -> String {
    if session.query_log().is_empty() {
        return "No instructions yet.".to_string();
    }
    session
        .query_log()
        .iter()
        .enumerate()
        .map(|(i, query)| format!("{:>3}. {}", i + 1, query))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_commands_keep_the_rest_of_the_line() {
        match parse_line("main   draw a triangle with sides 3, 4, 5 ").unwrap() {
            Input::Event(Event::SetMainQuery(text)) => {
                assert_eq!(text, "draw a triangle with sides 3, 4, 5")
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse_line("UPDATE make it blue").unwrap() {
            Input::Event(Event::SetUpdateQuery(text)) => assert_eq!(text, "make it blue"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bare_update_clears_the_refinement() {
        assert!(matches!(
            parse_line("update").unwrap(),
            Input::Event(Event::SetUpdateQuery(text)) if text.is_empty()
        ));
    }

    #[test]
    fn simple_commands() {
        assert!(matches!(parse_line("submit").unwrap(), Input::Event(Event::Submit)));
        assert!(matches!(parse_line(" undo ").unwrap(), Input::Event(Event::Undo)));
        assert!(matches!(parse_line("redo").unwrap(), Input::Event(Event::Redo)));
        assert!(matches!(parse_line("reset").unwrap(), Input::Event(Event::Reset)));
        assert!(matches!(parse_line("json").unwrap(), Input::ShowJson));
        assert!(matches!(parse_line("history").unwrap(), Input::ShowHistory));
        assert!(matches!(parse_line("?").unwrap(), Input::Help));
        assert!(matches!(parse_line("exit").unwrap(), Input::Quit));
        assert!(matches!(parse_line("   ").unwrap(), Input::Nothing));
    }

    #[test]
    fn unknown_command_and_stray_arguments_are_errors() {
        assert!(parse_line("draw a circle").is_err());
        assert!(parse_line("undo twice").is_err());
    }

    #[test]
    fn status_reflects_empty_session() {
        let session = Session::new();
        assert_eq!(
            status_line(&session),
            "[Generate Drawing] versions: 0 | shapes: 0 | undo: no | redo: no"
        );
        assert_eq!(render_query_log(&session), "No instructions yet.");
    }
}
