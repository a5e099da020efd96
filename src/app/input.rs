use super::event::InputEvent;
use crate::services::search::CaseSensitivity;

/// Translates one line of the line-mode front end into an input event.
///
/// Plain text replaces the pattern; `:`-prefixed lines are commands.
/// Unknown commands yield `None`.
pub fn parse_line(line: &str) -> Option<InputEvent> {
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(command) = line.strip_prefix(':') else {
        return Some(InputEvent::PatternChanged(line.to_string()));
    };

    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let event = match name {
        "q" | "quit" => InputEvent::Quit,
        "n" | "next" => InputEvent::SelectNext,
        "p" | "prev" => InputEvent::SelectPrev,
        "pgdn" => InputEvent::PageDown,
        "pgup" => InputEvent::PageUp,
        "sel" => InputEvent::Select(arg.parse().ok()?),
        "path" => InputEvent::PathChanged(arg.to_string()),
        "type" if arg.is_empty() => InputEvent::ClearTypes,
        "type" => InputEvent::TypesChanged(arg.to_string()),
        "syntax" => InputEvent::ToggleSyntax,
        "pick" if !arg.is_empty() => InputEvent::ConfirmType(arg.to_string()),
        "case" => match arg {
            "" => InputEvent::CycleCase,
            "smart" => InputEvent::SetCase(CaseSensitivity::Smart),
            "sensitive" => InputEvent::SetCase(CaseSensitivity::Sensitive),
            "insensitive" => InputEvent::SetCase(CaseSensitivity::Insensitive),
            _ => return None,
        },
        // `::foo` searches for a literal `:foo`.
        _ if command.starts_with(':') => InputEvent::PatternChanged(command.to_string()),
        _ => return None,
    };
    Some(event)
}
