use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    Input(String),
    Wait(Duration),
    Settle,
    Submit,
    First,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if let Some(event) = parse_line(raw).map_err(|message| ScriptError {
            line: index + 1,
            message,
        })? {
            events.push(event);
        }
    }
    Ok(events)
}

fn parse_line(raw: &str) -> Result<Option<ScriptEvent>, String> {
    let line = raw.trim_start();
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line.trim_end(), ""),
    };

    let event = match command {
        "type" => ScriptEvent::Input(rest.to_string()),
        "clear" => ScriptEvent::Input(String::new()),
        "wait" => ScriptEvent::Wait(parse_duration(rest.trim())?),
        "settle" => ScriptEvent::Settle,
        "submit" => ScriptEvent::Submit,
        "first" => ScriptEvent::First,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(event))
}

fn parse_duration(input: &str) -> Result<Duration, String> {
    if input.is_empty() {
        return Err("wait needs a duration".to_string());
    }

    let (digits, scale) = if let Some(ms) = input.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = input.strip_suffix('s') {
        (secs, 1000)
    } else {
        (input, 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration '{input}'"))?;
    Ok(Duration::from_millis(value.saturating_mul(scale)))
}

/// Interactive mode: each line is the new input value, except `:submit`,
/// `:first` and `:quit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Event(ScriptEvent),
    Quit,
}

pub fn parse_interactive_line(line: &str) -> InteractiveCommand {
    match line.trim_end_matches(&['\r', '\n'][..]) {
        ":submit" => InteractiveCommand::Event(ScriptEvent::Submit),
        ":first" => InteractiveCommand::Event(ScriptEvent::First),
        ":quit" => InteractiveCommand::Quit,
        value => InteractiveCommand::Event(ScriptEvent::Input(value.to_string())),
    }
}
