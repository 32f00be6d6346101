//! Event DSL parser for headless mode.
//!
//! Parses event strings like "type:USE shop;", "key:f5", "wait:500ms" into
//! executable events.

use super::HeadlessState;
use crate::error::{ConsoleError, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::time::Duration;

/// An assertion to check against the screen or state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// Screen contains text (case-insensitive).
    Contains(String),
    /// Screen contains text (case-sensitive).
    ContainsExact(String),
    /// Screen does not contain text.
    NotContains(String),
    /// Screen matches regex pattern.
    Matches(String),
    /// State field equals value.
    StateEquals { field: String, value: String },
    /// State field comparison (>=, <=, >, <).
    StateCompare {
        field: String,
        op: String,
        value: String,
    },
}

impl Assertion {
    /// Checks the assertion against the rendered screen and a state snapshot.
    pub fn check(&self, screen: &str, state: &HeadlessState) -> bool {
        match self {
            Self::Contains(text) => screen.to_lowercase().contains(&text.to_lowercase()),
            Self::ContainsExact(text) => screen.contains(text),
            Self::NotContains(text) => !screen.to_lowercase().contains(&text.to_lowercase()),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(screen))
                .unwrap_or(false),
            Self::StateEquals { field, value } => {
                state.field(field).as_deref() == Some(value.as_str())
            }
            Self::StateCompare { field, op, value } => {
                compare_values(state.field(field).as_deref(), op, value)
            }
        }
    }
}

/// Compares values using the given operator.
fn compare_values(actual: Option<&str>, op: &str, expected: &str) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    if let (Ok(a), Ok(e)) = (actual.parse::<i64>(), expected.parse::<i64>()) {
        return match op {
            ">=" => a >= e,
            "<=" => a <= e,
            ">" => a > e,
            "<" => a < e,
            "=" | "==" => a == e,
            _ => false,
        };
    }

    match op {
        "=" | "==" => actual == expected,
        _ => false,
    }
}

/// A parsed event that can be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// Type text into the editor as one edit.
    Type(String),
    /// Let background requests run for a duration.
    Wait(Duration),
    /// Resize the terminal.
    Resize(u16, u16),
    /// Assert something about the screen or state.
    Assert(Assertion),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                let mut parts = Vec::new();
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    parts.push("ctrl".to_string());
                }
                if key.modifiers.contains(KeyModifiers::ALT) {
                    parts.push("alt".to_string());
                }
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    parts.push("shift".to_string());
                }
                parts.push(key_code_to_string(&key.code));
                write!(f, "key:{}", parts.join("+"))
            }
            Self::Type(text) => write!(f, "type:{text}"),
            Self::Wait(d) => write!(f, "wait:{}ms", d.as_millis()),
            Self::Resize(w, h) => write!(f, "resize:{w}x{h}"),
            Self::Assert(a) => match a {
                Assertion::Contains(t) => write!(f, "assert:contains:{t}"),
                Assertion::ContainsExact(t) => write!(f, "assert:contains-exact:{t}"),
                Assertion::NotContains(t) => write!(f, "assert:not-contains:{t}"),
                Assertion::Matches(p) => write!(f, "assert:matches:{p}"),
                Assertion::StateEquals { field, value } => {
                    write!(f, "assert:state:{field}={value}")
                }
                Assertion::StateCompare { field, op, value } => {
                    write!(f, "assert:state:{field}{op}{value}")
                }
            },
        }
    }
}

fn key_code_to_string(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => "unknown".to_string(),
    }
}

const EVENT_TYPES: &[&str] = &["key", "type", "wait", "resize", "assert"];

fn starts_event(piece: &str) -> bool {
    piece
        .trim_start()
        .split_once(':')
        .is_some_and(|(kind, _)| EVENT_TYPES.contains(&kind.trim().to_lowercase().as_str()))
}

/// Parser for the event DSL.
#[derive(Debug, Default)]
pub struct EventParser;

impl EventParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses all events from an input string.
    ///
    /// Events are separated by newlines or commas; `#` starts a comment line.
    /// A comma piece that does not begin with an event type belongs to the
    /// previous event, so typed text may contain commas.
    pub fn parse_all(&self, input: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut pieces: Vec<String> = Vec::new();
            for part in line.split(',') {
                match pieces.last_mut() {
                    Some(current) if !starts_event(part) => {
                        current.push(',');
                        current.push_str(part);
                    }
                    _ => pieces.push(part.to_string()),
                }
            }

            for piece in pieces {
                if piece.trim().is_empty() {
                    continue;
                }
                events.push(self.parse_one(&piece)?);
            }
        }

        Ok(events)
    }

    /// Parses a single event string.
    pub fn parse_one(&self, input: &str) -> Result<Event> {
        let input = input.trim();

        let Some((event_type, value)) = input.split_once(':') else {
            return Err(ConsoleError::config(format!(
                "Invalid event syntax: '{input}'. Expected format: type:value"
            )));
        };

        match event_type.trim().to_lowercase().as_str() {
            "key" => self.parse_key(value.trim()),
            // Leading spaces are meaningful when typing.
            "type" => Ok(Event::Type(value.to_string())),
            "wait" => self.parse_wait(value.trim()),
            "resize" => self.parse_resize(value.trim()),
            "assert" => self.parse_assert(value.trim()),
            other => Err(ConsoleError::config(format!(
                "Unknown event type: '{other}'. Valid types: key, type, wait, resize, assert"
            ))),
        }
    }

    /// Parses a key event like "f5", "ctrl+e", "alt+3".
    fn parse_key(&self, value: &str) -> Result<Event> {
        let parts: Vec<&str> = value.split('+').collect();
        let mut modifiers = KeyModifiers::empty();

        let (key_str, modifier_parts) = match parts.split_last() {
            Some((last, rest)) => (*last, rest),
            None => (value, &[][..]),
        };

        for part in modifier_parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => {
                    return Err(ConsoleError::config(format!(
                        "Unknown modifier: '{part}'. Valid modifiers: ctrl, alt, shift"
                    )));
                }
            }
        }

        let code = self.parse_key_code(key_str)?;
        Ok(Event::Key(KeyEvent::new(code, modifiers)))
    }

    fn parse_key_code(&self, s: &str) -> Result<KeyCode> {
        let lower = s.to_lowercase();

        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            if (1..=12).contains(&n) {
                return Ok(KeyCode::F(n));
            }
        }

        let code = match lower.as_str() {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bs" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        return Err(ConsoleError::config(format!(
                            "Unknown key: '{s}'. Use single characters or named keys like enter, esc, tab, f5"
                        )));
                    }
                }
            }
        };

        Ok(code)
    }

    /// Parses a wait duration like "100ms", "2s", or just "100" (milliseconds).
    fn parse_wait(&self, value: &str) -> Result<Event> {
        let value = value.to_lowercase();
        let invalid = || ConsoleError::config(format!("Invalid duration: '{value}'"));

        let duration = if let Some(ms) = value.strip_suffix("ms") {
            Duration::from_millis(ms.parse().map_err(|_| invalid())?)
        } else if let Some(secs) = value.strip_suffix('s') {
            Duration::from_secs(secs.parse().map_err(|_| invalid())?)
        } else {
            Duration::from_millis(value.parse().map_err(|_| invalid())?)
        };

        Ok(Event::Wait(duration))
    }

    /// Parses a resize event like "120x40".
    fn parse_resize(&self, value: &str) -> Result<Event> {
        let (width, height) = value.split_once('x').ok_or_else(|| {
            ConsoleError::config(format!(
                "Invalid resize format: '{value}'. Expected WIDTHxHEIGHT"
            ))
        })?;

        let width: u16 = width
            .parse()
            .map_err(|_| ConsoleError::config(format!("Invalid width: '{width}'")))?;
        let height: u16 = height
            .parse()
            .map_err(|_| ConsoleError::config(format!("Invalid height: '{height}'")))?;

        Ok(Event::Resize(width, height))
    }

    /// Parses an assertion like "contains:users" or "state:busy=false".
    fn parse_assert(&self, value: &str) -> Result<Event> {
        let Some((kind, rest)) = value.split_once(':') else {
            return Err(ConsoleError::config(format!(
                "Invalid assertion syntax: '{value}'. Expected assert:type:value"
            )));
        };
        let rest = rest.trim();

        let assertion = match kind.trim().to_lowercase().as_str() {
            "contains" => Assertion::Contains(rest.to_string()),
            "contains-exact" => Assertion::ContainsExact(rest.to_string()),
            "not-contains" => Assertion::NotContains(rest.to_string()),
            "matches" => Assertion::Matches(rest.to_string()),
            "state" => self.parse_state_assertion(rest)?,
            other => {
                return Err(ConsoleError::config(format!(
                    "Unknown assertion type: '{other}'. Valid types: contains, contains-exact, not-contains, matches, state"
                )));
            }
        };

        Ok(Event::Assert(assertion))
    }

    /// Parses a state assertion like "focus=Editor" or "database_count>=3".
    fn parse_state_assertion(&self, value: &str) -> Result<Assertion> {
        for op in [">=", "<=", ">", "<", "="] {
            if let Some((field, expected)) = value.split_once(op) {
                let field = field.trim().to_string();
                let expected = expected.trim().to_string();
                return Ok(if op == "=" {
                    Assertion::StateEquals {
                        field,
                        value: expected,
                    }
                } else {
                    Assertion::StateCompare {
                        field,
                        op: op.to_string(),
                        value: expected,
                    }
                });
            }
        }

        Err(ConsoleError::config(format!(
            "Invalid state assertion: '{value}'. Expected field=value or field>=value"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_function() {
        let parser = EventParser::new();
        for n in 1..=12 {
            let event = parser.parse_one(&format!("key:f{n}")).unwrap();
            assert_eq!(event, Event::Key(KeyEvent::new(KeyCode::F(n), KeyModifiers::NONE)));
        }
    }

    #[test]
    fn test_parse_key_with_modifier() {
        let parser = EventParser::new();
        let event = parser.parse_one("key:alt+3").unwrap();
        assert_eq!(
            event,
            Event::Key(KeyEvent::new(KeyCode::Char('3'), KeyModifiers::ALT))
        );
    }

    #[test]
    fn test_parse_type_keeps_text() {
        let parser = EventParser::new();
        let event = parser.parse_one("type:USE shop;").unwrap();
        assert_eq!(event, Event::Type("USE shop;".to_string()));
    }

    #[test]
    fn test_type_line_keeps_commas() {
        let parser = EventParser::new();
        let events = parser
            .parse_all("type:INSERT INTO t VALUES (1, 2);,key:f5")
            .unwrap();
        assert_eq!(
            events[0],
            Event::Type("INSERT INTO t VALUES (1, 2);".to_string())
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_wait_units() {
        let parser = EventParser::new();
        assert_eq!(
            parser.parse_one("wait:100ms").unwrap(),
            Event::Wait(Duration::from_millis(100))
        );
        assert_eq!(
            parser.parse_one("wait:2s").unwrap(),
            Event::Wait(Duration::from_secs(2))
        );
        assert_eq!(
            parser.parse_one("wait:250").unwrap(),
            Event::Wait(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_parse_resize() {
        let parser = EventParser::new();
        assert_eq!(
            parser.parse_one("resize:120x40").unwrap(),
            Event::Resize(120, 40)
        );
    }

    #[test]
    fn test_parse_comma_separated_with_comments() {
        let parser = EventParser::new();
        let script = "# startup\nwait:100,key:f5\n\nassert:contains:Result\n";
        let events = parser.parse_all(script).unwrap();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_parse_assert_state_compare() {
        let parser = EventParser::new();
        let event = parser.parse_one("assert:state:database_count>=3").unwrap();
        assert_eq!(
            event,
            Event::Assert(Assertion::StateCompare {
                field: "database_count".to_string(),
                op: ">=".to_string(),
                value: "3".to_string(),
            })
        );
    }

    #[test]
    fn test_display_round_trips_key() {
        let parser = EventParser::new();
        let event = parser.parse_one("key:ctrl+e").unwrap();
        assert_eq!(event.to_string(), "key:ctrl+e");
    }

    #[test]
    fn test_invalid_events() {
        let parser = EventParser::new();
        assert!(parser.parse_one("invalid:event").is_err());
        assert!(parser.parse_one("no_colon").is_err());
        assert!(parser.parse_one("key:ctl+x").is_err());
        assert!(parser.parse_one("wait:soon").is_err());
    }

    #[test]
    fn test_compare_values() {
        assert!(compare_values(Some("3"), ">=", "3"));
        assert!(!compare_values(Some("2"), ">", "3"));
        assert!(compare_values(Some("Editor"), "==", "Editor"));
        assert!(!compare_values(None, "=", "x"));
    }
}
