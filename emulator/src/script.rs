//! Line grammar for emulator scripts.
//!
//! ```text
//! tick [count]
//! edge <front|rear> <rise|fall>
//! pulse <front|rear> <ticks>
//! lever <0-255>
//! status | reset | help [topic] | exit
//! ```
//!
//! Keywords are case-insensitive; `#` starts a comment.

use std::fmt;

use brake_core::lever::LeverSample;
use brake_core::wheel::{Edge, Wheel};
use winnow::ModalResult;
use winnow::ascii::{digit1, space1};
use winnow::combinator::{alt, opt, preceded, seq};
use winnow::prelude::*;
use winnow::token::rest;

/// One parsed script line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScriptCommand {
    Tick(u32),
    Edge(Wheel, Edge),
    Pulse(Wheel, u32),
    Lever(LeverSample),
    Status,
    Reset,
    Help(Option<String>),
    Exit,
}

/// Script line that could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScriptError {
    Syntax { input: String, offset: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Syntax { input, offset } => {
                write!(f, "cannot parse `{input}` at column {}", offset + 1)
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parses a script line. Blank and comment-only lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let body = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if body.is_empty() {
        return Ok(None);
    }

    let normalized = body.to_ascii_lowercase();
    command
        .parse(normalized.as_str())
        .map(Some)
        .map_err(|err| ScriptError::Syntax {
            offset: err.offset(),
            input: normalized.clone(),
        })
}

fn command(input: &mut &str) -> ModalResult<ScriptCommand> {
    alt((
        preceded("tick", opt(preceded(space1, count)))
            .map(|n| ScriptCommand::Tick(n.unwrap_or(1))),
        seq!(_: "edge", _: space1, wheel, _: space1, edge)
            .map(|(wheel, edge)| ScriptCommand::Edge(wheel, edge)),
        seq!(_: "pulse", _: space1, wheel, _: space1, count)
            .map(|(wheel, ticks)| ScriptCommand::Pulse(wheel, ticks)),
        preceded(("lever", space1), sample).map(ScriptCommand::Lever),
        "status".value(ScriptCommand::Status),
        "reset".value(ScriptCommand::Reset),
        preceded("help", opt(preceded(space1, rest)))
            .map(|topic: Option<&str>| ScriptCommand::Help(topic.map(|t| t.trim().to_string()))),
        alt(("exit", "quit")).value(ScriptCommand::Exit),
    ))
    .parse_next(input)
}

fn wheel(input: &mut &str) -> ModalResult<Wheel> {
    alt(("front".value(Wheel::Front), "rear".value(Wheel::Rear))).parse_next(input)
}

fn edge(input: &mut &str) -> ModalResult<Edge> {
    alt((
        alt(("rising", "rise")).value(Edge::Rising),
        alt(("falling", "fall")).value(Edge::Falling),
    ))
    .parse_next(input)
}

fn count(input: &mut &str) -> ModalResult<u32> {
    digit1.try_map(str::parse::<u32>).parse_next(input)
}

fn sample(input: &mut &str) -> ModalResult<LeverSample> {
    digit1
        .try_map(str::parse::<u8>)
        .map(LeverSample)
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let cases = [
            ("tick", ScriptCommand::Tick(1)),
            ("tick 250", ScriptCommand::Tick(250)),
            ("edge front rise", ScriptCommand::Edge(Wheel::Front, Edge::Rising)),
            ("EDGE Rear Fall", ScriptCommand::Edge(Wheel::Rear, Edge::Falling)),
            ("pulse rear 400", ScriptCommand::Pulse(Wheel::Rear, 400)),
            ("lever 28", ScriptCommand::Lever(LeverSample(28))),
            ("status", ScriptCommand::Status),
            ("reset", ScriptCommand::Reset),
            ("help", ScriptCommand::Help(None)),
            ("help pulse", ScriptCommand::Help(Some("pulse".to_string()))),
            ("quit", ScriptCommand::Exit),
        ];

        for (line, expected) in cases {
            assert_eq!(parse_line(line), Ok(Some(expected)), "line `{line}`");
        }
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   # front wheel locks"), Ok(None));
        assert_eq!(
            parse_line("pulse front 500 # slow"),
            Ok(Some(ScriptCommand::Pulse(Wheel::Front, 500)))
        );
    }

    #[test]
    fn rejects_out_of_range_lever_sample() {
        assert!(matches!(
            parse_line("lever 256"),
            Err(ScriptError::Syntax { .. })
        ));
    }

    #[test]
    fn rejects_unknown_wheel_and_trailing_input() {
        assert!(parse_line("pulse middle 10").is_err());
        assert!(parse_line("status now").is_err());
        assert!(parse_line("tickle").is_err());
    }
}
