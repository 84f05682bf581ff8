use std::io::{self, Write};

#[path = "../script.rs"]
mod script;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use brake_core::BrakeCalibration;
use session::{Session, SessionResponse};

const SCENARIOS: &[(&str, &[&str])] = &[
    (
        "front wheel slower",
        &["pulse front 500", "pulse rear 400", "lever 28", "status"],
    ),
    (
        "wheels matched",
        &["pulse front 300", "pulse rear 300", "lever 0", "status"],
    ),
    (
        "front wheel stationary",
        &["pulse rear 250", "tick 1000", "pulse rear 250", "lever 48", "status"],
    ),
];

fn main() -> io::Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    for (name, lines) in SCENARIOS {
        writeln!(writer, "== {name}")?;
        let mut session = Session::new(BrakeCalibration::DEFAULT, false);
        for line in *lines {
            writeln!(writer, "> {line}")?;
            match session.handle_line(line) {
                Ok(SessionResponse::Lines(responses)) => {
                    for response in responses {
                        writeln!(writer, "{response}")?;
                    }
                }
                Ok(SessionResponse::Exit) => break,
                Err(err) => writeln!(writer, "ERR {err}")?,
            }
        }
        writeln!(writer)?;
    }

    Ok(())
}
