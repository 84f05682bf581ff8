mod script;
mod session;

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::process;

use brake_core::BrakeCalibration;
use session::{Session, SessionResponse};

struct Options {
    script: Option<String>,
    plain: bool,
}

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: brake-emulator [--script <path>] [--plain]");
        process::exit(2);
    });

    let calibration = BrakeCalibration::DEFAULT;
    if let Err(err) = calibration.validate() {
        eprintln!("invalid calibration: {err}");
        process::exit(1);
    }

    let stdout = io::stdout();
    let styled = !options.plain && stdout.is_terminal();
    let mut writer = stdout.lock();
    let mut session = Session::new(calibration, styled);

    match options.script {
        Some(path) => {
            let reader = BufReader::new(File::open(&path)?);
            replay(&mut session, reader, &mut writer)
        }
        None => interactive(&mut session, &mut writer),
    }
}

fn replay<R, W>(session: &mut Session, reader: R, writer: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match session.handle_line(&line) {
            Ok(SessionResponse::Lines(lines)) => {
                for response in lines {
                    writeln!(writer, "{response}")?;
                }
            }
            Ok(SessionResponse::Exit) => break,
            Err(err) => {
                eprintln!("line {}: {err}", index + 1);
                process::exit(1);
            }
        }
    }
    Ok(())
}

fn interactive<W: Write>(session: &mut Session, writer: &mut W) -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Brake Controller Emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        match session.handle_line(&line) {
            Ok(SessionResponse::Lines(lines)) => {
                for response in lines {
                    writeln!(writer, "{response}")?;
                }
            }
            Ok(SessionResponse::Exit) => {
                writeln!(writer, "Session closed.")?;
                break;
            }
            Err(err) => writeln!(writer, "ERR {err}")?,
        }
    }

    Ok(())
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options {
        script: None,
        plain: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--script=") {
            options.script = Some(value.to_string());
        } else if arg == "--script" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --script".to_string())?;
            options.script = Some(value);
        } else if arg == "--plain" {
            options.plain = true;
        } else {
            return Err(format!("Unknown argument `{arg}`"));
        }
    }
    Ok(options)
}
