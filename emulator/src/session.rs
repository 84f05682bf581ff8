use brake_core::BrakeCalibration;
use brake_core::actuator::ActuatorSink;
use brake_core::control::{CommandUpdate, ControlEvent, ControlLoop, DispatchOutcome};
use brake_core::duty::{BrakeIntensity, DutyCommand};
use brake_core::lever::{LeverSample, LeverSampler};
use brake_core::slip::SlipDecision;
use brake_core::wheel::{EdgeOutcome, EdgeOutcomeKind, Wheel};
use crossterm::style::Stylize;

use crate::script::{ScriptCommand, ScriptError, parse_line};

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("tick", "tick [count]                 - advance the time base"),
    (
        "edge",
        "edge <front|rear> <rise|fall> - deliver one sensor transition",
    ),
    (
        "pulse",
        "pulse <front|rear> <ticks>    - rising edge, <ticks> ticks, falling edge",
    ),
    (
        "lever",
        "lever <0-255>                 - deliver a lever sample and map duties",
    ),
    ("status", "status                        - show control state"),
    ("reset", "reset                         - restart from power-on state"),
    ("help", "help [topic]                  - show help for a command"),
];

/// What the caller should do after a line was handled.
#[derive(Debug, Eq, PartialEq)]
pub enum SessionResponse {
    Lines(Vec<String>),
    Exit,
}

/// Actuator sink that remembers what the hardware would be holding.
#[derive(Debug, Default)]
pub struct BenchSink {
    held: [Option<DutyCommand>; 2],
    writes: usize,
}

impl BenchSink {
    pub fn held(&self, wheel: Wheel) -> Option<DutyCommand> {
        self.held[wheel.as_index()]
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ActuatorSink for BenchSink {
    fn set_duty(&mut self, wheel: Wheel, duty: DutyCommand) {
        self.held[wheel.as_index()] = Some(duty);
        self.writes += 1;
    }
}

/// Host-side control loop driven one script line at a time.
pub struct Session {
    calibration: BrakeCalibration,
    control: ControlLoop<BenchSink>,
    sampler: LeverSampler,
    styled: bool,
}

impl Session {
    pub fn new(calibration: BrakeCalibration, styled: bool) -> Self {
        Self {
            calibration,
            control: ControlLoop::new(calibration, BenchSink::default()),
            sampler: LeverSampler::new(&calibration),
            styled,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn control(&self) -> &ControlLoop<BenchSink> {
        &self.control
    }

    pub fn handle_line(&mut self, line: &str) -> Result<SessionResponse, ScriptError> {
        let Some(command) = parse_line(line)? else {
            return Ok(SessionResponse::Lines(Vec::new()));
        };

        let lines = match command {
            ScriptCommand::Exit => return Ok(SessionResponse::Exit),
            ScriptCommand::Tick(count) => {
                self.control.advance(count);
                vec![self.describe_ticks()]
            }
            ScriptCommand::Edge(wheel, edge) => {
                describe_edge_dispatch(self.control.dispatch(ControlEvent::Edge(wheel, edge)))
            }
            ScriptCommand::Pulse(wheel, ticks) => {
                describe_edge_dispatch(self.control.pulse(wheel, ticks))
            }
            ScriptCommand::Lever(sample) => {
                match self.control.dispatch(ControlEvent::LeverSample(sample)) {
                    DispatchOutcome::Commands(update) => self.describe_update(sample, &update),
                    other => vec![format!("{other:?}")],
                }
            }
            ScriptCommand::Status => self.describe_status(),
            ScriptCommand::Reset => {
                self.control = ControlLoop::new(self.calibration, BenchSink::default());
                vec!["OK reset".to_string()]
            }
            ScriptCommand::Help(topic) => describe_help(topic.as_deref()),
        };

        Ok(SessionResponse::Lines(lines))
    }

    fn describe_ticks(&self) -> String {
        let state = self.control.state();
        format!(
            "ticks front={} rear={}",
            state.ticks(Wheel::Front),
            state.ticks(Wheel::Rear)
        )
    }

    fn describe_update(&self, sample: LeverSample, update: &CommandUpdate) -> Vec<String> {
        let intensity = BrakeIntensity::from_request(
            self.sampler.intensity_request(sample),
            self.calibration.max_intensity,
        );
        let mut lines = vec![format!(
            "lever={} intensity={} decision={} front={} rear={}",
            sample.0,
            intensity.value(),
            self.decision_label(update.decision),
            update.commands.front.raw(),
            update.commands.rear.raw(),
        )];
        if update.decision_changed() {
            lines.push(format!(
                "slip {} -> {}",
                update.previous_decision.label(),
                update.decision.label()
            ));
        }
        lines
    }

    fn describe_status(&self) -> Vec<String> {
        let snapshot = self.control.state().snapshot();
        let mut lines = vec![format!("decision={}", self.decision_label(snapshot.decision))];
        for wheel in Wheel::ALL {
            let period = snapshot
                .period(wheel)
                .map_or_else(|| "-".to_string(), |ticks| ticks.to_string());
            let held = self
                .control
                .sink()
                .held(wheel)
                .map_or_else(|| "-".to_string(), |duty| duty.raw().to_string());
            lines.push(format!(
                "{:<5} ticks={} period={} phase={:?} command={} held={}",
                wheel.label(),
                snapshot.ticks(wheel),
                period,
                self.control.estimator(wheel).phase(),
                snapshot.commands.get(wheel).raw(),
                held,
            ));
        }
        lines.push(format!("actuator writes={}", self.control.sink().writes()));
        lines
    }

    fn decision_label(&self, decision: SlipDecision) -> String {
        let label = decision.label();
        if !self.styled {
            return label.to_string();
        }
        match decision {
            SlipDecision::Balanced => label.green().to_string(),
            SlipDecision::FrontSlower | SlipDecision::RearSlower => {
                label.yellow().bold().to_string()
            }
        }
    }
}

fn describe_edge_dispatch(outcome: DispatchOutcome) -> Vec<String> {
    match outcome {
        DispatchOutcome::Edge(edge) => vec![describe_edge(&edge)],
        other => vec![format!("{other:?}")],
    }
}

fn describe_edge(outcome: &EdgeOutcome) -> String {
    let mut line = match outcome.kind {
        EdgeOutcomeKind::Captured(ticks) => {
            format!("{} rising captured={ticks}", outcome.wheel.label())
        }
        EdgeOutcomeKind::Measured(period) => {
            format!("{} falling period={period}", outcome.wheel.label())
        }
    };
    if !outcome.in_order {
        line.push_str(" (out of order)");
    }
    line
}

fn describe_help(topic: Option<&str>) -> Vec<String> {
    match topic {
        Some(target) if !target.is_empty() => HELP_TOPICS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(target))
            .map_or_else(
                || vec![format!("No help available for `{target}`.")],
                |(_, detail)| vec![(*detail).to_string()],
            ),
        _ => {
            let mut lines = vec!["Available commands:".to_string()];
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> Vec<String> {
        match session.handle_line(line).expect("line should parse") {
            SessionResponse::Lines(lines) => lines,
            SessionResponse::Exit => panic!("unexpected exit"),
        }
    }

    fn session() -> Session {
        Session::new(BrakeCalibration::DEFAULT, false)
    }

    #[test]
    fn front_slower_scenario_reports_released_front() {
        let mut session = session();
        assert_eq!(run(&mut session, "pulse front 500"), vec!["front falling period=500"]);
        assert_eq!(run(&mut session, "pulse rear 400"), vec!["rear falling period=400"]);

        let lines = run(&mut session, "lever 28");
        assert_eq!(
            lines,
            vec![
                "lever=28 intensity=100 decision=front-slower front=1000 rear=2600".to_string(),
                "slip balanced -> front-slower".to_string(),
            ]
        );
        assert_eq!(session.control().sink().held(Wheel::Front), Some(DutyCommand::new(1_000)));
    }

    #[test]
    fn out_of_order_edges_are_flagged() {
        let mut session = session();
        run(&mut session, "edge rear rise");
        let lines = run(&mut session, "edge rear rise");
        assert_eq!(lines, vec!["rear rising captured=0 (out of order)"]);
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut session = session();
        run(&mut session, "tick 25");
        run(&mut session, "lever 0");
        run(&mut session, "reset");

        let snapshot = session.control().state().snapshot();
        assert_eq!(snapshot.ticks, [0, 0]);
        assert_eq!(snapshot.commands.front.raw(), 1_000);
    }

    #[test]
    fn exit_and_blank_lines() {
        let mut session = session();
        assert_eq!(session.handle_line("exit"), Ok(SessionResponse::Exit));
        assert_eq!(
            session.handle_line("  "),
            Ok(SessionResponse::Lines(Vec::new()))
        );
    }

    #[test]
    fn status_lists_both_wheels() {
        let mut session = session();
        run(&mut session, "pulse front 120");
        let lines = run(&mut session, "status");
        assert_eq!(lines[0], "decision=balanced");
        assert!(lines[1].starts_with("front ticks=0 period=120"));
        assert!(lines[2].starts_with("rear  ticks=120 period=-"));
        assert_eq!(lines[3], "actuator writes=2");
    }

    #[test]
    fn help_for_unknown_topic() {
        let mut session = session();
        assert_eq!(
            run(&mut session, "help brakes"),
            vec!["No help available for `brakes`."]
        );
    }
}
