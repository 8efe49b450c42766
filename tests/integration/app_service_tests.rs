//! Integration tests for the ingress → pending slot → AppService → actuator
//! pipeline.
//!
//! These run on the host (x86_64) and drive the full control loop against
//! a recording actuator and a hand-set clock.

use std::sync::Arc;

use super::mock_hw::{ActuatorCall, ManualClock, MockHardware, Observer, RecordingSink};

use vmc::app::commands::ModeCommand;
use vmc::app::events::AppEvent;
use vmc::app::service::AppService;
use vmc::app::shared::SharedController;
use vmc::config::{ControllerConfig, DeploymentProfile};
use vmc::fsm::{IgnoreReason, Mode, OutputLine};

fn make_app(
    profile: DeploymentProfile,
) -> (AppService, Arc<SharedController>, MockHardware, RecordingSink) {
    let config: ControllerConfig = profile.config();
    let controller = Arc::new(SharedController::new(config.mode_policy()));
    let app = AppService::new(&config, Arc::clone(&controller));
    (app, controller, MockHardware::new(), RecordingSink::new())
}

// ── Persistent modes ─────────────────────────────────────────

#[test]
fn each_persistent_command_pulses_its_own_line_once() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    for (token, line, label) in [
        ("default", OutputLine::Default, "Default"),
        ("auto", OutputLine::Auto, "Automatique"),
        ("low", OutputLine::Low, "Low"),
        ("medium", OutputLine::Medium, "Medium"),
        ("high", OutputLine::High, "High"),
    ] {
        hw.clear();
        ctl.submit(token).unwrap();
        app.tick(&mut hw, &*clock, &mut sink);
        assert_eq!(
            hw.calls,
            [
                ActuatorCall::Busy(true),
                ActuatorCall::Pulse(line),
                ActuatorCall::Busy(false)
            ]
        );
        assert_eq!(ctl.query_mode(clock.now()), label);
    }
}

#[test]
fn repeating_a_persistent_command_pulses_again() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("low").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    let after_first = ctl.state();
    ctl.submit("low").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Low, OutputLine::Low]);
    assert_eq!(ctl.state(), after_first);
}

#[test]
fn mode_round_trip_restores_state() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("auto").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    let first = ctl.state();

    ctl.submit("high").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("auto").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(ctl.state(), first);
}

// ── Boosts ───────────────────────────────────────────────────

#[test]
fn max3_pulses_three_times_with_gaps() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("max3").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(
        hw.calls,
        [
            ActuatorCall::Busy(true),
            ActuatorCall::Pulse(OutputLine::Max),
            ActuatorCall::Pause,
            ActuatorCall::Pulse(OutputLine::Max),
            ActuatorCall::Pause,
            ActuatorCall::Pulse(OutputLine::Max),
            ActuatorCall::Busy(false),
        ]
    );
    assert_eq!(
        sink.last(),
        Some(&AppEvent::BoostStarted {
            mode: Mode::Max60,
            expires_at: 3600
        })
    );
}

#[test]
fn max2_holds_for_thirty_minutes_then_reverts_without_pulse() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(100);

    ctl.submit("medium").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("max2").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    hw.clear();

    clock.set(100 + 30 * 60 - 1);
    app.tick(&mut hw, &*clock, &mut sink);
    assert_eq!(ctl.query_mode(clock.now()), "Max 30 min");

    clock.set(100 + 30 * 60);
    app.tick(&mut hw, &*clock, &mut sink);
    assert_eq!(ctl.query_mode(clock.now()), "Medium");
    assert!(ctl.state().boost().is_none());
    assert!(hw.calls.is_empty(), "reverting must not pulse");
    assert_eq!(
        sink.last(),
        Some(&AppEvent::BoostExpired {
            from: Mode::Max30,
            reverted_to: Mode::Medium
        })
    );
}

#[test]
fn later_boost_replaces_earlier_without_merging() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("max1").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    clock.advance(10);
    ctl.submit("max3").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    let s = ctl.state();
    assert_eq!(s.temporary_mode(), Some(Mode::Max60));
    assert_eq!(s.temporary_expiry(), Some(10 + 3600));
    assert_eq!(ctl.query_mode(clock.now()), "Max 60 min");
}

#[test]
fn rapid_submissions_keep_only_the_last() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    assert_eq!(ctl.submit("max1"), Ok(None));
    assert_eq!(ctl.submit("max3"), Ok(Some(ModeCommand::Max1)));
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Max; 3]);
    assert_eq!(ctl.state().temporary_mode(), Some(Mode::Max60));
    assert!(app.tick(&mut hw, &*clock, &mut sink).is_none());
}

#[test]
fn persistent_command_cancels_running_boost() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("low").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("max3").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("auto").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert!(ctl.state().boost().is_none());
    assert_eq!(ctl.query_mode(clock.now()), "Automatique");
}

#[test]
fn backwards_clock_drops_boost() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(5_000);

    ctl.submit("high").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("max1").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    clock.set(10);
    assert_eq!(ctl.query_mode(clock.now()), "High");
    app.tick(&mut hw, &*clock, &mut sink);
    assert!(ctl.state().boost().is_none());
}

// ── High guard ───────────────────────────────────────────────

#[test]
fn guard_ignores_boost_while_high() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveLowBoard);
    let clock = ManualClock::at(0);

    ctl.submit("high").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    hw.clear();

    ctl.submit("max1").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(
        hw.calls,
        [ActuatorCall::Busy(true), ActuatorCall::Busy(false)],
        "ignored command flashes busy but never pulses"
    );
    assert_eq!(ctl.query_mode(clock.now()), "High");
    assert_eq!(
        sink.last(),
        Some(&AppEvent::CommandIgnored {
            command: ModeCommand::Max1,
            reason: IgnoreReason::BoostWhileHigh
        })
    );
}

#[test]
fn guard_does_not_apply_when_disabled() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    ctl.submit("high").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("max1").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(ctl.query_mode(clock.now()), "Max 15 min");
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn cold_state_is_unknown_until_first_command() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    app.start(&*clock, &mut sink);
    assert_eq!(ctl.query_mode(0), "Unknown");
    app.tick(&mut hw, &*clock, &mut sink);
    assert!(hw.calls.is_empty());
    assert_eq!(sink.events, [AppEvent::Started { mode: Mode::Unknown }]);
}

#[test]
fn default_profile_selects_medium_on_first_tick() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveLowBoard);
    let clock = ManualClock::at(0);

    app.start(&*clock, &mut sink);
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Medium]);
    assert_eq!(ctl.query_mode(0), "Medium");
}

#[test]
fn ingress_before_start_beats_startup_command() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveLowBoard);
    let clock = ManualClock::at(0);

    ctl.submit("low").unwrap();
    app.start(&*clock, &mut sink);
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Low]);
}

// ── Concurrency with the pulse train ─────────────────────────

#[test]
fn query_during_pulse_train_reports_new_boost() {
    let (mut app, ctl, _, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::observed(Observer {
        controller: Arc::clone(&ctl),
        clock: Arc::clone(&clock),
        submit_on_first_pulse: None,
        secs_per_pulse: 1,
    });

    ctl.submit("low").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);
    ctl.submit("max3").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(
        hw.labels_during_pulses,
        ["Low", "Max 60 min", "Max 60 min", "Max 60 min"]
    );
}

#[test]
fn command_submitted_during_pulse_waits_for_next_tick() {
    let (mut app, ctl, _, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::observed(Observer {
        controller: Arc::clone(&ctl),
        clock: Arc::clone(&clock),
        submit_on_first_pulse: Some("auto"),
        secs_per_pulse: 0,
    });

    ctl.submit("max2").unwrap();
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Max, OutputLine::Max]);
    assert!(ctl.has_pending());
    assert_eq!(ctl.query_mode(clock.now()), "Max 30 min");

    app.tick(&mut hw, &*clock, &mut sink);
    assert_eq!(hw.pulses().last(), Some(&OutputLine::Auto));
    assert_eq!(ctl.query_mode(clock.now()), "Automatique");
}

#[test]
fn ingress_threads_and_control_loop_agree_on_last_write() {
    let (mut app, ctl, mut hw, mut sink) = make_app(DeploymentProfile::ActiveHighBoard);
    let clock = ManualClock::at(0);

    std::thread::scope(|s| {
        let submitter = {
            let ctl = Arc::clone(&ctl);
            s.spawn(move || {
                for cmd in ModeCommand::ALL.iter().cycle().take(400) {
                    ctl.submit_command(*cmd);
                }
                ctl.submit_command(ModeCommand::Low);
            })
        };
        let reader = {
            let ctl = Arc::clone(&ctl);
            s.spawn(move || {
                for _ in 0..400 {
                    let _ = ctl.status(0);
                }
            })
        };
        while !submitter.is_finished() {
            app.tick(&mut hw, &*clock, &mut sink);
        }
        submitter.join().unwrap();
        reader.join().unwrap();
    });

    app.tick(&mut hw, &*clock, &mut sink);
    assert!(!ctl.has_pending());
    assert_eq!(ctl.state().current_mode(), Mode::Low);
}
