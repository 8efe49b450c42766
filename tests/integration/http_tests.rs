//! Integration tests for the HTTP ingress surface.
//!
//! Requests go through `http::handle` exactly as the ESP server handler
//! calls it; the control loop then picks up whatever was queued.

use std::sync::Arc;

use super::mock_hw::{ManualClock, MockHardware, RecordingSink};

use vmc::adapters::http::{self, Route};
use vmc::app::commands::ModeCommand;
use vmc::app::service::AppService;
use vmc::app::shared::SharedController;
use vmc::config::DeploymentProfile;
use vmc::fsm::OutputLine;

fn controller() -> (AppService, Arc<SharedController>) {
    let config = DeploymentProfile::ActiveHighBoard.config();
    let ctl = Arc::new(SharedController::new(config.mode_policy()));
    (AppService::new(&config, Arc::clone(&ctl)), ctl)
}

#[test]
fn command_request_answers_immediately_and_runs_on_next_tick() {
    let (mut app, ctl) = controller();
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    let reply = http::handle("/max2", &ctl, 0);
    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
    assert!(hw.calls.is_empty(), "handler must not pulse");
    assert_eq!(http::handle("/mode", &ctl, 0).body, "Unknown");

    app.tick(&mut hw, &*clock, &mut sink);
    assert_eq!(hw.pulses(), [OutputLine::Max, OutputLine::Max]);
    assert_eq!(http::handle("/mode", &ctl, 0).body, "Max 30 min");
}

#[test]
fn every_command_path_routes_to_its_command() {
    for cmd in ModeCommand::ALL {
        let path = format!("/{}", cmd.token());
        assert_eq!(http::route(&path), Route::Command(cmd));
    }
}

#[test]
fn mode_reports_label_as_plain_text() {
    let (mut app, ctl) = controller();
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    http::handle("/auto", &ctl, 0);
    app.tick(&mut hw, &*clock, &mut sink);

    let reply = http::handle("/mode", &ctl, 0);
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, Some("text/plain"));
    assert_eq!(reply.body, "Automatique");
}

#[test]
fn status_is_json_with_boost_countdown() {
    let (mut app, ctl) = controller();
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    http::handle("/low", &ctl, 0);
    app.tick(&mut hw, &*clock, &mut sink);
    http::handle("/max1", &ctl, 0);
    app.tick(&mut hw, &*clock, &mut sink);

    let reply = http::handle("/status", &ctl, 60);
    assert_eq!(reply.content_type, Some("application/json"));
    let json: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(json["mode"], "Max 15 min");
    assert_eq!(json["persistent"], "Low");
    assert_eq!(json["boost_remaining_secs"], 15 * 60 - 60);
    assert_eq!(json["command_pending"], false);
}

#[test]
fn unknown_paths_are_404_and_leave_state_alone() {
    let (_app, ctl) = controller();
    let before = ctl.state();

    for path in ["/max4", "/MAX1", "/max1/extra", "//max1", "/ low", "/favicon.ico"] {
        let reply = http::handle(path, &ctl, 0);
        assert_eq!(reply.status, 404, "path {path:?}");
    }
    assert!(!ctl.has_pending());
    assert_eq!(ctl.state(), before);
}

#[test]
fn query_string_is_ignored() {
    assert_eq!(http::route("/mode?t=123"), Route::Mode);
    assert_eq!(http::route("/max3?x"), Route::Command(ModeCommand::Max3));
}

#[test]
fn static_assets_carry_their_content_types() {
    let (_app, ctl) = controller();

    let index = http::handle("/", &ctl, 0);
    assert_eq!(index.content_type, Some("text/html"));
    assert!(index.body.contains("script.js"));

    let js = http::handle("/script.js", &ctl, 0);
    assert_eq!(js.content_type, Some("text/javascript"));
    assert!(js.body.contains("/mode"));

    let css = http::handle("/style.css", &ctl, 0);
    assert_eq!(css.content_type, Some("text/css"));
}

#[test]
fn later_request_replaces_unprocessed_one() {
    let (mut app, ctl) = controller();
    let clock = ManualClock::at(0);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    http::handle("/high", &ctl, 0);
    http::handle("/default", &ctl, 0);
    app.tick(&mut hw, &*clock, &mut sink);

    assert_eq!(hw.pulses(), [OutputLine::Default]);
    assert_eq!(http::handle("/mode", &ctl, 0).body, "Default");
}
