//! Fuzz target: command tokens and request paths
//!
//! Feeds arbitrary UTF-8 through the parser, the HTTP router and the
//! controller's ingress, then ticks the state machine.
//!
//! Invariants checked:
//! - No panics under any input
//! - Parser, router and controller agree on which inputs are commands
//! - An unknown token never touches controller state
//!
//! cargo fuzz run fuzz_command_token

#![no_main]

use libfuzzer_sys::fuzz_target;
use vmc::adapters::http::{self, Route};
use vmc::app::commands::ModeCommand;
use vmc::app::shared::SharedController;
use vmc::fsm::ModePolicy;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = core::str::from_utf8(data) else {
        return;
    };

    let parsed = ModeCommand::parse(input);
    let ctl = SharedController::new(ModePolicy {
        ignore_boost_while_high: data.first().is_some_and(|b| b & 1 == 1),
    });
    let before = ctl.state();

    match ctl.submit(input) {
        Ok(_) => assert_eq!(ctl.take_pending(), parsed.ok()),
        Err(_) => {
            assert!(parsed.is_err(), "controller rejected a parsable token");
            assert!(!ctl.has_pending());
        }
    }
    assert_eq!(ctl.state(), before);

    // A leading slash makes it a request path.
    let path = format!("/{}", input.strip_prefix('/').unwrap_or(input));
    let reply = http::handle(&path, &ctl, 0);
    if let Route::Command(cmd) = http::route(&path) {
        assert_eq!(reply.status, 200);
        let applied = ctl.with_machine(|m| m.apply(cmd, 0));
        let _ = applied.actuation();
        let _ = ctl.status(u64::MAX);
    }
});
