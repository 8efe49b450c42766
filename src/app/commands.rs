//! Inbound mode commands.
//!
//! These are the tokens the outside world (HTTP handlers, the startup
//! sequence) can hand to the controller.  Parsing is strict: only the eight
//! known tokens are accepted, optionally prefixed with `/` so request paths
//! can be passed straight through.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fsm::{Actuation, Mode};

/// A request to switch the ventilation unit to a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeCommand {
    Default,
    Auto,
    Low,
    Medium,
    High,
    /// 15-minute boost.
    Max1,
    /// 30-minute boost.
    Max2,
    /// 60-minute boost.
    Max3,
}

impl ModeCommand {
    pub const ALL: [ModeCommand; 8] = [
        ModeCommand::Default,
        ModeCommand::Auto,
        ModeCommand::Low,
        ModeCommand::Medium,
        ModeCommand::High,
        ModeCommand::Max1,
        ModeCommand::Max2,
        ModeCommand::Max3,
    ];

    /// Wire token for this command.
    pub const fn token(self) -> &'static str {
        match self {
            ModeCommand::Default => "default",
            ModeCommand::Auto => "auto",
            ModeCommand::Low => "low",
            ModeCommand::Medium => "medium",
            ModeCommand::High => "high",
            ModeCommand::Max1 => "max1",
            ModeCommand::Max2 => "max2",
            ModeCommand::Max3 => "max3",
        }
    }

    /// Mode this command selects.
    pub const fn target(self) -> Mode {
        match self {
            ModeCommand::Default => Mode::Default,
            ModeCommand::Auto => Mode::Auto,
            ModeCommand::Low => Mode::Low,
            ModeCommand::Medium => Mode::Medium,
            ModeCommand::High => Mode::High,
            ModeCommand::Max1 => Mode::Max15,
            ModeCommand::Max2 => Mode::Max30,
            ModeCommand::Max3 => Mode::Max60,
        }
    }

    /// Pulse train that selects this command's mode.
    pub const fn actuation(self) -> Option<Actuation> {
        Actuation::for_mode(self.target())
    }

    /// Parse a token, with or without a single leading `/`.
    pub fn parse(token: &str) -> Result<Self, UnknownCommand> {
        let token = token.strip_prefix('/').unwrap_or(token);
        Self::ALL
            .into_iter()
            .find(|c| c.token() == token)
            .ok_or(UnknownCommand)
    }
}

impl FromStr for ModeCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The token is not one of the eight known commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand;

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised command token")
    }
}
