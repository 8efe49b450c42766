//! Ventilation modes and the relay lines that select them.
//!
//! ```text
//! ┌──────────┬─────────────┬───────────┬──────────┬────────┐
//! │ Mode     │ Label       │ Line      │ Duration │ Pulses │
//! ├──────────┼─────────────┼───────────┼──────────┼────────┤
//! │ Default  │ Default     │ Default   │    —     │   1    │
//! │ Auto     │ Automatique │ Auto      │    —     │   1    │
//! │ Low      │ Low         │ Low       │    —     │   1    │
//! │ Medium   │ Medium      │ Medium    │    —     │   1    │
//! │ High     │ High        │ High      │    —     │   1    │
//! │ Max15    │ Max 15 min  │ Max       │  15 min  │   1    │
//! │ Max30    │ Max 30 min  │ Max       │  30 min  │   2    │
//! │ Max60    │ Max 60 min  │ Max       │  60 min  │   3    │
//! │ Unknown  │ Unknown     │    —      │    —     │   —    │
//! └──────────┴─────────────┴───────────┴──────────┴────────┘
//! ```
//!
//! The three Max modes share one relay line; the downstream controller
//! tells them apart by the number of pulses it receives.

use core::fmt;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Every mode the unit can be in, plus the pre-command `Unknown` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Unknown = 0,
    Default = 1,
    Auto = 2,
    Low = 3,
    Medium = 4,
    High = 5,
    Max15 = 6,
    Max30 = 7,
    Max60 = 8,
}

impl Mode {
    /// All persistent modes, in relay order.
    pub const PERSISTENT: [Mode; 5] = [
        Mode::Default,
        Mode::Auto,
        Mode::Low,
        Mode::Medium,
        Mode::High,
    ];

    /// All temporary (boost) modes, shortest first.
    pub const TEMPORARY: [Mode; 3] = [Mode::Max15, Mode::Max30, Mode::Max60];

    /// Display label served by the mode query.
    pub const fn label(self) -> &'static str {
        match self {
            Mode::Unknown => "Unknown",
            Mode::Default => "Default",
            Mode::Auto => "Automatique",
            Mode::Low => "Low",
            Mode::Medium => "Medium",
            Mode::High => "High",
            Mode::Max15 => "Max 15 min",
            Mode::Max30 => "Max 30 min",
            Mode::Max60 => "Max 60 min",
        }
    }

    /// Whether this mode is a self-expiring boost.
    pub const fn is_temporary(self) -> bool {
        matches!(self, Mode::Max15 | Mode::Max30 | Mode::Max60)
    }

    /// Boost duration in minutes; `None` for persistent modes.
    pub const fn boost_minutes(self) -> Option<u16> {
        match self {
            Mode::Max15 => Some(15),
            Mode::Max30 => Some(30),
            Mode::Max60 => Some(60),
            _ => None,
        }
    }

    /// Boost duration in seconds; `None` for persistent modes.
    pub const fn boost_secs(self) -> Option<u64> {
        match self.boost_minutes() {
            Some(minutes) => Some(minutes as u64 * 60),
            None => None,
        }
    }

    /// Number of pulses sent on the mode's line to select it.
    pub const fn pulse_count(self) -> u8 {
        match self {
            Mode::Unknown => 0,
            Mode::Max30 => 2,
            Mode::Max60 => 3,
            _ => 1,
        }
    }

    /// Relay line that selects this mode.  `Unknown` has none.
    pub const fn line(self) -> Option<OutputLine> {
        match self {
            Mode::Unknown => None,
            Mode::Default => Some(OutputLine::Default),
            Mode::Auto => Some(OutputLine::Auto),
            Mode::Low => Some(OutputLine::Low),
            Mode::Medium => Some(OutputLine::Medium),
            Mode::High => Some(OutputLine::High),
            Mode::Max15 | Mode::Max30 | Mode::Max60 => Some(OutputLine::Max),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Output lines
// ---------------------------------------------------------------------------

/// One physical relay input on the ventilation unit's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutputLine {
    Default = 0,
    Auto = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Max = 5,
}

impl OutputLine {
    /// Total number of lines, used to size relay banks.
    pub const COUNT: usize = 6;

    /// Every line, indexed by `OutputLine as usize`.
    pub const ALL: [OutputLine; Self::COUNT] = [
        OutputLine::Default,
        OutputLine::Auto,
        OutputLine::Low,
        OutputLine::Medium,
        OutputLine::High,
        OutputLine::Max,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            OutputLine::Default => "default",
            OutputLine::Auto => "auto",
            OutputLine::Low => "low",
            OutputLine::Medium => "medium",
            OutputLine::High => "high",
            OutputLine::Max => "max",
        }
    }
}

// ---------------------------------------------------------------------------
// Actuation plan
// ---------------------------------------------------------------------------

/// A pulse train to run on one line: `pulses` pulses separated by the
/// configured inter-pulse gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actuation {
    pub line: OutputLine,
    pub pulses: u8,
}

impl Actuation {
    /// The pulse train that selects `mode`, or `None` for `Unknown`.
    pub const fn for_mode(mode: Mode) -> Option<Self> {
        match mode.line() {
            Some(line) => Some(Self {
                line,
                pulses: mode.pulse_count(),
            }),
            None => None,
        }
    }
}
