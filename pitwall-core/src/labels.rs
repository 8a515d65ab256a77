//! Sample state classification
//!
//! Raw telemetry encodes car state as integer codes. The run detector and
//! the aggregators work on enumerated labels instead, so the state machine
//! stays decoupled from the wire encodings. Classification is pure and
//! total: every raw value maps to a label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fixed time-ordered segments of a lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    Sector1,
    Sector2,
    Sector3,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::Sector1, Sector::Sector2, Sector::Sector3];
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Sector1 => write!(f, "SECTOR 1"),
            Sector::Sector2 => write!(f, "SECTOR 2"),
            Sector::Sector3 => write!(f, "SECTOR 3"),
        }
    }
}

/// Drag Reduction System state derived from the raw status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrsState {
    Active,
    Inactive,
}

impl DrsState {
    /// The raw codes 8, 10, 12 and 14 all mean the flap is open.
    pub fn from_code(code: i32) -> Self {
        match code {
            8 | 10 | 12 | 14 => DrsState::Active,
            _ => DrsState::Inactive,
        }
    }
}

impl fmt::Display for DrsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrsState::Active => write!(f, "ACTIVE"),
            DrsState::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Brake pedal state; the feed reports 100 (pressed) or 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrakeState {
    Braking,
    Normal,
}

impl BrakeState {
    pub fn from_raw(value: i32) -> Self {
        if value == 100 {
            BrakeState::Braking
        } else {
            BrakeState::Normal
        }
    }
}

impl fmt::Display for BrakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrakeState::Braking => write!(f, "BRAKING"),
            BrakeState::Normal => write!(f, "NORMAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drs_active_codes() {
        for code in [8, 10, 12, 14] {
            assert_eq!(DrsState::from_code(code), DrsState::Active, "code {code}");
        }
    }

    #[test]
    fn test_drs_inactive_codes() {
        for code in [0, 1, 2, 3, 9, 11, 13, 15, -1, 64] {
            assert_eq!(DrsState::from_code(code), DrsState::Inactive, "code {code}");
        }
    }

    #[test]
    fn test_brake_state() {
        assert_eq!(BrakeState::from_raw(100), BrakeState::Braking);
        assert_eq!(BrakeState::from_raw(0), BrakeState::Normal);
        // Anything that isn't the full-pressure marker counts as normal
        assert_eq!(BrakeState::from_raw(50), BrakeState::Normal);
    }

    #[test]
    fn test_sector_display() {
        assert_eq!(Sector::Sector1.to_string(), "SECTOR 1");
        assert_eq!(Sector::Sector3.to_string(), "SECTOR 3");
    }
}
