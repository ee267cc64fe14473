//! Game options.
//!
//! Serialized camelCase, matching the rest of the wire surface. The outcome
//! fields (`finished`, `winner`, `winCause`, `winReason`) double as the
//! record of how a loaded game ended.

use serde::{Deserialize, Serialize};

use crate::engine::types::WinReason;
use crate::engine::variant::Variant;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    pub variant: Variant,
    pub time: TimeSettings,
    /// Seed for variants with randomized setup.
    pub seed: u64,
    pub finished: bool,
    /// 0 = black, 1 = white, -1 = drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_cause: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_reason: Option<WinReason>,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            variant: Variant::Standard,
            time: TimeSettings::default(),
            seed: 0,
            finished: false,
            winner: None,
            win_cause: None,
            win_reason: None,
        }
    }
}

/// Clock configuration. The engine never ticks a clock itself; it hands
/// these values to the external clock collaborator around submit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSettings {
    /// Starting time per side in milliseconds, `[black, white]`.
    pub start: [u64; 2],
    pub running_clocks: bool,
    pub running_clock_time: u64,
    pub running_clock_grace_time: u64,
}

impl Default for TimeSettings {
    fn default() -> Self {
        TimeSettings {
            start: [600_000, 600_000],
            running_clocks: false,
            running_clock_time: 0,
            running_clock_grace_time: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let opts = GameOptions::default();
        assert_eq!(opts.variant, Variant::Standard);
        assert!(!opts.finished);
        assert_eq!(opts.winner, None);
        assert_eq!(opts.time.start, [600_000, 600_000]);
    }

    #[test]
    fn options_serde_round_trip() {
        let mut opts = GameOptions::default();
        opts.variant = Variant::NoQueens;
        opts.finished = true;
        opts.winner = Some(1);
        opts.win_reason = Some(WinReason::Checkmate);
        let json = serde_json::to_string(&opts).unwrap();
        let back: GameOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, back);
    }

    #[test]
    fn options_use_camel_case() {
        let opts = GameOptions {
            win_reason: Some(WinReason::Stalemate),
            ..GameOptions::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"winReason\":\"stalemate\""));
        assert!(json.contains("\"runningClocks\""));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let opts: GameOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, GameOptions::default());
        let opts: GameOptions = serde_json::from_str(r#"{"variant":"no-rooks"}"#).unwrap();
        assert_eq!(opts.variant, Variant::NoRooks);
    }
}
