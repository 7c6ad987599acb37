//! Supported playback rates

use crate::error::SpeechError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier of the baseline speaking rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum PlaybackRate {
    Half,
    ThreeQuarters,
    Normal,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 3] = [PlaybackRate::Half, PlaybackRate::ThreeQuarters, PlaybackRate::Normal];

    pub fn as_f32(&self) -> f32 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
        }
    }

    /// Map a multiplier onto a supported rate, `None` for anything else
    pub fn from_multiplier(value: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.as_f32() - value).abs() < 1e-6)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::Normal
    }
}

impl TryFrom<f32> for PlaybackRate {
    type Error = SpeechError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::from_multiplier(value).ok_or(SpeechError::UnsupportedRate(value))
    }
}

impl From<PlaybackRate> for f32 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f32()
    }
}

impl FromStr for PlaybackRate {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f32 = s
            .trim()
            .trim_end_matches('x')
            .parse()
            .map_err(|_| SpeechError::Config(format!("Not a playback rate: {}", s)))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f32())
    }
}
