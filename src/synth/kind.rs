//! Notification sound identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SynthError;

/// The closed set of sounds the synthesizer knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKind {
    /// Major triad struck at once, slow decay
    Bell,
    /// Staggered pentatonic run
    Chime,
    /// Short high/low two-tone blip
    Notification,
}

impl SoundKind {
    /// All kinds, in declaration order
    pub const ALL: [SoundKind; 3] = [SoundKind::Bell, SoundKind::Chime, SoundKind::Notification];

    /// Lowercase name used on the command line and in config files
    pub fn name(&self) -> &'static str {
        match self {
            SoundKind::Bell => "bell",
            SoundKind::Chime => "chime",
            SoundKind::Notification => "notification",
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SoundKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SynthError::InvalidSoundKind(s.to_string()))
    }
}
