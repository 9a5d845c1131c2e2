//! Display language for reports and explanations.

use crate::error::AllocError;
use std::fmt;
use std::str::FromStr;

/// Language of every human-readable text the crate renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Language {
    #[default]
    Hebrew,
    English,
}

impl Language {
    /// Two-letter language tag.
    pub fn code(self) -> &'static str {
        match self {
            Language::Hebrew => "he",
            Language::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "he" | "hebrew" => Ok(Language::Hebrew),
            "en" | "english" => Ok(Language::English),
            other => Err(AllocError::InvalidConfig(format!("unknown language {other:?}"))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
