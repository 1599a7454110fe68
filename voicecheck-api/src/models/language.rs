//! Supported request languages
//!
//! The language is validated and echoed back; it does not influence
//! analysis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tamil,
    English,
    Hindi,
    Malayalam,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Tamil,
        Language::English,
        Language::Hindi,
        Language::Malayalam,
        Language::Telugu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tamil => "tamil",
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Malayalam => "malayalam",
            Language::Telugu => "telugu",
        }
    }

    /// Names of every supported language, in display order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Language::as_str).collect()
    }

    /// Resolve an optional request field; absent or empty means English
    pub fn from_request(value: Option<&str>) -> Result<Self, ApiError> {
        match value {
            None => Ok(Language::English),
            Some(v) if v.is_empty() => Ok(Language::English),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Language {
    type Err = ApiError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == lowered)
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Unsupported language. Must be one of: {}",
                    Self::names().join(", ")
                ))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
