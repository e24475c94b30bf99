use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;

/// Output format for structured data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text tables
    #[default]
    Text,
    /// JSON - machine-parseable
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => bail!("Invalid format '{}'. Use: text or json", s),
        }
    }
}

impl OutputFormat {
    /// Resolve an optional CLI flag to a concrete format
    #[must_use]
    pub fn resolve(format: Option<Self>) -> Self {
        format.unwrap_or_default()
    }

    /// Serialize data to the requested format
    ///
    /// # Errors
    /// Fails for [`OutputFormat::Text`] — text rendering is caller-owned.
    pub fn serialize<T: Serialize>(self, data: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(data)
                .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e)),
            Self::Text => bail!("Text format should not use serialize()"),
        }
    }
}
