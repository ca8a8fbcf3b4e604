use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod manifest;

pub use manifest::{Catalog, CatalogExtra, Manifest};

/// Kind of media a catalog serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            other => Err(AppError::Validation(format!(
                "Unsupported media type: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// List-rendering service types
// ============================================================================

/// Per-list manifest served by the list-rendering service.
///
/// Only the display name is read; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListManifest {
    #[serde(default)]
    pub name: Option<String>,
}
