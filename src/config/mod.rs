//! Project configuration loaded from a TOML file.
//!
//! # Keys
//!
//! | Key           | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `language`    | Document language code written to the page       |
//! | `smart_quotes`| Typographic quotes/dashes in the rendered body   |
//! | `extra_files` | Files shipped next to the page (local paths)     |
//! | `css_files`   | Stylesheets linked from the page (paths or URLs) |
//!
//! # Example
//!
//! ```toml
//! language = "en"
//! smart_quotes = true
//! extra_files = ["logo.svg"]
//! css_files = [
//!     "https://fonts.googleapis.com/css?family=Source+Sans+Pro:400,600",
//!     "presentation.css",
//! ]
//! ```
//!
//! Missing keys fall back to their defaults field by field; unknown keys
//! are rejected.

mod defaults;
mod error;

pub use error::ConfigError;

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Typed configuration for one presentation project.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Language code for the rendered page.
    #[serde(default = "defaults::language")]
    #[educe(Default = defaults::language())]
    pub language: String,

    /// Render typographic quotes and dashes in the body.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub smart_quotes: bool,

    /// Extra files copied next to the rendered page.
    #[serde(default = "defaults::extra_files")]
    #[educe(Default = defaults::extra_files())]
    pub extra_files: Vec<String>,

    /// Stylesheets linked from the rendered page. Entries may be local
    /// relative paths or absolute URLs.
    #[serde(default = "defaults::css_files")]
    #[educe(Default = defaults::css_files())]
    pub css_files: Vec<String>,
}

impl ProjectConfig {
    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }
}
