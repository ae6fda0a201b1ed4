//! Localized markers found in captured chest text
//!
//! The game renders the chest list in the player's language. Every marker
//! the parser looks for comes from a [`LocaleStrings`] table so a capture
//! from another locale only needs a different table.

use serde::{Deserialize, Serialize};

/// Marker strings for one game locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleStrings {
    /// Prefix of the clanmate line ("From")
    pub from: String,

    /// Prefix of the source line ("Source")
    pub source: String,

    /// Long level token ("Level")
    pub level: String,

    /// Short level token ("lvl")
    pub lvl: String,

    /// Marker identifying a clan header box that carries no chest
    pub clan: String,

    /// Qualifier inserted before a bare crypt type ("Common")
    pub common: String,

    /// Bare crypt type that receives the `common` qualifier.
    /// `None` disables the normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_crypt: Option<String>,
}

impl Default for LocaleStrings {
    fn default() -> Self {
        Self::english()
    }
}

impl LocaleStrings {
    /// English client strings
    pub fn english() -> Self {
        Self {
            from: "From".to_string(),
            source: "Source".to_string(),
            level: "Level".to_string(),
            lvl: "lvl".to_string(),
            clan: "Clan".to_string(),
            common: "Common".to_string(),
            only_crypt: None,
        }
    }

    /// Spanish client strings
    ///
    /// The Spanish client places the level token after the crypt name
    /// ("Cripta de nivel 10").
    pub fn spanish() -> Self {
        Self {
            from: "De".to_string(),
            source: "Fuente".to_string(),
            level: "nivel".to_string(),
            lvl: "niv".to_string(),
            clan: "Clan".to_string(),
            common: "Común".to_string(),
            only_crypt: Some("Cripta".to_string()),
        }
    }

    /// Validate that no marker is empty
    pub fn validate(&self) -> Result<(), String> {
        let markers = [
            ("from", &self.from),
            ("source", &self.source),
            ("level", &self.level),
            ("lvl", &self.lvl),
            ("clan", &self.clan),
            ("common", &self.common),
        ];
        for (name, value) in markers {
            if value.trim().is_empty() {
                return Err(format!("locale marker '{}' cannot be empty", name));
            }
        }
        if matches!(&self.only_crypt, Some(crypt) if crypt.trim().is_empty()) {
            return Err("locale marker 'only_crypt' cannot be empty".to_string());
        }
        Ok(())
    }
}
