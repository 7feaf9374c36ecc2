use std::collections::HashMap;

use crate::config::NormalizationConfig;

/// Canonicalizes entity names before they are compared.
///
/// Lookup against the abbreviation table is case-insensitive on both its keys
/// and its expansions, so an already expanded name maps onto itself and
/// `normalize` is idempotent.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    table: HashMap<String, String>,
    preserve_case: bool,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: &NormalizationConfig) -> Self {
        let mut table = HashMap::new();
        for expansion in config.abbreviations.values() {
            table
                .entry(collapse_whitespace(expansion).to_lowercase())
                .or_insert_with(|| expansion.trim().to_string());
        }
        // Abbreviation keys win over expansions that happen to collide.
        for (abbreviation, expansion) in &config.abbreviations {
            table.insert(
                collapse_whitespace(abbreviation).to_lowercase(),
                expansion.trim().to_string(),
            );
        }

        Self {
            table,
            preserve_case: config.preserve_case,
        }
    }

    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: &str, expansion: &str) -> Self {
        let expansion = expansion.trim().to_string();
        self.table
            .entry(collapse_whitespace(&expansion).to_lowercase())
            .or_insert_with(|| expansion.clone());
        self.table
            .insert(collapse_whitespace(abbreviation).to_lowercase(), expansion);
        self
    }

    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        let collapsed = collapse_whitespace(name);
        if collapsed.is_empty() {
            return String::new();
        }

        if let Some(expansion) = self.table.get(&collapsed.to_lowercase()) {
            return expansion.clone();
        }

        if self.preserve_case || looks_like_abbreviation(&collapsed) {
            collapsed
        } else {
            collapsed.to_lowercase()
        }
    }
}

/// True when every cased character is upper case and the token is 2-10
/// characters long.
#[must_use]
pub fn looks_like_abbreviation(token: &str) -> bool {
    let token = token.trim();
    let len = token.chars().count();
    (2..=10).contains(&len) && is_all_upper(token)
}

/// At least one cased character, and no lower-case ones.
#[must_use]
pub fn is_all_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
