//! Per-format deck-building rules (spec §4.8), expressed as data rather than
//! branching code so adding a format is additive (SPEC_FULL.md §10).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyLimit {
    /// At most `n` copies of any non-basic card.
    Max(u32),
    /// Singleton: at most one copy of any non-basic card.
    Singleton,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRules {
    pub name: &'static str,
    pub min_mainboard: u32,
    pub max_mainboard: Option<u32>,
    pub copy_limit: CopyLimit,
    /// Restricted-list cards are capped at one copy regardless of the general
    /// copy limit (vintage only, spec §4.8).
    pub restricted_list_applies: bool,
    pub commander_required: bool,
    pub color_identity_enforced: bool,
    pub max_sideboard: u32,
}

fn sixty_card_format(name: &'static str) -> FormatRules {
    FormatRules {
        name,
        min_mainboard: 60,
        max_mainboard: None,
        copy_limit: CopyLimit::Max(4),
        restricted_list_applies: false,
        commander_required: false,
        color_identity_enforced: false,
        max_sideboard: 15,
    }
}

/// Look up the deck-building rules for `format`, case-insensitive.
pub fn rules_for(format: &str) -> Option<FormatRules> {
    match format.to_ascii_lowercase().as_str() {
        "standard" => Some(sixty_card_format("standard")),
        "modern" => Some(sixty_card_format("modern")),
        "pioneer" => Some(sixty_card_format("pioneer")),
        "legacy" => Some(sixty_card_format("legacy")),
        "pauper" => Some(sixty_card_format("pauper")),
        "vintage" => Some(FormatRules {
            restricted_list_applies: true,
            ..sixty_card_format("vintage")
        }),
        "commander" | "edh" => Some(FormatRules {
            name: "commander",
            min_mainboard: 100,
            max_mainboard: Some(100),
            copy_limit: CopyLimit::Singleton,
            restricted_list_applies: false,
            commander_required: true,
            color_identity_enforced: true,
            max_sideboard: 0,
        }),
        "brawl" => Some(FormatRules {
            name: "brawl",
            min_mainboard: 60,
            max_mainboard: Some(60),
            copy_limit: CopyLimit::Singleton,
            restricted_list_applies: false,
            commander_required: true,
            color_identity_enforced: true,
            max_sideboard: 0,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commander_requires_singleton_and_color_identity() {
        let rules = rules_for("Commander").unwrap();
        assert_eq!(rules.copy_limit, CopyLimit::Singleton);
        assert!(rules.commander_required);
        assert!(rules.color_identity_enforced);
        assert_eq!(rules.max_sideboard, 0);
    }

    #[test]
    fn vintage_applies_restricted_list() {
        let rules = rules_for("vintage").unwrap();
        assert!(rules.restricted_list_applies);
        assert_eq!(rules.copy_limit, CopyLimit::Max(4));
    }

    #[test]
    fn unknown_format_is_none() {
        assert!(rules_for("oathbreaker").is_none());
    }
}
