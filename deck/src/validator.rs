//! Per-format Deck Validator (spec §4.8). Always returns a
//! [`DeckValidationResult`]; it never raises — unknown formats, unknown
//! cards, and legality lookups that never landed in `card_lookup` all become
//! warnings or errors on the result instead of a propagated failure.

use std::collections::HashMap;

use stack_sage_config::{rules_for, CopyLimit, FormatRules};
use stack_sage_contracts::{CardEvidence, Deck, DeckValidationResult, Legality};

/// Card names exempt from copy limits regardless of format (spec §4.8:
/// "Basic lands are exempt from copy limits"). Checked by name since a
/// decklist may reference a basic land this adapter has never fetched
/// (e.g. "Forest" with no `CardEvidence` yet in `card_lookup`).
const BASIC_LAND_NAMES: &[&str] = &[
    "plains", "island", "swamp", "mountain", "forest", "wastes",
    "snow-covered plains", "snow-covered island", "snow-covered swamp",
    "snow-covered mountain", "snow-covered forest",
];

fn is_basic_land(name: &str, card: Option<&CardEvidence>) -> bool {
    card.map(CardEvidence::is_basic_land).unwrap_or(false)
        || BASIC_LAND_NAMES.contains(&name.trim().to_ascii_lowercase().as_str())
}

pub struct DeckValidator;

impl DeckValidator {
    /// `card_lookup` is keyed by case-folded card name; it should contain an
    /// entry for every mainboard/sideboard card (and the commander, if any)
    /// that a card lookup succeeded for. Missing entries degrade to
    /// "cannot validate legality" warnings rather than blocking validation.
    pub fn validate(&self, deck: &Deck, card_lookup: &HashMap<String, CardEvidence>) -> DeckValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mainboard_cards: u32 = deck.mainboard.values().sum();

        let Some(rules) = rules_for(&deck.format) else {
            errors.push(format!("unrecognized format: {}", deck.format));
            return DeckValidationResult {
                is_legal: false,
                errors,
                warnings,
                total_cards: mainboard_cards as usize,
            };
        };

        // Singleton formats count the commander as part of the deck (spec
        // §4.8: "For singleton formats, commander is part of the count").
        let total_cards =
            if rules.commander_required && deck.commander.is_some() { mainboard_cards + 1 } else { mainboard_cards };

        self.check_mainboard_size(&rules, total_cards, &mut errors);
        self.check_sideboard_size(&rules, deck, &mut errors);

        if rules.commander_required && deck.commander.is_none() {
            errors.push(format!("{} requires a commander", rules.name));
        }

        let commander_identity = deck
            .commander
            .as_deref()
            .and_then(|name| card_lookup.get(&fold(name)))
            .map(|card| card.color_identity.clone());

        for (name, count) in &deck.mainboard {
            let card = card_lookup.get(&fold(name));
            self.check_card(&rules, name, *count, card, commander_identity.as_deref(), &mut errors, &mut warnings);
        }

        DeckValidationResult {
            is_legal: errors.is_empty(),
            errors,
            warnings,
            total_cards: total_cards as usize,
        }
    }

    fn check_mainboard_size(&self, rules: &FormatRules, total_cards: u32, errors: &mut Vec<String>) {
        if total_cards < rules.min_mainboard {
            errors.push(format!(
                "mainboard has {total_cards} cards, {} requires at least {}",
                rules.name, rules.min_mainboard
            ));
        }
        if let Some(max) = rules.max_mainboard {
            if total_cards > max {
                errors.push(format!(
                    "mainboard has {total_cards} cards, {} allows at most {max}",
                    rules.name
                ));
            }
        }
    }

    fn check_sideboard_size(&self, rules: &FormatRules, deck: &Deck, errors: &mut Vec<String>) {
        let sideboard_total: u32 = deck.sideboard.values().sum();
        if sideboard_total > rules.max_sideboard {
            errors.push(format!(
                "sideboard has {sideboard_total} cards, {} allows at most {}",
                rules.name, rules.max_sideboard
            ));
        }
    }

    fn check_card(
        &self,
        rules: &FormatRules,
        name: &str,
        count: u32,
        card: Option<&CardEvidence>,
        commander_identity: Option<&[String]>,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) {
        let Some(card) = card else {
            warnings.push(format!("unknown card \"{name}\": cannot validate legality"));
            return;
        };

        match card.legality_for(rules.name) {
            Legality::Banned => errors.push(format!("{name} is banned in {}", rules.name)),
            Legality::NotLegal => errors.push(format!("{name} is not legal in {}", rules.name)),
            Legality::Restricted => {
                if count > 1 {
                    errors.push(format!("{name} is restricted to 1 copy in {} (found {count})", rules.name));
                } else {
                    warnings.push(format!("{name} is on the restricted list in {}", rules.name));
                }
            }
            Legality::Legal | Legality::Unknown => {}
        }

        if !is_basic_land(name, Some(card)) {
            let limit = match rules.copy_limit {
                CopyLimit::Max(n) => n,
                CopyLimit::Singleton => 1,
            };
            let restricted_already_flagged =
                rules.restricted_list_applies && card.legality_for(rules.name) == Legality::Restricted;
            if count > limit && !restricted_already_flagged {
                errors.push(format!("too many copies of {name} ({count} > {limit})"));
            }
        }

        if rules.color_identity_enforced {
            if let Some(commander_identity) = commander_identity {
                if !card.color_identity.iter().all(|c| commander_identity.contains(c)) {
                    errors.push(format!(
                        "{name}'s color identity exceeds the commander's ({:?} vs {:?})",
                        card.color_identity, commander_identity
                    ));
                }
            }
        }
    }
}

fn fold(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, legalities: &[(&str, Legality)], color_identity: &[&str]) -> CardEvidence {
        CardEvidence {
            name: name.to_string(),
            mana_cost: "{1}".into(),
            type_line: "Instant".into(),
            oracle_text: "...".into(),
            power: None,
            toughness: None,
            legalities: legalities.iter().map(|(f, l)| (f.to_string(), *l)).collect(),
            rulings: vec![],
            set: "TST".into(),
            collector_number: "1".into(),
            color_identity: color_identity.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn too_many_copies_is_an_error() {
        let mut deck = Deck { format: "modern".into(), ..Deck::default() };
        deck.mainboard.insert("Lightning Bolt".into(), 5);
        deck.mainboard.insert("Mountain".into(), 55);

        let mut lookup = HashMap::new();
        lookup.insert("lightning bolt".into(), card("Lightning Bolt", &[("modern", Legality::Legal)], &[]));
        lookup.insert("mountain".into(), card("Mountain", &[("modern", Legality::Legal)], &[]));

        let result = DeckValidator.validate(&deck, &lookup);
        assert!(!result.is_legal);
        assert!(result.errors.iter().any(|e| e.contains("too many copies of Lightning Bolt")));
        assert_eq!(result.total_cards, 60);
    }

    #[test]
    fn vintage_restricted_card_errors_at_two_copies_warns_at_one() {
        let mut lookup = HashMap::new();
        lookup.insert(
            "black lotus".into(),
            card("Black Lotus", &[("vintage", Legality::Restricted)], &[]),
        );
        lookup.insert("island".into(), card("Island", &[("vintage", Legality::Legal)], &[]));

        let mut deck = Deck { format: "vintage".into(), ..Deck::default() };
        deck.mainboard.insert("Black Lotus".into(), 2);
        deck.mainboard.insert("Island".into(), 58);
        let result = DeckValidator.validate(&deck, &lookup);
        assert!(!result.is_legal);
        assert!(result.errors.iter().any(|e| e.contains("restricted to 1 copy")));

        deck.mainboard.insert("Black Lotus".into(), 1);
        deck.mainboard.insert("Island".into(), 59);
        let result = DeckValidator.validate(&deck, &lookup);
        assert!(result.is_legal);
        assert!(result.warnings.iter().any(|w| w.contains("restricted list")));
    }

    #[test]
    fn commander_color_identity_violation_is_an_error_per_card() {
        let mut lookup = HashMap::new();
        lookup.insert(
            "urza, lord high artificer".into(),
            card("Urza, Lord High Artificer", &[("commander", Legality::Legal)], &["U"]),
        );
        lookup.insert("sol ring".into(), card("Sol Ring", &[("commander", Legality::Legal)], &[]));
        lookup.insert(
            "lightning bolt".into(),
            card("Lightning Bolt", &[("commander", Legality::Legal)], &["R"]),
        );

        let mut deck = Deck {
            format: "commander".into(),
            commander: Some("Urza, Lord High Artificer".into()),
            ..Deck::default()
        };
        deck.mainboard.insert("Sol Ring".into(), 1);
        deck.mainboard.insert("Lightning Bolt".into(), 1);
        for i in 0..98 {
            deck.mainboard.insert(format!("Filler {i}"), 1);
        }

        let result = DeckValidator.validate(&deck, &lookup);
        assert!(result.errors.iter().any(|e| e.contains("Lightning Bolt") && e.contains("color identity")));
    }

    #[test]
    fn unknown_card_is_a_warning_not_an_error() {
        let mut deck = Deck { format: "modern".into(), ..Deck::default() };
        deck.mainboard.insert("Some Obscure Card".into(), 4);
        for i in 0..56 {
            deck.mainboard.insert(format!("Filler {i}"), 1);
        }
        let result = DeckValidator.validate(&deck, &HashMap::new());
        assert!(result.warnings.iter().any(|w| w.contains("unknown card")));
    }
}
