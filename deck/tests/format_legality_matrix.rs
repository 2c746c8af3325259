use std::collections::HashMap;

use stack_sage_contracts::{CardEvidence, Deck, Legality};
use stack_sage_deck::DeckValidator;

fn card(name: &str, legalities: &[(&str, Legality)]) -> CardEvidence {
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
        color_identity: vec![],
    }
}

fn filler_deck(format: &str, count: u32) -> Deck {
    let mut deck = Deck { format: format.to_string(), ..Deck::default() };
    for i in 0..count {
        deck.mainboard.insert(format!("Filler {i}"), 1);
    }
    deck
}

#[test]
fn standard_modern_pioneer_legacy_pauper_all_require_sixty_cards() {
    for format in ["standard", "modern", "pioneer", "legacy", "pauper"] {
        let deck = filler_deck(format, 59);
        let result = DeckValidator.validate(&deck, &HashMap::new());
        assert!(
            !result.is_legal,
            "{format} should reject a 59-card deck, got {:?}",
            result.errors
        );
        assert!(result.errors.iter().any(|e| e.contains("at least 60")));

        let deck = filler_deck(format, 60);
        let result = DeckValidator.validate(&deck, &HashMap::new());
        assert!(result.is_legal, "{format} should accept 60 cards, got {:?}", result.errors);
    }
}

#[test]
fn commander_requires_exactly_one_hundred_and_a_commander() {
    let deck = filler_deck("commander", 99);
    let result = DeckValidator.validate(&deck, &HashMap::new());
    assert!(result.errors.iter().any(|e| e.contains("requires a commander")));
    assert!(result.errors.iter().any(|e| e.contains("at least 100")));

    let mut deck = filler_deck("commander", 99);
    deck.commander = Some("Urza, Lord High Artificer".into());
    let mut lookup = HashMap::new();
    lookup.insert(
        "urza, lord high artificer".to_string(),
        card("Urza, Lord High Artificer", &[("commander", Legality::Legal)]),
    );
    let result = DeckValidator.validate(&deck, &lookup);
    assert!(result.is_legal, "{:?}", result.errors);
}

#[test]
fn commander_singleton_copy_limit_rejects_a_second_copy() {
    let mut deck = filler_deck("commander", 98);
    deck.commander = Some("Urza, Lord High Artificer".into());
    deck.mainboard.insert("Sol Ring".into(), 2);

    let mut lookup = HashMap::new();
    lookup.insert(
        "urza, lord high artificer".to_string(),
        card("Urza, Lord High Artificer", &[("commander", Legality::Legal)]),
    );
    lookup.insert("sol ring".to_string(), card("Sol Ring", &[("commander", Legality::Legal)]));

    let result = DeckValidator.validate(&deck, &lookup);
    assert!(result.errors.iter().any(|e| e.contains("too many copies of Sol Ring")));
}

#[test]
fn unrecognized_format_is_a_single_error_not_a_panic() {
    let deck = filler_deck("cube draft", 40);
    let result = DeckValidator.validate(&deck, &HashMap::new());
    assert!(!result.is_legal);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("unrecognized format"));
}

#[test]
fn sideboard_over_the_limit_is_an_error_regardless_of_format() {
    let mut deck = filler_deck("modern", 60);
    for i in 0..16 {
        deck.sideboard.insert(format!("Side {i}"), 1);
    }
    let result = DeckValidator.validate(&deck, &HashMap::new());
    assert!(result.errors.iter().any(|e| e.contains("sideboard")));
}

#[test]
fn banned_card_is_always_an_error() {
    let mut deck = filler_deck("modern", 59);
    deck.mainboard.insert("Mental Misstep".into(), 1);
    let mut lookup = HashMap::new();
    lookup.insert("mental misstep".to_string(), card("Mental Misstep", &[("modern", Legality::Banned)]));

    let result = DeckValidator.validate(&deck, &lookup);
    assert!(result.errors.iter().any(|e| e.contains("is banned in modern")));
}
