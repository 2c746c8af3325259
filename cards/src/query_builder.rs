//! Translates the recognized attribute filters (spec §4.1) into a Scryfall
//! search-syntax query string.

use stack_sage_contracts::{CardSearchFilters, Comparison};

fn comparison_token(field: &str, cmp: Comparison) -> String {
    match cmp {
        Comparison::Eq(n) => format!("{field}={n}"),
        Comparison::Lt(n) => format!("{field}<{n}"),
        Comparison::Lte(n) => format!("{field}<={n}"),
        Comparison::Gt(n) => format!("{field}>{n}"),
        Comparison::Gte(n) => format!("{field}>={n}"),
    }
}

pub fn build_scryfall_query(filters: &CardSearchFilters) -> String {
    let mut terms = Vec::new();

    if let Some(colors) = &filters.colors {
        terms.push(format!("c:{colors}"));
    }
    if let Some(mv) = filters.mana_value {
        terms.push(comparison_token("mv", mv));
    }
    if let Some(power) = filters.power {
        terms.push(comparison_token("pow", power));
    }
    if let Some(toughness) = filters.toughness {
        terms.push(comparison_token("tou", toughness));
    }
    if let Some(format) = &filters.format_legal {
        terms.push(format!("f:{format}"));
    }
    if let Some(card_type) = &filters.card_type {
        terms.push(format!("t:{card_type}"));
    }
    if let Some(keywords) = &filters.keywords {
        terms.push(format!("keyword:{keywords}"));
    }
    if let Some(text) = &filters.text {
        terms.push(format!("o:\"{text}\""));
    }
    if let Some(rarity) = &filters.rarity {
        terms.push(format!("r:{rarity}"));
    }

    terms.join(" ")
}
