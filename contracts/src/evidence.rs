use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-format legality status, as reported by the card source (spec §3, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legality {
    Legal,
    Banned,
    Restricted,
    NotLegal,
    /// The card source has no opinion for this format (e.g. unrecognized name).
    Unknown,
}

impl Legality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Legality::Legal => "legal",
            Legality::Banned => "banned",
            Legality::Restricted => "restricted",
            Legality::NotLegal => "not_legal",
            Legality::Unknown => "unknown",
        }
    }
}

/// A card, normalized from the external card service into the shape agents
/// and the deck validator consume (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEvidence {
    pub name: String,
    pub mana_cost: String,
    pub type_line: String,
    pub oracle_text: String,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub legalities: HashMap<String, Legality>,
    pub rulings: Vec<String>,
    pub set: String,
    pub collector_number: String,
    /// Color identity letters (e.g. `["U", "R"]`), used by the commander/brawl
    /// deck validator (spec §4.8).
    pub color_identity: Vec<String>,
}

impl CardEvidence {
    pub fn legality_for(&self, format: &str) -> Legality {
        self.legalities
            .get(format)
            .copied()
            .unwrap_or(Legality::Unknown)
    }

    pub fn is_basic_land(&self) -> bool {
        self.type_line.to_ascii_lowercase().contains("basic land")
    }
}

/// A single retrieved rule chunk (spec §3, §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvidence {
    /// Dotted numeric id, e.g. `601.2a`. The system's stable identifier; it
    /// propagates into citations verbatim.
    pub rule_id: String,
    pub text: String,
    /// Retrieval relevance in `[0, 1]`.
    pub score: f32,
}

/// A single web-meta search hit (spec §3, §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaSource {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A metagame snapshot for one format (spec §3, §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEvidence {
    pub format: String,
    pub snapshot_date: chrono::DateTime<chrono::Utc>,
    pub summary: String,
    pub sources: Vec<MetaSource>,
    /// Set when the cache served a snapshot older than the fresh window but
    /// within the warn window (spec §4.7, §6 cache limits).
    pub stale: bool,
}

/// Result of validating a parsed decklist against a format's rules
/// (spec §3, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeckValidationResult {
    pub is_legal: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub total_cards: usize,
}

/// A parsed decklist (spec §3, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Deck {
    pub format: String,
    pub mainboard: HashMap<String, u32>,
    pub sideboard: HashMap<String, u32>,
    pub commander: Option<String>,
}

/// Deck evidence placed into `context["deck"]` once validated (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEvidence {
    pub deck: Deck,
    pub validation: DeckValidationResult,
}

/// Tagged evidence union threaded through `AgentState.context` (spec §3).
///
/// Variants mirror the four evidence kinds exactly; there is no catch-all
/// variant, so a typo in a producing agent fails to compile rather than
/// silently landing in the wrong bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Evidence {
    Card(CardEvidence),
    Rule(RuleEvidence),
    Meta(MetaEvidence),
    Deck(DeckEvidence),
}

impl Evidence {
    pub fn as_card(&self) -> Option<&CardEvidence> {
        match self {
            Evidence::Card(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&RuleEvidence> {
        match self {
            Evidence::Rule(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_meta(&self) -> Option<&MetaEvidence> {
        match self {
            Evidence::Meta(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_deck(&self) -> Option<&DeckEvidence> {
        match self {
            Evidence::Deck(d) => Some(d),
            _ => None,
        }
    }
}

/// The four evidence buckets in `AgentState.context` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Cards,
    Rules,
    Meta,
    Deck,
}

/// A citation: either a card name+set or a rule id+text (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Citation {
    Card { name: String, set: String },
    Rule { rule_id: String, text: String },
}

impl Citation {
    pub fn label(&self) -> String {
        match self {
            Citation::Card { name, set } => format!("{name} ({set})"),
            Citation::Rule { rule_id, .. } => rule_id.clone(),
        }
    }
}
