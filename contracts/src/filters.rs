use serde::{Deserialize, Serialize};

/// A numeric comparison like `>= 3` or `= 0`, used for `mana_value`,
/// `power`/`toughness` filters (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Comparison {
    Eq(f64),
    Lt(f64),
    Lte(f64),
    Gt(f64),
    Gte(f64),
}

impl Comparison {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Comparison::Eq(n) => (value - n).abs() < f64::EPSILON,
            Comparison::Lt(n) => value < n,
            Comparison::Lte(n) => value <= n,
            Comparison::Gt(n) => value > n,
            Comparison::Gte(n) => value >= n,
        }
    }
}

/// Recognized attribute filters for `search_by_criteria` (spec §4.1).
/// At least one field must be `Some`/non-empty or the call is `InvalidQuery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardSearchFilters {
    pub colors: Option<String>,
    pub mana_value: Option<Comparison>,
    pub power: Option<Comparison>,
    pub toughness: Option<Comparison>,
    pub format_legal: Option<String>,
    pub card_type: Option<String>,
    pub keywords: Option<String>,
    pub text: Option<String>,
    pub rarity: Option<String>,
}

impl CardSearchFilters {
    pub fn is_empty(&self) -> bool {
        self.colors.is_none()
            && self.mana_value.is_none()
            && self.power.is_none()
            && self.toughness.is_none()
            && self.format_legal.is_none()
            && self.card_type.is_none()
            && self.keywords.is_none()
            && self.text.is_none()
            && self.rarity.is_none()
    }
}
