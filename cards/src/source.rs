//! The raw card-service transport (spec §4.1), separated from caching so
//! tests substitute a fake instead of hitting Scryfall (spec §9).

use async_trait::async_trait;
use serde::Deserialize;
use stack_sage_contracts::{CardEvidence, CardSearchFilters, Legality};

use crate::error::CardSourceError;

#[async_trait]
pub trait CardSource: Send + Sync {
    /// Fuzzy-name lookup. The adapter does not disambiguate ambiguous
    /// matches itself (spec §4.1) — it returns whatever the service reports
    /// as the best match.
    async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError>;

    /// Open-ended attribute search, capped to 10 results by the caller.
    async fn search_by_criteria(
        &self,
        filters: &CardSearchFilters,
    ) -> Result<Vec<CardEvidence>, CardSourceError>;
}

/// A Scryfall-backed card source.
pub struct ScryfallSource {
    http: reqwest::Client,
    base_url: String,
}

impl ScryfallSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("StackSage/1.0")
                .build()
                .expect("reqwest client builds"),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScryfallCard {
    name: String,
    #[serde(default)]
    mana_cost: String,
    #[serde(default)]
    type_line: String,
    #[serde(default)]
    oracle_text: String,
    #[serde(default)]
    power: Option<String>,
    #[serde(default)]
    toughness: Option<String>,
    #[serde(default)]
    set: String,
    #[serde(default)]
    collector_number: String,
    #[serde(default)]
    color_identity: Vec<String>,
    #[serde(default)]
    legalities: std::collections::HashMap<String, String>,
    #[serde(default)]
    rulings_text: Vec<String>,
}

fn parse_legality(raw: &str) -> Legality {
    match raw {
        "legal" => Legality::Legal,
        "banned" => Legality::Banned,
        "restricted" => Legality::Restricted,
        "not_legal" => Legality::NotLegal,
        _ => Legality::Unknown,
    }
}

impl From<ScryfallCard> for CardEvidence {
    fn from(card: ScryfallCard) -> Self {
        CardEvidence {
            name: card.name,
            mana_cost: card.mana_cost,
            type_line: card.type_line,
            oracle_text: card.oracle_text,
            power: card.power,
            toughness: card.toughness,
            legalities: card
                .legalities
                .into_iter()
                .map(|(format, raw)| (format, parse_legality(&raw)))
                .collect(),
            rulings: card.rulings_text,
            set: card.set,
            collector_number: card.collector_number,
            color_identity: card.color_identity,
        }
    }
}

#[async_trait]
impl CardSource for ScryfallSource {
    async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError> {
        let response = self
            .http
            .get(format!("{}/cards/named", self.base_url))
            .query(&[("fuzzy", name)])
            .send()
            .await
            .map_err(|e| CardSourceError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CardSourceError::NotFound(name.to_string()));
        }
        if response.status().is_server_error() {
            return Err(CardSourceError::Upstream(format!(
                "card service returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(CardSourceError::NotFound(name.to_string()));
        }

        let card: ScryfallCard = response
            .json()
            .await
            .map_err(|e| CardSourceError::Upstream(format!("malformed card response: {e}")))?;
        Ok(card.into())
    }

    async fn search_by_criteria(
        &self,
        filters: &CardSearchFilters,
    ) -> Result<Vec<CardEvidence>, CardSourceError> {
        let query = crate::query_builder::build_scryfall_query(filters);
        let response = self
            .http
            .get(format!("{}/cards/search", self.base_url))
            .query(&[("q", query.as_str()), ("order", "edhrec")])
            .send()
            .await
            .map_err(|e| CardSourceError::Upstream(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(CardSourceError::Upstream(format!(
                "card search returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            data: Vec<ScryfallCard>,
        }
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| CardSourceError::Upstream(format!("malformed search response: {e}")))?;
        Ok(parsed.data.into_iter().map(CardEvidence::from).collect())
    }
}
