use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evidence::{Citation, Evidence, EvidenceKind};
use crate::ordered_set::OrderedSet;

/// The four question intents Planner can classify (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CardInteraction,
    Rules,
    Meta,
    DeckValidation,
}

/// Identifiers for every node in the multi-agent graph (spec §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    Planner,
    Cards,
    Rules,
    Meta,
    Deck,
    Interaction,
    Judge,
    Finalizer,
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Planner => "planner",
            AgentId::Cards => "cards",
            AgentId::Rules => "rules",
            AgentId::Meta => "meta",
            AgentId::Deck => "deck",
            AgentId::Interaction => "interaction",
            AgentId::Judge => "judge",
            AgentId::Finalizer => "finalizer",
        }
    }
}

/// Evidence kind an Interaction (or Rules) agent declared it is missing
/// (spec §3, §4.9: triggers re-routing, capped at one re-invocation per kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingContextKind {
    Cards,
    Rules,
}

impl MissingContextKind {
    pub fn respecialist(&self) -> AgentId {
        match self {
            MissingContextKind::Cards => AgentId::Cards,
            MissingContextKind::Rules => AgentId::Rules,
        }
    }
}

/// Judge's verdict on the draft answer (spec §3, §4.10).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JudgeReport {
    pub grounded: bool,
    pub controller_correction: Option<String>,
    pub issues: Vec<String>,
}

/// Insertion-ordered evidence buckets keyed by kind (spec §3:
/// "mapping from evidence-kind to a list of Evidence records; insertion order
/// within a kind is preserved").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentContext {
    cards: Vec<Evidence>,
    rules: Vec<Evidence>,
    meta: Vec<Evidence>,
    deck: Vec<Evidence>,
}

impl AgentContext {
    pub fn push(&mut self, kind: EvidenceKind, evidence: Evidence) {
        self.bucket_mut(kind).push(evidence);
    }

    pub fn get(&self, kind: EvidenceKind) -> &[Evidence] {
        match kind {
            EvidenceKind::Cards => &self.cards,
            EvidenceKind::Rules => &self.rules,
            EvidenceKind::Meta => &self.meta,
            EvidenceKind::Deck => &self.deck,
        }
    }

    fn bucket_mut(&mut self, kind: EvidenceKind) -> &mut Vec<Evidence> {
        match kind {
            EvidenceKind::Cards => &mut self.cards,
            EvidenceKind::Rules => &mut self.rules,
            EvidenceKind::Meta => &mut self.meta,
            EvidenceKind::Deck => &mut self.deck,
        }
    }

    pub fn has_card_named(&self, name: &str) -> bool {
        self.cards
            .iter()
            .filter_map(Evidence::as_card)
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_rule_id(&self, rule_id: &str) -> bool {
        self.rules
            .iter()
            .filter_map(Evidence::as_rule)
            .any(|r| r.rule_id == rule_id)
    }
}

/// The record threaded through the graph for a single request (spec §3).
///
/// Created per-question, lives for one graph invocation, discarded afterwards.
/// Caches (spec §3 "Lifecycles") are process-local and outlive this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub request_id: Uuid,
    pub user_question: String,
    pub extracted_cards: Vec<String>,
    pub intent: Intent,
    pub task_plan: VecDeque<AgentId>,
    pub context: AgentContext,
    pub citations: Vec<Citation>,
    pub tools_used: OrderedSet<AgentId>,
    pub agent_timings: HashMap<String, f64>,
    pub draft_answer: String,
    pub judge_report: JudgeReport,
    pub missing_context: Option<MissingContextKind>,
    pub final_answer: Option<String>,
    /// Set by Planner when the question phrases a controller-dependent claim
    /// ("opponent controls X", "my/their ..."); consulted by Judge (spec §4.4,
    /// §4.10).
    pub controller_sensitive: bool,
    /// Non-fatal problems surfaced by agents/tools along the way (spec §3:
    /// "Agent failures append to issues but never raise").
    pub issues: Vec<String>,
    /// How many times each missing-context kind has triggered a re-invocation,
    /// capped at 1 (spec §4.12).
    pub missing_context_reinvocations: HashMap<MissingContextKind, u32>,
    /// Total node executions so far, capped at 15 (spec §4.12).
    pub node_executions: u32,
}

impl AgentState {
    pub fn new(request_id: Uuid, user_question: String) -> Self {
        Self {
            request_id,
            user_question,
            extracted_cards: Vec::new(),
            intent: Intent::Rules,
            task_plan: VecDeque::new(),
            context: AgentContext::default(),
            citations: Vec::new(),
            tools_used: OrderedSet::new(),
            agent_timings: HashMap::new(),
            draft_answer: String::new(),
            judge_report: JudgeReport::default(),
            missing_context: None,
            final_answer: None,
            controller_sensitive: false,
            issues: Vec::new(),
            missing_context_reinvocations: HashMap::new(),
            node_executions: 0,
        }
    }
}
