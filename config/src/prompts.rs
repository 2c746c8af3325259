//! Fixed prompt contracts (SPEC_FULL.md §10). Versioned as constants so a
//! prompt change shows up as a diff, not a silent runtime behavior change.

/// Planner's strict JSON-return contract (spec §4.4). Temperature is forced
/// to 0.0 for this call regardless of `LLM_TEMPERATURE`.
pub const PLANNER_CONTRACT_V1: &str = r#"You extract MTG card names and classify intent from a user question.
Respond with ONLY a JSON object of the exact shape:
{"card_names": ["Card Name", ...], "intent": "card_interaction" | "rules" | "meta" | "deck_validation"}
Do not include any other text, markdown fences, or commentary."#;

/// Interaction agent's grounding contract (spec §4.9).
pub const INTERACTION_CONTRACT_V1: &str = r#"Answer the MTG question using only the evidence provided in context.
1. Cite rules by id and cards by name; cite nothing not present in the evidence.
2. Walk interactions step-by-step using MTG timing: triggers, then the stack, then resolution, then state-based actions.
3. If the evidence is insufficient to answer, say so plainly and name what is missing.
4. Never invent card names, rule numbers, or facts not present in the evidence."#;

/// Judge's rewrite contract (spec §4.10): constrained to only cited evidence.
pub const JUDGE_REWRITE_CONTRACT_V1: &str = r#"Rewrite the draft answer so every card name and rule id it mentions is present in the evidence below.
Do not introduce any new factual claim. If the ungrounded claim cannot be removed while
still answering the question, replace the answer with a short statement that there is
insufficient information to answer confidently."#;

#[derive(Debug, Clone, Copy)]
pub struct PromptContracts;

impl PromptContracts {
    pub fn planner() -> &'static str {
        PLANNER_CONTRACT_V1
    }

    pub fn interaction() -> &'static str {
        INTERACTION_CONTRACT_V1
    }

    pub fn judge_rewrite() -> &'static str {
        JUDGE_REWRITE_CONTRACT_V1
    }
}
