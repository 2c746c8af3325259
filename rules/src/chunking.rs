//! Chunks the Comprehensive Rules source along its hierarchical numbering
//! (spec §4.2): lines like `100.`, `100.1`, `100.1a`.

use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct RuleChunk {
    pub rule_id: String,
    pub text: String,
}

/// Matches a leading rule id (`100.`, `100.1`, `100.1a`) followed by its body
/// text on the same line.
fn rule_id_pattern() -> Regex {
    Regex::new(r"^(\d+\.\d*[a-z]?\.?)\s+(.*)$").expect("static rule-id pattern compiles")
}

/// Split the raw Comprehensive Rules document into one chunk per numbered
/// paragraph. Lines that don't start a new rule id are appended to the
/// paragraph currently being accumulated, so wrapped lines stay attached to
/// their rule.
pub fn chunk_comprehensive_rules(source: &str) -> Vec<RuleChunk> {
    let pattern = rule_id_pattern();
    let mut chunks: Vec<RuleChunk> = Vec::new();

    for raw_line in source.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = pattern.captures(line) {
            let rule_id = captures[1].trim_end_matches('.').to_string();
            let body = captures[2].trim().to_string();
            chunks.push(RuleChunk { rule_id, text: body });
        } else if let Some(last) = chunks.last_mut() {
            last.text.push(' ');
            last.text.push_str(line);
        }
    }

    chunks
}
