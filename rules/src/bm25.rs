//! A keyword index over tokenized rule text, scored with classic BM25
//! (spec §4.2: "a keyword index (term-frequency scoring over tokenized
//! text)").

use std::collections::HashMap;

const K1: f32 = 1.2;
const B: f32 = 0.75;

fn tokenize(text: &str) -> Vec<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

struct DocumentEntry {
    rule_id: String,
    term_counts: HashMap<String, u32>,
    length: usize,
}

pub struct Bm25Index {
    documents: Vec<DocumentEntry>,
    document_frequency: HashMap<String, u32>,
    total_length: usize,
}

impl Bm25Index {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            document_frequency: HashMap::new(),
            total_length: 0,
        }
    }

    pub fn insert(&mut self, rule_id: String, text: &str) {
        let tokens = tokenize(text);
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_length += tokens.len();
        self.documents.push(DocumentEntry {
            rule_id,
            length: tokens.len(),
            term_counts,
        });
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn avg_doc_length(&self) -> f32 {
        if self.documents.is_empty() {
            0.0
        } else {
            self.total_length as f32 / self.documents.len() as f32
        }
    }

    /// Top-`k` rule ids by BM25 score against `query`, highest first.
    /// Documents with a score of 0 (no query term present) are excluded.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, f32)> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        let n = self.documents.len() as f32;
        let avg_len = self.avg_doc_length();

        let mut scored: Vec<(String, f32)> = self
            .documents
            .iter()
            .map(|doc| {
                let score: f32 = query_terms
                    .iter()
                    .map(|term| {
                        let df = *self.document_frequency.get(term).unwrap_or(&0) as f32;
                        if df == 0.0 {
                            return 0.0;
                        }
                        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                        let tf = *doc.term_counts.get(term).unwrap_or(&0) as f32;
                        let denom = tf + K1 * (1.0 - B + B * (doc.length as f32 / avg_len.max(1.0)));
                        if denom == 0.0 {
                            0.0
                        } else {
                            idf * (tf * (K1 + 1.0)) / denom
                        }
                    })
                    .sum();
                (doc.rule_id.clone(), score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}
