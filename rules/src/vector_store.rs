//! In-process cosine-similarity vector store (spec §4.2). Comprehensive-Rules
//! scale (on the order of a few thousand chunks) makes a brute-force scan
//! fast enough that pulling in an external vector database isn't warranted.

#[derive(Debug, Clone)]
struct Entry {
    rule_id: String,
    vector: Vec<f32>,
}

pub struct VectorStore {
    entries: Vec<Entry>,
    dimensions: usize,
}

impl VectorStore {
    pub fn new(dimensions: usize) -> Self {
        Self { entries: Vec::new(), dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn insert(&mut self, rule_id: String, vector: Vec<f32>) {
        debug_assert_eq!(vector.len(), self.dimensions);
        self.entries.push(Entry { rule_id, vector });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-`k` rule ids by cosine similarity to `query`, highest first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(String, f32)> {
        let mut scored: Vec<(String, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry.rule_id.clone(), cosine_similarity(query, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_similarity_and_caps_at_k() {
        let mut store = VectorStore::new(3);
        store.insert("a".into(), vec![1.0, 0.0, 0.0]);
        store.insert("b".into(), vec![0.0, 1.0, 0.0]);
        store.insert("c".into(), vec![0.9, 0.1, 0.0]);

        let results = store.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert_eq!(results[1].0, "c");
    }
}
