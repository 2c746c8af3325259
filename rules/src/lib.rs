//! Rules Index: chunks the Comprehensive Rules along its hierarchical
//! numbering and serves hybrid vector+BM25 retrieval with a query cache
//! (spec §4.2).

pub mod bm25;
pub mod chunking;
pub mod embedding;
pub mod index;
pub mod retrieval;
pub mod vector_store;

pub use chunking::{chunk_comprehensive_rules, RuleChunk};
pub use embedding::{EmbeddingProvider, HostedEmbeddingProvider, LocalEmbeddingProvider};
pub use index::RulesIndexHandle;
pub use retrieval::{RuleText, RulesIndex, DEFAULT_K, HYBRID_ALPHA};
