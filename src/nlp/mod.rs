// Text statistics and extractive summarization for docsum
pub mod chunking;
pub mod extractive;
pub mod frequency;
pub mod sentences;

pub use chunking::{chunk_words, ChunkConfig};
pub use extractive::summarize_extractive;
pub use frequency::{top_keywords, FrequencyTable};
pub use sentences::{deduplicate_sentences, split_sentences};
