pub mod ai;
pub mod embeddings;
pub mod weather;
