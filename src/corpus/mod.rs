//! Feedback corpus input

pub mod loader;

pub use loader::{CorpusFormat, CorpusLoader};
