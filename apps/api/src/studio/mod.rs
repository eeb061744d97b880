//! Content studio: category-aware prompt building, LLM generation, validation,
//! Jaccard duplicate detection, and publishing to object storage.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod publish;
pub mod repository;
pub mod similarity;
pub mod validation;
