//! Resume screening: decomposed skill / experience / education match scores
//! for many resumes against one job requirement, ranked under partial failure.

pub mod config;
pub mod embedding;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod screening;
pub mod source;
