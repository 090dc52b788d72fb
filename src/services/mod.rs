pub mod extractor;
pub mod llm_service;
pub mod prompt;
pub mod section_splitter;
pub mod session_store;

pub use llm_service::{Analyzer, LlmService};
pub use section_splitter::split_sections;
pub use session_store::{SessionId, SessionStore};
