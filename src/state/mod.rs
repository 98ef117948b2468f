// State management module.
// Holds the in-memory quiz cache and the store that keeps it in sync with the service.

pub mod cache;
pub mod store;

pub use cache::{QuestionFetch, QuizCache, RequestStatus, dedupe_by_text};
pub use store::QuizStore;
