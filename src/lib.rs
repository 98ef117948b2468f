// quizdesk: quiz management client for teachers.
// Mirrors quizzes, courses and per-quiz questions from a REST data service.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod ids;
pub mod import;
pub mod state;

pub use api::{QuizClient, QuizService};
pub use config::Config;
pub use error::{QuizError, Result};
pub use state::{QuizCache, QuizStore, RequestStatus};
