// Quiz service API module.
// Provides the HTTP client, the service trait and wire types for the quiz REST API.

pub mod client;
pub mod endpoints;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::QuizClient;
pub use service::QuizService;
pub use types::*;
