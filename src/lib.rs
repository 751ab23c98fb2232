//! Document quiz backend: upload documents, ask questions about them, and
//! generate validated multiple-choice quizzes through a text-generation service.

pub mod ask;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod openai;
pub mod protocol;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
