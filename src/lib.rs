//! # jackpot-quiz
//!
//! A single-session "who wants to be a millionaire" style trivia game served
//! over HTTP.
//!
//! ## Modules
//!
//! - `config`: prize table, time budgets, environment settings
//! - `quiz`: questions, the pool builder, the round engine and the session
//! - `server`: axum router exposing the session to a front end

pub mod config;
pub mod quiz;
pub mod server;
