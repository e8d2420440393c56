//! Token and credential models for both OAuth generations.

pub mod bearer;
pub mod consumer;
pub mod credential;
pub mod oauth1;
pub mod secret;
