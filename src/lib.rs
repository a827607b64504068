//! Slash-command bot - A GitHub App that answers `/command` comments.
//!
//! This library provides the command classifier, the workflow engine, the
//! octocrab-backed GitHub interpreter and the webhook server.

pub mod commands;
pub mod config;
pub mod effects;
pub mod github;
pub mod server;
pub mod types;
pub mod webhooks;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;
