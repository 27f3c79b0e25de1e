//! errisnil core - configuration and analysis orchestration

pub mod config;
pub mod orchestrator;
