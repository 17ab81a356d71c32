//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod library_service;
