//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep front ends decoupled from storage details.

pub mod account_service;
pub mod archive_service;
pub mod notification_service;
pub mod settings_service;
pub mod task_service;
