//! # Taskboard Web Server Library
//!
//! This library provides the core functionality for the Taskboard web
//! server: a task tracker with users, statuses, labels, and filterable
//! task lists.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `forms`: Form-encoded body decoding (bracketed field names)
//! - `report`: Forwarding of unexpected errors to an external service
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod report;
pub mod routes;
