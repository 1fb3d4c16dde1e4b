//! video-forge library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod app;
pub mod cli;
pub mod config;
pub mod gemini;
pub mod library;
pub mod types;
pub mod view;
