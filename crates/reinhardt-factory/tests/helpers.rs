//! Test helpers for reinhardt-factory tests.
//!
//! This module provides the models produced by the factories under test.

#[path = "helpers/models.rs"]
pub mod models;
