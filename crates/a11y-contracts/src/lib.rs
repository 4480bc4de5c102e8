//! # a11y-contracts
//!
//! Shared types, documents, and error contracts for the accessibility
//! auditor.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, their invariants, and error types.

pub mod error;
pub mod record;
pub mod report;
pub mod verify;
