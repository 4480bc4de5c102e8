//! # a11y-verify
//!
//! Report verification for the accessibility auditor.
//!
//! This crate provides [`engine::ReportSchemaVerifier`], which implements the
//! [`a11y_core::traits::ReportVerifier`] trait by validating raw scan reports
//! with the `jsonschema` crate. A report that fails verification never
//! reaches a `completed` record.

pub mod engine;

pub use engine::{report_schema, ReportSchemaVerifier, SCHEMA_CHECK};
