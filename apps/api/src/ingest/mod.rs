//! Ingest: résumé upload to normalized record.
//!
//! `upload` decodes the file, `validation` checks JSON against the schema and
//! `extraction` asks the model to structure free text.

pub mod extraction;
pub mod prompts;
pub mod upload;
pub mod validation;
