//! # Engine Module
//!
//! Mapping of protein domains onto structure chains and the computational
//! steps built on it.
//!
//! ## Overview
//!
//! The engine aligns a query domain against the sequence extracted from a
//! structure chain, repairs the alignment by trimming loner overhang,
//! translates positions between the query, the chain sequence and the native
//! residue numbering, checks inter-chain contacts, and ranks candidate
//! templates.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Thresholds and weights for mapping and scoring
//! - **Alignment** ([`aligner`], [`context`]) - Aligner implementations and the
//!   per-worker context that gates and validates every alignment
//! - **Concurrency** ([`gate`], [`workspace`]) - Process-wide admission gate and
//!   per-worker scratch directories
//! - **Mapping** ([`mapping`]) - Domain-to-chain mapping with optional refinement
//! - **Tasks** ([`tasks`]) - Refinement, contact detection and template selection
//! - **Results** ([`template`]) - Accepted templates and search outcomes
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Error Handling** ([`error`]) - Engine error taxonomy

pub mod aligner;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod mapping;
pub mod progress;
pub mod tasks;
pub mod template;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
