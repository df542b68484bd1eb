//! # Templar Core Library
//!
//! Structural template selection and residue position mapping for protein
//! point mutations. Given a protein and a mutation, the library finds the
//! experimentally determined structures that best represent the mutated
//! domain, alone or in contact with an interaction partner, and reports where
//! the mutated residue sits in each structure.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless models of sequences, domains,
//!   mutations and parsed structures; validated pairwise alignments with their
//!   scoring, loner detection and position projection; and file I/O.
//!
//! - **[`engine`]: The Logic Core.** Pluggable aligners behind the
//!   [`Aligner`](engine::aligner::Aligner) trait, the admission gate and
//!   per-alignment workspaces, domain-to-structure mapping, iterative
//!   refinement, contact detection and template selection.
//!
//! - **[`sources`]: The Data Layer.** Capability traits for every lookup the
//!   pipelines perform, and a directory-backed store implementing them all.
//!
//! - **[`workflows`]: The Public API.** The core and interface template
//!   searches for a single protein mutation.

pub mod core;
pub mod engine;
pub mod sources;
pub mod workflows;
