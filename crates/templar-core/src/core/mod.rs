//! # Core Module
//!
//! Stateless building blocks of the template search: sequence and structure
//! models, pairwise alignments with their scoring and position projection,
//! and file I/O.
//!
//! - **Sequences** ([`sequence`]) - protein sequences, domain boundaries and mutations
//! - **Structures** ([`models`]) - parsed structures and native residue numbering
//! - **Alignments** ([`alignment`]) - validated pairwise alignments and the operations on them
//! - **File I/O** ([`io`]) - PDB, FASTA and CSV readers
//! - **Utilities** ([`utils`]) - residue identifiers and geometry helpers

pub mod alignment;
pub mod io;
pub mod models;
pub mod sequence;
pub mod utils;
