//! # Structure Models
//!
//! In-memory representation of a parsed macromolecular structure and the
//! numbering translation between a chain's native residue numbers and its
//! extracted one-letter sequence.
//!
//! - [`structure`] - `StructureModel`, the slot-map backed container and its key types
//! - [`chain`], [`residue`], [`atom`] - the components of a model
//! - [`numbering`] - `ChainNumbering`, native spans and chain sequence extraction

pub mod atom;
pub mod chain;
pub mod numbering;
pub mod residue;
pub mod structure;
