//! # Pairwise Alignments
//!
//! Two-row gapped alignments between a query sequence and a structure chain
//! sequence, together with the stateless operations performed on them:
//!
//! - [`scoring`] - percent identity, percent coverage and their weighted blend
//! - [`loners`] - detection of terminal residue blocks stranded by long gaps
//! - [`projection`] - carrying a sequence position across the alignment

pub mod alignment;
pub mod loners;
pub mod projection;
pub mod scoring;

pub use alignment::{AlignedRow, Alignment, AlignmentError, GAP};
pub use loners::{GapBlock, Loner, LonerDetector, RowRole, ScanDirection, find_loner};
pub use projection::{Projection, project_position};
pub use scoring::AlignmentScore;
