//! Stateless computational steps shared by the template pipelines.
//!
//! Each submodule exposes a `run` entry point: [`refinement`] repairs an
//! alignment by trimming loner overhang, [`contact_detection`] checks which
//! chains a residue touches, and [`selection`] reduces alternative templates
//! to one winner per logical domain or interaction.

pub mod contact_detection;
pub mod refinement;
pub mod selection;
