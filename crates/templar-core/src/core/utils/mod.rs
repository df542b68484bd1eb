//! Small, dependency-light helpers shared by the core data models.

pub mod geometry;
pub mod identifiers;
