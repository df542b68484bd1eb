//! Protein sequences, domain boundaries and point mutations.

pub mod mutation;
pub mod record;

pub use mutation::{Mutation, ParseMutationError};
pub use record::{Domain, DomainError, SequenceRecord};
