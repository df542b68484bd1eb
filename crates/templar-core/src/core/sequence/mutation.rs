use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseMutationError {
    #[error("Mutation '{0}' is too short (expected e.g. 'A100T')")]
    TooShort(String),
    #[error("Mutation '{0}' does not start and end with residue letters")]
    InvalidResidue(String),
    #[error("Mutation '{0}' has an invalid position")]
    InvalidPosition(String),
}

/// A point mutation such as `A100T`: wild-type residue, 1-based position in
/// the full protein sequence, and mutant residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mutation {
    pub wild_type: char,
    pub position: usize,
    pub mutant: char,
}

impl Mutation {
    pub fn new(wild_type: char, position: usize, mutant: char) -> Self {
        Self {
            wild_type: wild_type.to_ascii_uppercase(),
            position,
            mutant: mutant.to_ascii_uppercase(),
        }
    }
}

impl FromStr for Mutation {
    type Err = ParseMutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 3 || !s.is_ascii() {
            return Err(ParseMutationError::TooShort(s.to_string()));
        }
        let bytes = s.as_bytes();
        let wild_type = bytes[0] as char;
        let mutant = bytes[bytes.len() - 1] as char;
        if !wild_type.is_ascii_alphabetic() || !mutant.is_ascii_alphabetic() {
            return Err(ParseMutationError::InvalidResidue(s.to_string()));
        }
        let position: usize = s[1..s.len() - 1]
            .parse()
            .map_err(|_| ParseMutationError::InvalidPosition(s.to_string()))?;
        if position == 0 {
            return Err(ParseMutationError::InvalidPosition(s.to_string()));
        }
        Ok(Mutation::new(wild_type, position, mutant))
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.wild_type, self.position, self.mutant)
    }
}

impl Serialize for Mutation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
