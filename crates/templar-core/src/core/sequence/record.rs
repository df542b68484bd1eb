use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Domain boundaries must be 1-based (got start {0})")]
    ZeroStart(usize),
    #[error("Domain start {start} lies after its end {end}")]
    Inverted { start: usize, end: usize },
    #[error("Domain end {end} exceeds sequence length {len}")]
    OutOfBounds { end: usize, len: usize },
}

/// An inclusive, 1-based range of sequence positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Domain {
    start: usize,
    end: usize,
}

impl Domain {
    pub fn new(start: usize, end: usize) -> Result<Self, DomainError> {
        if start == 0 {
            return Err(DomainError::ZeroStart(start));
        }
        if start > end {
            return Err(DomainError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.start..=self.end).contains(&position)
    }

    /// 1-based offset of `position` inside the domain, if it falls inside.
    pub fn relative_position(&self, position: usize) -> Option<usize> {
        self.contains(position).then(|| position - self.start + 1)
    }

    /// Shrinks the domain by `leading` positions at the start and `trailing`
    /// at the end.
    pub fn shrink(&self, leading: usize, trailing: usize) -> Result<Self, DomainError> {
        let start = self.start + leading;
        let end = self
            .end
            .checked_sub(trailing)
            .ok_or(DomainError::Inverted { start, end: 0 })?;
        Self::new(start, end)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// A named one-letter amino-acid sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: String,
    pub residues: String,
}

impl SequenceRecord {
    pub fn new(id: &str, residues: &str) -> Self {
        Self {
            id: id.to_string(),
            residues: residues.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residue at a 1-based position.
    pub fn residue_at(&self, position: usize) -> Option<char> {
        position
            .checked_sub(1)
            .and_then(|i| self.residues.as_bytes().get(i))
            .map(|&b| b as char)
    }

    /// The sub-sequence covered by `domain`, keeping this record's id.
    pub fn slice(&self, domain: Domain) -> Result<SequenceRecord, DomainError> {
        let residues = self
            .residues
            .get(domain.start() - 1..domain.end())
            .ok_or(DomainError::OutOfBounds {
                end: domain.end(),
                len: self.len(),
            })?;
        Ok(SequenceRecord::new(&self.id, residues))
    }

    /// The sequence with `leading` and `trailing` residues removed, or `None`
    /// if nothing would be left.
    pub fn trimmed(&self, leading: usize, trailing: usize) -> Option<SequenceRecord> {
        if leading + trailing >= self.len() {
            return None;
        }
        let residues = self.residues.get(leading..self.len() - trailing)?;
        Some(SequenceRecord::new(&self.id, residues))
    }
}
