//! Readers and writers for the file formats the template search consumes:
//! PDB coordinate files, FASTA sequences and alignments, and the CSV tables of
//! interactions, templates and structure resolutions.

pub mod fasta;
pub mod pdb;
pub mod tables;
pub mod traits;
