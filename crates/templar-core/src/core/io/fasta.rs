use crate::core::alignment::{AlignedRow, Alignment, AlignmentError};
use crate::core::sequence::SequenceRecord;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const LINE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Sequence data on line {0} appears before any '>' header")]
    MissingHeader(usize),
    #[error("Header on line {0} has no identifier")]
    EmptyIdentifier(usize),
    #[error("Invalid alignment: {0}")]
    Alignment(#[from] AlignmentError),
}

/// Reads every record of a FASTA stream. The record id is the first
/// whitespace-delimited word of the header.
pub fn read_records(reader: impl BufRead) -> Result<Vec<SequenceRecord>, FastaError> {
    let mut records = Vec::new();
    let mut current: Option<SequenceRecord> = None;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let id = header
                .split_whitespace()
                .next()
                .ok_or(FastaError::EmptyIdentifier(line_num + 1))?;
            records.extend(current.replace(SequenceRecord::new(id, "")));
        } else {
            let record = current
                .as_mut()
                .ok_or(FastaError::MissingHeader(line_num + 1))?;
            record
                .residues
                .extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }
    records.extend(current);
    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, FastaError> {
    let file = File::open(path)?;
    read_records(BufReader::new(file))
}

/// Reads a two-record aligned FASTA stream as a pairwise alignment.
pub fn read_alignment(reader: impl BufRead) -> Result<Alignment, FastaError> {
    let rows = read_records(reader)?
        .into_iter()
        .map(|record| AlignedRow::new(&record.id, &record.residues))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Alignment::from_rows(rows)?)
}

pub fn read_alignment_from_path<P: AsRef<Path>>(path: P) -> Result<Alignment, FastaError> {
    let file = File::open(path)?;
    read_alignment(BufReader::new(file))
}

pub fn write_records(writer: &mut impl Write, records: &[SequenceRecord]) -> Result<(), FastaError> {
    for record in records {
        writeln!(writer, ">{}", record.id)?;
        for chunk in record.residues.as_bytes().chunks(LINE_WIDTH) {
            writer.write_all(chunk)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

pub fn write_records_to_path<P: AsRef<Path>>(path: P, records: &[SequenceRecord]) -> Result<(), FastaError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Writes an alignment as aligned FASTA.
pub fn write_alignment(writer: &mut impl Write, alignment: &Alignment) -> Result<(), FastaError> {
    let records: Vec<SequenceRecord> = alignment
        .rows()
        .iter()
        .map(|row| SequenceRecord::new(&row.id, row.residues()))
        .collect();
    write_records(writer, &records)
}
