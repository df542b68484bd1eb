use super::traits::StructureFile;
use crate::core::models::atom::Atom;
use crate::core::models::residue::ResidueKey;
use crate::core::models::structure::{ResidueId, StructureModel};
use nalgebra::Point3;
use std::collections::HashSet;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must reach column 54)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> Option<char> {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader for fixed-column PDB coordinate files.
///
/// Only the first `MODEL` is read. Alternate locations other than blank or
/// `A` are skipped, so each atom appears once.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(structure_id: &str, reader: &mut impl BufRead) -> Result<StructureModel, Self::Error> {
        let mut model = StructureModel::new(structure_id);
        let mut seen_serials = HashSet::new();
        let mut current: Option<(char, ResidueKey, ResidueId)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ENDMDL" => break,
                "ATOM" | "HETATM" => {}
                _ => continue,
            }

            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let alt_loc = column_char(&line, 16);
            if !matches!(alt_loc, None | Some('A')) {
                continue;
            }

            let serial_str = slice_and_trim(&line, 6, 11);
            let name_str = slice_and_trim(&line, 12, 16);
            let res_name_str = slice_and_trim(&line, 17, 20);
            let chain_id = column_char(&line, 21).unwrap_or(' ');
            let res_seq_str = slice_and_trim(&line, 22, 26);
            let insertion_code = column_char(&line, 26);
            let element_str = slice_and_trim(&line, 76, 78);

            if name_str.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField {
                        columns: "13-16".into(),
                    },
                });
            }
            if res_name_str.is_empty() {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::MissingRequiredField {
                        columns: "18-20".into(),
                    },
                });
            }
            let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "7-11".into(),
                    value: serial_str.into(),
                },
            })?;
            if !seen_serials.insert(serial) {
                return Err(PdbError::Inconsistency(format!(
                    "Duplicate atom serial: {}",
                    serial
                )));
            }
            let number: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let x = parse_float(&line, line_num, 30, 38)?;
            let y = parse_float(&line, line_num, 38, 46)?;
            let z = parse_float(&line, line_num, 46, 54)?;

            let key = ResidueKey {
                hetero: record_type == "HETATM",
                number,
                insertion_code,
            };
            let residue_id = match current {
                Some((chain, current_key, id)) if chain == chain_id && current_key == key => id,
                _ => {
                    let chain = model.add_chain(chain_id);
                    let id = model.add_residue(chain, key, res_name_str).ok_or_else(|| {
                        PdbError::Inconsistency(format!("Chain '{}' vanished while reading", chain_id))
                    })?;
                    current = Some((chain_id, key, id));
                    id
                }
            };

            let atom = Atom::new(serial, name_str, residue_id, Point3::new(x, y, z))
                .with_element(element_str);
            model.add_atom_to_residue(residue_id, atom).ok_or_else(|| {
                PdbError::Inconsistency(format!("Residue for atom {} vanished while reading", serial))
            })?;
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::numbering::{ChainNumbering, chain_sequence};
    use std::io::{BufReader, Cursor, Write};
    use tempfile::NamedTempFile;

    fn atom_line(
        record: &str,
        serial: usize,
        name: &str,
        alt_loc: char,
        res_name: &str,
        chain: char,
        number: isize,
        insertion: char,
        position: (f64, f64, f64),
    ) -> String {
        format!(
            "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
            record,
            serial,
            name,
            alt_loc,
            res_name,
            chain,
            number,
            insertion,
            position.0,
            position.1,
            position.2,
            1.0,
            20.0,
            &name[..1]
        )
    }

    fn read(content: &str) -> Result<StructureModel, PdbError> {
        let mut reader = BufReader::new(Cursor::new(content.to_string()));
        PdbFile::read_from("1TST", &mut reader)
    }

    mod parsing {
        use super::*;

        #[test]
        fn reads_chains_residues_and_atoms() {
            let content = [
                "HEADER    TEST".to_string(),
                atom_line("ATOM", 1, "N", ' ', "MET", 'A', 1, ' ', (0.0, 0.0, 0.0)),
                atom_line("ATOM", 2, "CA", ' ', "MET", 'A', 1, ' ', (1.458, 0.0, 0.0)),
                atom_line("ATOM", 3, "CA", ' ', "LYS", 'A', 2, ' ', (3.8, 0.0, 0.0)),
                atom_line("ATOM", 4, "CA", ' ', "GLY", 'B', 10, ' ', (-1.0, 2.5, 3.25)),
                "TER".to_string(),
                atom_line("HETATM", 5, "O", ' ', "HOH", 'B', 101, ' ', (9.0, 9.0, 9.0)),
                "END".to_string(),
            ]
            .join("\n");
            let model = read(&content).unwrap();

            assert_eq!(model.id(), "1TST");
            assert_eq!(model.atom_count(), 5);
            let letters: Vec<char> = model.chains_iter().map(|(_, c)| c.id).collect();
            assert_eq!(letters, vec!['A', 'B']);

            let chain_b = model.find_chain_by_id('B').unwrap();
            let gly = model.find_residue_by_number(chain_b, 10).unwrap();
            let atom = model.residue_atoms(gly).next().unwrap();
            assert_eq!(atom.position, Point3::new(-1.0, 2.5, 3.25));
            assert_eq!(atom.element.as_deref(), Some("C"));
            assert_eq!(model.chain_residues(chain_b).count(), 2);

            let chain_a = model.find_chain_by_id('A').unwrap();
            assert_eq!(chain_sequence(&model, chain_a).unwrap().residues, "MK");
            assert_eq!(ChainNumbering::from_chain(&model, chain_b).unwrap().numbers(), &[10]);
        }

        #[test]
        fn only_the_first_model_is_read() {
            let content = [
                "MODEL        1".to_string(),
                atom_line("ATOM", 1, "CA", ' ', "MET", 'A', 1, ' ', (0.0, 0.0, 0.0)),
                "ENDMDL".to_string(),
                "MODEL        2".to_string(),
                atom_line("ATOM", 2, "CA", ' ', "LYS", 'A', 2, ' ', (0.0, 0.0, 0.0)),
                "ENDMDL".to_string(),
            ]
            .join("\n");
            let model = read(&content).unwrap();
            assert_eq!(model.atom_count(), 1);
        }

        #[test]
        fn alternate_locations_other_than_a_are_skipped() {
            let content = [
                atom_line("ATOM", 1, "CA", 'A', "SER", 'A', 5, ' ', (0.0, 0.0, 0.0)),
                atom_line("ATOM", 2, "CA", 'B', "SER", 'A', 5, ' ', (0.5, 0.0, 0.0)),
            ]
            .join("\n");
            let model = read(&content).unwrap();
            assert_eq!(model.atom_count(), 1);
        }

        #[test]
        fn insertion_codes_create_distinct_residues() {
            let content = [
                atom_line("ATOM", 1, "CA", ' ', "SER", 'A', 5, ' ', (0.0, 0.0, 0.0)),
                atom_line("ATOM", 2, "CA", ' ', "THR", 'A', 5, 'A', (3.8, 0.0, 0.0)),
                atom_line("ATOM", 3, "CA", ' ', "VAL", 'A', 6, ' ', (7.6, 0.0, 0.0)),
            ]
            .join("\n");
            let model = read(&content).unwrap();
            let chain = model.find_chain_by_id('A').unwrap();
            assert_eq!(model.chain_residues(chain).count(), 3);
            assert_eq!(chain_sequence(&model, chain).unwrap().residues, "SV");
        }

        #[test]
        fn reads_from_path() {
            let mut file = NamedTempFile::new().unwrap();
            writeln!(
                file,
                "{}",
                atom_line("ATOM", 1, "CA", ' ', "TRP", 'C', 3, ' ', (1.0, 1.0, 1.0))
            )
            .unwrap();
            let model = PdbFile::read_from_path("2ABC", file.path()).unwrap();
            assert_eq!(model.id(), "2ABC");
            assert!(model.find_chain_by_id('C').is_some());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn short_atom_line_is_rejected() {
            let err = read("ATOM      1  CA  MET A   1").unwrap_err();
            assert!(matches!(
                err,
                PdbError::Parse {
                    line: 1,
                    kind: PdbParseErrorKind::LineTooShort
                }
            ));
        }

        #[test]
        fn invalid_coordinate_reports_columns() {
            let line = atom_line("ATOM", 1, "CA", ' ', "MET", 'A', 1, ' ', (0.0, 0.0, 0.0));
            let broken = format!("{}  abc.def{}", &line[..30], &line[39..]);
            let err = read(&broken).unwrap_err();
            match err {
                PdbError::Parse {
                    kind: PdbParseErrorKind::InvalidFloat { columns, .. },
                    ..
                } => assert_eq!(columns, "31-38"),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn duplicate_serials_are_inconsistent() {
            let content = [
                atom_line("ATOM", 7, "CA", ' ', "MET", 'A', 1, ' ', (0.0, 0.0, 0.0)),
                atom_line("ATOM", 7, "CB", ' ', "MET", 'A', 1, ' ', (1.0, 0.0, 0.0)),
            ]
            .join("\n");
            assert!(matches!(read(&content), Err(PdbError::Inconsistency(_))));
        }
    }
}
