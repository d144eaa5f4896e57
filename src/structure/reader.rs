// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Single-pass, model and chain aware structure reader.

use super::record::{AtomRecord, COORDINATE_TAG};
use super::{Residue, Structure};
use crate::{ContactError, Result};
use std::io::BufRead;

/// Classification of a structure file line by its leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    ModelStart,
    ModelEnd,
    ChainEnd,
    Coordinate,
    Other,
}

impl LineKind {
    fn of(line: &str) -> Self {
        if line.starts_with("MODEL") {
            Self::ModelStart
        } else if line.starts_with("ENDMDL") {
            Self::ModelEnd
        } else if line.starts_with("TER") {
            Self::ChainEnd
        } else if line.starts_with(COORDINATE_TAG) {
            Self::Coordinate
        } else {
            Self::Other
        }
    }
}

/// Where the reader currently is with respect to `MODEL`/`ENDMDL` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelBlock {
    Outside,
    Selected,
    Skipped,
}

/// Accumulates the selected model and chain, one line at a time.
#[derive(Debug)]
struct SelectionReader {
    chain: Option<char>,
    model: usize,
    header: String,
    residues: Vec<Residue>,
    /// Non-coordinate lines after the latest retained atom
    pending: String,
    trailer: String,
    /// True once any `MODEL` record has been seen
    has_models: bool,
    block: ModelBlock,
    /// True once the selected chain or model has been terminated
    closed: bool,
    /// Chain of the most recent coordinate record in a readable block
    last_chain: Option<char>,
    /// Chain of the first retained record when no chain was requested
    first_chain: Option<char>,
}

impl SelectionReader {
    fn new(chain: Option<char>, model: usize) -> Self {
        Self {
            chain,
            model,
            header: String::new(),
            residues: Vec::new(),
            pending: String::new(),
            trailer: String::new(),
            has_models: false,
            block: ModelBlock::Outside,
            closed: false,
            last_chain: None,
            first_chain: None,
        }
    }

    /// Without a chain filter the first chain read is the only one accepted.
    fn accepts_chain(&self, chain: char) -> bool {
        self.chain
            .or(self.first_chain)
            .map_or(true, |wanted| wanted == chain)
    }

    /// Coordinate records are readable outside model blocks only if the file has no models.
    fn in_readable_block(&self) -> bool {
        match self.block {
            ModelBlock::Selected => true,
            ModelBlock::Skipped => false,
            ModelBlock::Outside => !self.has_models,
        }
    }

    fn push_text(&mut self, line: &str) {
        let target = if self.closed {
            &mut self.trailer
        } else if self.residues.is_empty() {
            &mut self.header
        } else {
            &mut self.pending
        };
        target.push_str(line);
        target.push('\n');
    }

    fn feed(&mut self, line_number: usize, line: &str) -> Result<()> {
        match LineKind::of(line) {
            LineKind::ModelStart => {
                self.has_models = true;
                let serial = model_serial(line).map_err(|e| e.at_line(line_number))?;
                if serial == self.model && !self.closed {
                    log::debug!("Reading model {} from line {}", serial, line_number);
                    self.block = ModelBlock::Selected;
                    self.push_text(line);
                } else {
                    self.block = ModelBlock::Skipped;
                }
            }
            LineKind::ModelEnd => {
                if self.block == ModelBlock::Selected {
                    self.close();
                    self.push_text(line);
                }
                self.block = ModelBlock::Outside;
            }
            LineKind::ChainEnd => {
                if !self.in_readable_block() {
                    return Ok(());
                }
                let terminates_selection = self
                    .last_chain
                    .is_some_and(|chain| self.accepts_chain(chain));
                if terminates_selection && !self.residues.is_empty() {
                    self.close();
                    self.push_text(line);
                }
            }
            LineKind::Coordinate => {
                if !self.in_readable_block() {
                    return Ok(());
                }
                let atom = AtomRecord::from_line(line).map_err(|e| e.at_line(line_number))?;
                self.last_chain = Some(*atom.chain());
                if self.closed || !self.accepts_chain(*atom.chain()) {
                    return Ok(());
                }
                if self.chain.is_none() && self.first_chain.is_none() {
                    self.first_chain = Some(*atom.chain());
                }
                // text interleaved with the selection (e.g. ANISOU) is not kept
                self.pending.clear();
                self.append_atom(atom);
            }
            LineKind::Other => {
                if self.block != ModelBlock::Skipped {
                    self.push_text(line);
                }
            }
        }
        Ok(())
    }

    /// Consecutive records with the same residue key extend the current residue.
    fn append_atom(&mut self, atom: AtomRecord) {
        match self.residues.last_mut() {
            Some(residue) if residue.contains(&atom) => residue.push(atom),
            _ => self.residues.push(Residue::new(atom)),
        }
    }

    /// Terminate the selection; later text belongs to the trailer.
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.pending.clear();
        }
    }

    fn finish(mut self) -> Structure {
        if !self.closed {
            self.trailer = std::mem::take(&mut self.pending);
        }
        if !self.has_models && self.model != 1 {
            log::debug!(
                "No MODEL records; model {} refers to the implicit single model",
                self.model
            );
        }
        if self.residues.is_empty() {
            log::warn!(
                "No residues selected for chain {:?} in model {}",
                self.chain,
                self.model
            );
        } else {
            log::debug!(
                "Read {} residues from chain '{}'",
                self.residues.len(),
                self.residues[0].chain()
            );
        }
        Structure::new(
            self.header,
            self.residues,
            self.trailer,
            self.model,
            self.chain,
        )
    }
}

/// Model number from the last field of a `MODEL` record.
fn model_serial(line: &str) -> Result<usize> {
    let field = line.split_whitespace().last().unwrap_or_default();
    field.parse().map_err(|_| ContactError::MalformedRecord {
        line: 0,
        field: "model serial",
        value: field.to_string(),
    })
}

/// Read one model and chain from a structure stream.
///
/// - `chain`: retain only this chain. `None` retains the first chain encountered.
/// - `model`: 1-based model number. Ignored if the file has no `MODEL` records.
///
/// A chain or model that never appears gives an empty structure, not an error.
/// A malformed coordinate record is an error and no structure is returned.
pub fn read(reader: impl BufRead, chain: Option<char>, model: usize) -> Result<Structure> {
    let mut selection = SelectionReader::new(chain, model);
    for (i, line) in reader.lines().enumerate() {
        selection.feed(i + 1, &line?)?;
    }
    Ok(selection.finish())
}

/// Same as [`read`], but for lines already in memory.
pub fn parse_structure<I, S>(lines: I, chain: Option<char>, model: usize) -> Result<Structure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selection = SelectionReader::new(chain, model);
    for (i, line) in lines.into_iter().enumerate() {
        selection.feed(i + 1, line.as_ref())?;
    }
    Ok(selection.finish())
}

/// Read every coordinate record of `chain`, ignoring model and terminator records.
///
/// Intended for single-model files. Non-coordinate lines before the first retained
/// record form the header; all later non-coordinate lines form the trailer.
pub fn read_chain(reader: impl BufRead, chain: char) -> Result<Structure> {
    let mut header = String::new();
    let mut trailer = String::new();
    let mut residues: Vec<Residue> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if LineKind::of(&line) != LineKind::Coordinate {
            let target = if residues.is_empty() {
                &mut header
            } else {
                &mut trailer
            };
            target.push_str(&line);
            target.push('\n');
            continue;
        }
        let atom = AtomRecord::from_line(&line).map_err(|e| e.at_line(i + 1))?;
        if *atom.chain() != chain {
            continue;
        }
        match residues.last_mut() {
            Some(residue) if residue.contains(&atom) => residue.push(atom),
            _ => residues.push(Residue::new(atom)),
        }
    }
    Ok(Structure::new(header, residues, trailer, 1, Some(chain)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Coordinate record with the given atom name, chain and residue.
    fn atom_line(name: &str, chain: char, number: i32, insertion: char) -> String {
        format!(
            "ATOM      1  {:<3} ALA {}{:>4}{}      1.000   2.000   3.000  1.00  0.00",
            name, chain, number, insertion
        )
    }

    fn lines(records: &[String]) -> Vec<&str> {
        records.iter().map(String::as_str).collect()
    }

    #[test]
    fn groups_consecutive_residues() {
        let records = vec![
            "HEADER    TEST".to_string(),
            atom_line("N", 'A', 1, ' '),
            atom_line("CA", 'A', 1, ' '),
            atom_line("CA", 'A', 2, ' '),
            atom_line("CA", 'A', 2, 'A'),
            atom_line("CB", 'A', 2, 'A'),
            "TER".to_string(),
            "END".to_string(),
        ];
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(structure.len(), 3);
        assert_eq!(structure.num_atoms(), 5);
        assert_eq!(structure.residues()[2].key().insertion_code, Some('A'));
        assert_eq!(structure.header(), "HEADER    TEST\n");
        assert_eq!(structure.trailer(), "TER\nEND\n");
    }

    #[test]
    fn chain_filter_is_exclusive() {
        let records = vec![
            atom_line("CA", 'A', 1, ' '),
            atom_line("CA", 'A', 2, ' '),
            "TER".to_string(),
            atom_line("CA", 'B', 1, ' '),
            atom_line("CA", 'B', 2, ' '),
            atom_line("CA", 'B', 3, ' '),
            "TER".to_string(),
            "END".to_string(),
        ];
        let structure = parse_structure(lines(&records), Some('B'), 1).unwrap();
        assert_eq!(structure.len(), 3);
        assert!(structure.residues().iter().all(|r| *r.chain() == 'B'));
        assert_eq!(structure.trailer(), "TER\nEND\n");
        assert!(structure.header().is_empty());
    }

    #[test]
    fn first_chain_without_filter() {
        let records = vec![
            atom_line("CA", 'A', 1, ' '),
            "TER".to_string(),
            atom_line("CA", 'B', 1, ' '),
            atom_line("CA", 'B', 2, ' '),
            "TER".to_string(),
        ];
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(structure.len(), 1);
        assert_eq!(*structure.residues()[0].chain(), 'A');
    }

    #[test]
    fn first_chain_without_terminator() {
        let records: Vec<String> = (1..=3)
            .map(|i| atom_line("CA", 'A', i, ' '))
            .chain((1..=5).map(|i| atom_line("CA", 'B', i, ' ')))
            .chain(["END".to_string()])
            .collect();
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(structure.len(), 3);
        assert!(structure.residues().iter().all(|r| *r.chain() == 'A'));
        assert_eq!(crate::atom_sequence(&structure), "AAA");

        let chain_b = parse_structure(lines(&records), Some('B'), 1).unwrap();
        assert_eq!(chain_b.len(), 5);
    }

    #[test]
    fn missing_chain_gives_empty_structure() {
        let records = vec![atom_line("CA", 'A', 1, ' '), "TER".to_string()];
        let structure = parse_structure(lines(&records), Some('X'), 1).unwrap();
        assert!(structure.is_empty());
    }

    #[test]
    fn selects_requested_model() {
        let records = vec![
            "MODEL        1".to_string(),
            atom_line("CA", 'A', 1, ' '),
            atom_line("CA", 'A', 2, ' '),
            "TER".to_string(),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom_line("CA", 'A', 10, ' '),
            atom_line("CA", 'A', 11, ' '),
            atom_line("CA", 'A', 12, ' '),
            "TER".to_string(),
            "ENDMDL".to_string(),
            "END".to_string(),
        ];
        let first = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.header(), "MODEL        1\n");
        assert_eq!(first.trailer(), "TER\nENDMDL\nEND\n");

        let second = parse_structure(lines(&records), Some('A'), 2).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second.residues()[0].key().number, 10);
        assert_eq!(*second.model(), 2);

        assert!(parse_structure(lines(&records), None, 3).unwrap().is_empty());
    }

    #[test]
    fn implicit_model_without_markers() {
        let records = vec![atom_line("CA", 'A', 1, ' '), atom_line("CA", 'A', 2, ' ')];
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(structure.len(), 2);
        assert!(structure.trailer().is_empty());
    }

    #[test]
    fn interleaved_text_is_dropped() {
        let records = vec![
            atom_line("CA", 'A', 1, ' '),
            "ANISOU    1  CA  ALA A   1     1234   1234   1234      0      0      0".to_string(),
            atom_line("CA", 'A', 2, ' '),
            "CONECT    1    2".to_string(),
            "END".to_string(),
        ];
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        assert_eq!(structure.len(), 2);
        assert_eq!(structure.trailer(), "CONECT    1    2\nEND\n");
    }

    #[test]
    fn malformed_record_reports_line() {
        let records = vec![
            "HEADER".to_string(),
            atom_line("CA", 'A', 1, ' '),
            atom_line("CA", 'A', 2, ' ').replace("2.000", "x.xxx"),
        ];
        let err = parse_structure(lines(&records), None, 1).unwrap_err();
        assert!(matches!(
            err,
            ContactError::MalformedRecord { line: 3, field: "y", .. }
        ));
    }

    #[test]
    fn read_chain_ignores_terminators() {
        let records = vec![
            "HEADER".to_string(),
            atom_line("CA", 'A', 1, ' '),
            "TER".to_string(),
            atom_line("CA", 'B', 1, ' '),
            atom_line("CA", 'A', 2, ' '),
            "END".to_string(),
        ];
        let text = records.join("\n");
        let structure = read_chain(text.as_bytes(), 'A').unwrap();
        assert_eq!(structure.len(), 2);
        assert_eq!(structure.header(), "HEADER\n");
        assert_eq!(structure.trailer(), "TER\nEND\n");
    }

    #[test]
    fn written_structure_reads_back() {
        let records = vec![
            "HEADER    TEST".to_string(),
            atom_line("N", 'A', 1, ' '),
            atom_line("CA", 'A', 1, ' '),
            atom_line("CA", 'A', 2, ' '),
            "TER".to_string(),
        ];
        let structure = parse_structure(lines(&records), None, 1).unwrap();
        let mut buffer = Vec::new();
        structure.write(&mut buffer).unwrap();
        let reread = read(buffer.as_slice(), None, 1).unwrap();
        assert_eq!(reread, structure);
    }
}
