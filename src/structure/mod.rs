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

//! Reference structures read from fixed-column coordinate files.
//!
//! A [`Structure`] holds the residues of _one_ selected model and chain together with
//! the surrounding header and trailer text. Residues keep every retained [`AtomRecord`]
//! so that both single-point and all-atom geometry can be derived later.
//!
//! # Examples
//! ~~~
//! use contact_bench::structure::parse_structure;
//! let pdb = "\
//! HEADER    TEST
//! ATOM      1  N   GLY A   1       0.000   0.000   0.000  1.00  0.00
//! ATOM      2  CA  GLY A   1       1.458   0.000   0.000  1.00  0.00
//! ATOM      3  CA  ALA A   2       4.000   0.000   0.000  1.00  0.00
//! TER
//! END
//! ";
//! let structure = parse_structure(pdb.lines(), None, 1).unwrap();
//! assert_eq!(structure.residues().len(), 2);
//! assert_eq!(structure.residues()[0].atoms().len(), 2);
//! assert_eq!(structure.header(), "HEADER    TEST\n");
//! assert_eq!(structure.trailer(), "TER\nEND\n");
//! ~~~

mod reader;
pub mod record;

pub use reader::{parse_structure, read, read_chain};
pub use record::AtomRecord;

use crate::sequence::residue_name_to_letter;
use crate::Point;
use derive_getters::Getters;
use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

/// Ordering key of a residue within a chain.
///
/// Residues order by sequence number. An insertion-coded residue sorts _below_ its
/// base number: `52A` and `52B` come after `51` but before `52`. Multiple insertion
/// codes at the same number order alphabetically, so no two keys collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueKey {
    pub number: i32,
    pub insertion_code: Option<char>,
}

impl ResidueKey {
    pub const fn new(number: i32, insertion_code: Option<char>) -> Self {
        Self {
            number,
            insertion_code,
        }
    }
}

impl Ord for ResidueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number).then_with(|| {
            match (self.insertion_code, other.insertion_code) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            }
        })
    }
}

impl PartialOrd for ResidueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.insertion_code {
            Some(code) => write!(f, "{}{}", self.number, code),
            None => write!(f, "{}", self.number),
        }
    }
}

/// Atoms sharing chain, residue number and insertion code.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Residue {
    /// Three-letter residue name
    name: String,
    chain: char,
    key: ResidueKey,
    atoms: Vec<AtomRecord>,
}

impl Residue {
    /// Open a new residue from its first atom.
    pub fn new(first: AtomRecord) -> Self {
        Self {
            name: first.residue_name().clone(),
            chain: *first.chain(),
            key: ResidueKey::new(*first.residue_number(), *first.insertion_code()),
            atoms: vec![first],
        }
    }

    /// Whether an atom belongs to this residue.
    pub fn contains(&self, atom: &AtomRecord) -> bool {
        *atom.chain() == self.chain
            && *atom.residue_number() == self.key.number
            && *atom.insertion_code() == self.key.insertion_code
    }

    pub(crate) fn push(&mut self, atom: AtomRecord) {
        self.atoms.push(atom);
    }

    /// First atom with the given name. Alternate locations beyond the first are ignored.
    pub fn atom(&self, name: &str) -> Option<&AtomRecord> {
        self.atoms.iter().find(|atom| atom.name() == name)
    }

    pub fn alpha_carbon(&self) -> Option<&Point> {
        self.atom("CA").map(AtomRecord::pos)
    }

    pub fn beta_carbon(&self) -> Option<&Point> {
        self.atom("CB").map(AtomRecord::pos)
    }

    /// Beta carbon if present, else alpha carbon.
    pub fn representative_point(&self) -> Option<&Point> {
        self.beta_carbon().or_else(|| self.alpha_carbon())
    }

    /// Positions of all non-hydrogen atoms.
    pub fn heavy_atom_positions(&self) -> Vec<Point> {
        self.atoms
            .iter()
            .filter(|atom| !atom.is_hydrogen())
            .map(|atom| *atom.pos())
            .collect()
    }

    /// One-letter amino acid code; unrecognised names give `None`.
    pub fn one_letter_code(&self) -> Option<char> {
        residue_name_to_letter(&self.name)
    }
}

/// One model and chain of a structure file.
#[derive(Debug, Clone, Default, PartialEq, Getters)]
pub struct Structure {
    /// Text preceding the first retained coordinate record
    header: String,
    /// Residues in the order they were read
    residues: Vec<Residue>,
    /// Text from the terminating record of the selection onward
    trailer: String,
    /// Selected model number
    model: usize,
    /// Selected chain; `None` means the first chain encountered
    chain: Option<char>,
}

impl Structure {
    pub(crate) fn new(
        header: String,
        residues: Vec<Residue>,
        trailer: String,
        model: usize,
        chain: Option<char>,
    ) -> Self {
        Self {
            header,
            residues,
            trailer,
            model,
            chain,
        }
    }

    /// Read a structure file, optionally gzip-compressed.
    pub fn from_file(
        path: impl AsRef<Path>,
        chain: Option<char>,
        model: usize,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = crate::auxiliary::open_maybe_compressed(path)?;
        read(reader, chain, model)
            .map_err(|e| anyhow::anyhow!("Cannot read structure '{}': {}", path.display(), e))
    }

    /// Number of residues
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Total number of retained atoms
    pub fn num_atoms(&self) -> usize {
        self.residues.iter().map(|r| r.atoms.len()).sum()
    }

    /// Identifier in columns 62-66 of the `HEADER` line, lower-cased; empty if absent.
    pub fn accession(&self) -> String {
        self.header
            .lines()
            .find(|line| line.starts_with("HEADER"))
            .and_then(|line| line.get(62..66))
            .map(|id| id.trim().to_lowercase())
            .unwrap_or_default()
    }

    /// Write header, residues and trailer back out.
    pub fn write(&self, output: &mut impl Write) -> std::io::Result<()> {
        output.write_all(self.header.as_bytes())?;
        for atom in self.residues.iter().flat_map(|r| r.atoms.iter()) {
            writeln!(output, "{}", atom)?;
        }
        output.write_all(self.trailer.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str, residue_name: &str, number: i32, insertion: char) -> AtomRecord {
        let line = format!(
            "ATOM      1  {:<3} {:>3} A{:>4}{}      0.000   0.000   0.000  1.00  0.00",
            name, residue_name, number, insertion
        );
        AtomRecord::from_line(&line).unwrap()
    }

    #[test]
    fn insertion_codes_sort_below_base_number() {
        let mut keys = vec![
            ResidueKey::new(52, None),
            ResidueKey::new(52, Some('B')),
            ResidueKey::new(53, None),
            ResidueKey::new(51, None),
            ResidueKey::new(52, Some('A')),
        ];
        keys.sort();
        let labels: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["51", "52A", "52B", "52", "53"]);
    }

    #[test]
    fn representative_prefers_beta_carbon() {
        let mut residue = Residue::new(atom("N", "ALA", 4, ' '));
        assert!(residue.representative_point().is_none());
        residue.push(atom("CA", "ALA", 4, ' '));
        assert_eq!(residue.representative_point(), residue.alpha_carbon());
        residue.push(atom("CB", "ALA", 4, ' '));
        assert_eq!(residue.representative_point(), residue.beta_carbon());
        assert_eq!(residue.one_letter_code(), Some('A'));
        assert_eq!(residue.heavy_atom_positions().len(), 3);
    }

    #[test]
    fn residue_membership_uses_insertion_code() {
        let residue = Residue::new(atom("CA", "GLY", 7, ' '));
        assert!(residue.contains(&atom("C", "GLY", 7, ' ')));
        assert!(!residue.contains(&atom("CA", "GLY", 7, 'A')));
        assert!(!residue.contains(&atom("CA", "GLY", 8, ' ')));
    }

    #[test]
    fn accession_from_header() {
        let header = format!("{:<62}1ABC\n", "HEADER    HYDROLASE");
        let structure = Structure::new(header, vec![], String::new(), 1, None);
        assert_eq!(structure.accession(), "1abc");
        assert_eq!(Structure::default().accession(), "");
    }
}
