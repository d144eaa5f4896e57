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

//! Per-residue coordinates and sequence of a structure.
//!
//! All extractors operate on the same residue set: residues with an alpha or beta
//! carbon, in ascending [`ResidueKey`] order. Residues with neither are left out
//! of both the coordinates and the sequence, so that the `n`-th sequence letter
//! always describes the `n`-th coordinate entry.

use crate::sequence::UNKNOWN_RESIDUE;
use crate::structure::{Residue, ResidueKey, Structure};
use crate::Point;
use std::collections::btree_map::{BTreeMap, Entry};

/// Residues carrying an alpha or beta carbon, ordered by residue key.
///
/// If a key occurs more than once, the first residue read wins.
pub fn scored_residues(structure: &Structure) -> Vec<&Residue> {
    let mut by_key: BTreeMap<ResidueKey, &Residue> = BTreeMap::new();
    for residue in structure.residues() {
        match by_key.entry(*residue.key()) {
            Entry::Vacant(entry) => {
                entry.insert(residue);
            }
            Entry::Occupied(_) => {
                log::debug!("Residue {} occurs more than once", residue.key())
            }
        }
    }

    let (kept, dropped): (Vec<&Residue>, Vec<&Residue>) = by_key
        .into_values()
        .partition(|residue| residue.representative_point().is_some());
    for residue in dropped {
        log::warn!(
            "Residue {} {} has neither CA nor CB and is skipped",
            residue.name(),
            residue.key()
        );
    }
    kept
}

/// One point per residue: beta carbon, or alpha carbon where the beta carbon is missing.
pub fn representative_coordinates(structure: &Structure) -> Vec<Point> {
    scored_residues(structure)
        .into_iter()
        .filter_map(|residue| residue.representative_point().copied())
        .collect()
}

/// One point per residue: alpha carbon, or beta carbon where the alpha carbon is missing.
pub fn alpha_carbon_coordinates(structure: &Structure) -> Vec<Point> {
    scored_residues(structure)
        .into_iter()
        .filter_map(|residue| residue.alpha_carbon().or(residue.beta_carbon()).copied())
        .collect()
}

/// All heavy-atom positions of each residue.
pub fn heavy_atom_coordinates(structure: &Structure) -> Vec<Vec<Point>> {
    scored_residues(structure)
        .into_iter()
        .map(Residue::heavy_atom_positions)
        .collect()
}

/// One-letter sequence of the structure. Non-standard residues appear as `X`.
pub fn atom_sequence(structure: &Structure) -> String {
    scored_residues(structure)
        .into_iter()
        .map(|residue| residue.one_letter_code().unwrap_or(UNKNOWN_RESIDUE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::parse_structure;
    use float_cmp::assert_approx_eq;

    fn atom_line(name: &str, residue: &str, number: i32, insertion: char, x: f64) -> String {
        format!(
            "ATOM      1  {:<3} {} A{:>4}{}   {:>8.3}   0.000   0.000  1.00  0.00",
            name, residue, number, insertion, x
        )
    }

    fn structure() -> Structure {
        let records = [
            atom_line("N", "MET", 1, ' ', 0.0),
            atom_line("CA", "MET", 1, ' ', 1.0),
            atom_line("CB", "MET", 1, ' ', 2.0),
            atom_line("CA", "GLY", 3, ' ', 3.0),
            atom_line("N", "HOH", 4, ' ', 9.0),
            atom_line("CA", "MSE", 2, ' ', 4.0),
            atom_line("CB", "MSE", 2, ' ', 5.0),
            atom_line("H", "MSE", 2, ' ', 6.0),
            atom_line("CA", "ALA", 3, 'A', 7.0),
        ];
        parse_structure(&records, None, 1).unwrap()
    }

    #[test]
    fn sequence_in_key_order() {
        // 1, 2, 3A, 3; residue 4 has no carbon
        assert_eq!(atom_sequence(&structure()), "MXAG");
    }

    #[test]
    fn beta_carbon_preferred() {
        let points = representative_coordinates(&structure());
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        assert_eq!(x, [2.0, 5.0, 7.0, 3.0]);
    }

    #[test]
    fn alpha_carbon_mode() {
        let points = alpha_carbon_coordinates(&structure());
        assert_eq!(points.len(), 4);
        assert_approx_eq!(f64, points[0].x, 1.0);
        assert_approx_eq!(f64, points[1].x, 4.0);
    }

    #[test]
    fn heavy_atoms_skip_hydrogen() {
        let atoms = heavy_atom_coordinates(&structure());
        let counts: Vec<usize> = atoms.iter().map(Vec::len).collect();
        assert_eq!(counts, [3, 2, 1, 1]);
    }

    #[test]
    fn empty_structure() {
        let structure = Structure::default();
        assert!(atom_sequence(&structure).is_empty());
        assert!(representative_coordinates(&structure).is_empty());
    }
}
