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

//! Amino acid sequences: residue name lookup and query sequence input.

use crate::Result;
use std::io::BufRead;
use std::path::Path;

/// Placeholder for residues outside the standard twenty.
pub const UNKNOWN_RESIDUE: char = 'X';

/// Convert a three-letter amino acid name to its one-letter code.
/// Only the twenty standard amino acids and `UNK` are recognised.
pub fn residue_name_to_letter(name: &str) -> Option<char> {
    let letter = match name.to_uppercase().as_str() {
        "ALA" => 'A',
        "ARG" => 'R',
        "LYS" => 'K',
        "ASP" => 'D',
        "GLU" => 'E',
        "GLN" => 'Q',
        "ASN" => 'N',
        "HIS" => 'H',
        "TRP" => 'W',
        "PHE" => 'F',
        "TYR" => 'Y',
        "THR" => 'T',
        "SER" => 'S',
        "GLY" => 'G',
        "PRO" => 'P',
        "CYS" => 'C',
        "MET" => 'M',
        "VAL" => 'V',
        "LEU" => 'L',
        "ILE" => 'I',
        "UNK" => UNKNOWN_RESIDUE,
        _ => return None,
    };
    Some(letter)
}

/// Read the first sequence of a FASTA stream, or a bare sequence without header.
///
/// Sequence lines are concatenated with whitespace removed; reading stops at the
/// second header line. An input without sequence characters gives an empty string.
pub fn read_query_sequence(reader: impl BufRead) -> Result<String> {
    let mut sequence = String::new();
    let mut seen_header = false;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.starts_with('>') {
            if seen_header || !sequence.is_empty() {
                break;
            }
            seen_header = true;
            continue;
        }
        sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
    }
    Ok(sequence)
}

/// Read the query sequence from a (possibly gzip-compressed) file.
pub fn query_sequence_from_file(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    let reader = crate::auxiliary::open_maybe_compressed(path)?;
    let sequence = read_query_sequence(reader)?;
    if sequence.is_empty() {
        anyhow::bail!("No sequence found in '{}'", path.display());
    }
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_residues() {
        assert_eq!(residue_name_to_letter("ALA"), Some('A'));
        assert_eq!(residue_name_to_letter("trp"), Some('W'));
        assert_eq!(residue_name_to_letter("UNK"), Some('X'));
        assert_eq!(residue_name_to_letter("HOH"), None);
        assert_eq!(residue_name_to_letter("MSE"), None);
    }

    #[test]
    fn first_fasta_record() {
        let fasta = ">query description\nMKV\nLLA\n>second\nGGGG\n";
        let sequence = read_query_sequence(fasta.as_bytes()).unwrap();
        assert_eq!(sequence, "MKVLLA");
    }

    #[test]
    fn bare_sequence() {
        let sequence = read_query_sequence("MKV LLA\nGG\n".as_bytes()).unwrap();
        assert_eq!(sequence, "MKVLLAGG");
    }

    #[test]
    fn empty_input() {
        assert!(read_query_sequence("".as_bytes()).unwrap().is_empty());
        assert!(read_query_sequence(">only header\n".as_bytes())
            .unwrap()
            .is_empty());
    }
}
