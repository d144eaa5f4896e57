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

//! Ranked lists of predicted contacts.

use crate::Result;
use derive_getters::Getters;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// Predicted contact between two residues, with 1-based query positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedContact {
    /// Confidence; higher is more likely
    pub score: f64,
    pub i: usize,
    pub j: usize,
}

impl PredictedContact {
    pub const fn new(score: f64, i: usize, j: usize) -> Self {
        Self { score, i, j }
    }

    /// Sequence separation `|i - j|`
    pub const fn separation(&self) -> usize {
        self.i.abs_diff(self.j)
    }
}

/// Guess the field separator from a sample line: comma, then space, then tab.
fn detect_separator(line: &str) -> char {
    if line.contains(',') {
        ','
    } else if line.contains(' ') {
        ' '
    } else {
        '\t'
    }
}

/// Parse one line as `i <sep> j [<sep> ...] <sep> score`.
fn parse_line(line: &str, separator: char) -> Option<PredictedContact> {
    let fields: Vec<&str> = line
        .split(separator)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() < 3 {
        return None;
    }
    let i = fields[0].parse().ok()?;
    let j = fields[1].parse().ok()?;
    let score = fields[fields.len() - 1].parse().ok()?;
    Some(PredictedContact::new(score, i, j))
}

/// Read a contact list and rank it by descending score.
///
/// The separator is detected from the first non-empty line. Lines that do not
/// hold two integer positions and a numeric score, such as headers, are skipped.
/// Contacts with equal scores keep their file order.
pub fn read_contacts(reader: impl BufRead) -> Result<Vec<PredictedContact>> {
    let mut separator = None;
    let mut contacts = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let separator = *separator.get_or_insert_with(|| detect_separator(line.trim()));
        match parse_line(&line, separator) {
            Some(contact) => contacts.push(contact),
            None => log::debug!("Skipping contact line {}: '{}'", n + 1, line.trim()),
        }
    }
    contacts.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(contacts)
}

/// Read a ranked contact list from a (possibly gzip-compressed) file.
pub fn contacts_from_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<PredictedContact>> {
    let path = path.as_ref();
    let contacts = read_contacts(crate::auxiliary::open_maybe_compressed(path)?)?;
    log::debug!("Read {} contacts from '{}'", contacts.len(), path.display());
    Ok(contacts)
}

/// Summary of the predicted contact-score map.
///
/// The map is dense and symmetric with side `L`, the largest position in the
/// list; pairs not listed score zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Getters)]
pub struct ContactStats {
    /// Map entries scoring above the threshold (both triangles)
    num_contacts: usize,
    /// `num_contacts / L²`
    normalized: f64,
    /// Largest entry of the map
    max_score: f64,
}

impl ContactStats {
    /// Count map entries above `threshold`.
    ///
    /// For log-likelihood style scores a threshold of zero separates contacts
    /// more likely true than false.
    pub fn new(contacts: &[PredictedContact], threshold: f64) -> Self {
        let size = contacts
            .iter()
            .map(|c| c.i.max(c.j))
            .max()
            .unwrap_or(0);
        if size == 0 {
            return Self {
                num_contacts: 0,
                normalized: 0.0,
                max_score: 0.0,
            };
        }
        let mut map = Array2::<f64>::zeros((size, size));
        for contact in contacts.iter().filter(|c| c.i > 0 && c.j > 0) {
            map[[contact.i - 1, contact.j - 1]] = contact.score;
            map[[contact.j - 1, contact.i - 1]] = contact.score;
        }
        let num_contacts = map.iter().filter(|&&s| s > threshold).count();
        Self {
            num_contacts,
            normalized: num_contacts as f64 / (size * size) as f64,
            max_score: map.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
