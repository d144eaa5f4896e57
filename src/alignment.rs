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

//! Pairwise alignment of the structure sequence against the query sequence.
//!
//! Scoring only needs two equal-length gapped strings. Anything able to produce
//! them can be plugged in through [`SequenceAligner`]; [`GlobalAligner`] is the
//! default, a global alignment with affine gap penalties (Gotoh).

use crate::{ContactError, Result};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Gap symbol in aligned sequences.
pub const GAP: char = '-';

/// Two gapped sequences of equal length.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Alignment {
    /// Structure-derived sequence with gaps
    structure: String,
    /// Query sequence with gaps
    query: String,
}

impl Alignment {
    /// Pair two gapped sequences; they must have the same number of columns.
    pub fn new(structure: impl Into<String>, query: impl Into<String>) -> Result<Self> {
        let (structure, query) = (structure.into(), query.into());
        let (n, m) = (structure.chars().count(), query.chars().count());
        if n != m {
            return Err(ContactError::UnequalAlignment {
                structure: n,
                query: m,
            });
        }
        Ok(Self { structure, query })
    }

    /// Number of alignment columns
    pub fn len(&self) -> usize {
        self.structure.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// Iterate over `(structure, query)` symbol pairs.
    pub fn columns(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.structure.chars().zip(self.query.chars())
    }

    /// Number of columns where both sides hold a residue.
    pub fn num_aligned(&self) -> usize {
        self.columns()
            .filter(|&(s, q)| s != GAP && q != GAP)
            .count()
    }

    /// Fraction of query residues aligned to an identical structure residue.
    pub fn query_identity(&self) -> f64 {
        let query_length = self.query.chars().filter(|&c| c != GAP).count();
        if query_length == 0 {
            return 0.0;
        }
        let identical = self
            .columns()
            .filter(|&(s, q)| s != GAP && s.eq_ignore_ascii_case(&q))
            .count();
        identical as f64 / query_length as f64
    }
}

/// Produces a global alignment of a structure sequence and a query sequence.
pub trait SequenceAligner {
    fn align(&self, structure: &str, query: &str) -> Result<Alignment>;
}

/// Substitution and affine gap scores.
///
/// A gap of length `n` scores `gap_open + (n - 1) * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentScoring {
    #[serde(rename = "match")]
    pub match_score: f64,
    #[serde(rename = "mismatch")]
    pub mismatch_score: f64,
    pub gap_open: f64,
    pub gap_extend: f64,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 2.0,
            mismatch_score: -1.0,
            gap_open: -0.5,
            gap_extend: -0.1,
        }
    }
}

impl AlignmentScoring {
    fn substitution(&self, a: char, b: char) -> f64 {
        if a.eq_ignore_ascii_case(&b) {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// Global alignment with affine gap penalties; end gaps are penalised.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalAligner {
    pub scoring: AlignmentScoring,
}

impl GlobalAligner {
    pub const fn new(scoring: AlignmentScoring) -> Self {
        Self { scoring }
    }
}

impl SequenceAligner for GlobalAligner {
    fn align(&self, structure: &str, query: &str) -> Result<Alignment> {
        let s: Vec<char> = structure.chars().collect();
        let q: Vec<char> = query.chars().collect();
        let (m, n) = (s.len(), q.len());

        if m == 0 || n == 0 {
            let structure_side: String = if m == 0 {
                std::iter::repeat(GAP).take(n).collect()
            } else {
                structure.to_string()
            };
            let query_side: String = if n == 0 {
                std::iter::repeat(GAP).take(m).collect()
            } else {
                query.to_string()
            };
            return Alignment::new(structure_side, query_side);
        }

        let gap_open = self.scoring.gap_open;
        let gap_extend = self.scoring.gap_extend;
        let cols = n + 1;
        let idx = |i: usize, j: usize| i * cols + j;

        // h: best score ending in a substitution
        // e: best score ending in a gap in the structure (consuming query)
        // f: best score ending in a gap in the query (consuming structure)
        let size = (m + 1) * cols;
        let mut h = vec![f64::NEG_INFINITY; size];
        let mut e = vec![f64::NEG_INFINITY; size];
        let mut f = vec![f64::NEG_INFINITY; size];

        h[idx(0, 0)] = 0.0;
        for i in 1..=m {
            h[idx(i, 0)] = gap_open + (i - 1) as f64 * gap_extend;
            f[idx(i, 0)] = h[idx(i, 0)];
        }
        for j in 1..=n {
            h[idx(0, j)] = gap_open + (j - 1) as f64 * gap_extend;
            e[idx(0, j)] = h[idx(0, j)];
        }

        for i in 1..=m {
            for j in 1..=n {
                e[idx(i, j)] = (h[idx(i, j - 1)] + gap_open).max(e[idx(i, j - 1)] + gap_extend);
                f[idx(i, j)] = (h[idx(i - 1, j)] + gap_open).max(f[idx(i - 1, j)] + gap_extend);
                let diagonal = h[idx(i - 1, j - 1)] + self.scoring.substitution(s[i - 1], q[j - 1]);
                h[idx(i, j)] = diagonal.max(e[idx(i, j)]).max(f[idx(i, j)]);
            }
        }

        #[derive(Clone, Copy, PartialEq)]
        enum State {
            H,
            E,
            F,
        }

        let mut aligned_structure = Vec::with_capacity(m + n);
        let mut aligned_query = Vec::with_capacity(m + n);
        let (mut i, mut j) = (m, n);
        let mut state = State::H;

        while i > 0 || j > 0 {
            match state {
                State::H => {
                    if i > 0 && j > 0 {
                        let diagonal = h[idx(i - 1, j - 1)]
                            + self.scoring.substitution(s[i - 1], q[j - 1]);
                        if h[idx(i, j)] == diagonal {
                            aligned_structure.push(s[i - 1]);
                            aligned_query.push(q[j - 1]);
                            i -= 1;
                            j -= 1;
                        } else if h[idx(i, j)] == e[idx(i, j)] {
                            state = State::E;
                        } else {
                            state = State::F;
                        }
                    } else if j > 0 {
                        state = State::E;
                    } else {
                        state = State::F;
                    }
                }
                State::E => {
                    aligned_structure.push(GAP);
                    aligned_query.push(q[j - 1]);
                    if e[idx(i, j)] == h[idx(i, j - 1)] + gap_open {
                        state = State::H;
                    }
                    j -= 1;
                }
                State::F => {
                    aligned_structure.push(s[i - 1]);
                    aligned_query.push(GAP);
                    if f[idx(i, j)] == h[idx(i - 1, j)] + gap_open {
                        state = State::H;
                    }
                    i -= 1;
                }
            }
        }

        log::debug!("Alignment score: {:.2}", h[idx(m, n)]);
        Alignment::new(
            aligned_structure.into_iter().rev().collect::<String>(),
            aligned_query.into_iter().rev().collect::<String>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn align(structure: &str, query: &str) -> Alignment {
        GlobalAligner::default().align(structure, query).unwrap()
    }

    #[test]
    fn identical_sequences() {
        let alignment = align("MKVLAGHE", "MKVLAGHE");
        assert_eq!(alignment.structure(), "MKVLAGHE");
        assert_eq!(alignment.query(), "MKVLAGHE");
        assert_eq!(alignment.num_aligned(), 8);
        assert_relative_eq!(alignment.query_identity(), 1.0);
    }

    #[test]
    fn residues_missing_from_structure() {
        let alignment = align("MKVLAGHE", "MKVLWWAGHE");
        assert_eq!(alignment.structure(), "MKVL--AGHE");
        assert_eq!(alignment.query(), "MKVLWWAGHE");
        assert_relative_eq!(alignment.query_identity(), 0.8);
    }

    #[test]
    fn residues_missing_from_query() {
        let alignment = align("MKVLAGHE", "MKVGHE");
        assert_eq!(alignment.structure(), "MKVLAGHE");
        assert_eq!(alignment.query(), "MKV--GHE");
        assert_eq!(alignment.num_aligned(), 6);
    }

    #[test]
    fn case_insensitive_matching() {
        let alignment = align("mkv", "MKV");
        assert_eq!(alignment.query(), "MKV");
        assert_eq!(alignment.structure(), "mkv");
    }

    #[test]
    fn empty_sides_become_gaps() {
        let alignment = align("", "MKV");
        assert_eq!(alignment.structure(), "---");
        assert_eq!(alignment.num_aligned(), 0);
        let alignment = align("MKV", "");
        assert_eq!(alignment.query(), "---");
        assert!(align("", "").is_empty());
    }

    #[test]
    fn unequal_lengths_rejected() {
        let err = Alignment::new("MK-", "MKVV").unwrap_err();
        assert!(matches!(
            err,
            ContactError::UnequalAlignment {
                structure: 3,
                query: 4
            }
        ));
    }

    #[test]
    fn scoring_from_yaml() {
        let scoring: AlignmentScoring =
            serde_yaml::from_str("{match: 1.0, mismatch: -2.0, gap_open: -3.0, gap_extend: -1.0}")
                .unwrap();
        assert_relative_eq!(scoring.match_score, 1.0);
        assert_relative_eq!(scoring.gap_open, -3.0);
    }
}
