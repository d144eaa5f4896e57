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

//! Transfer of structural coordinates onto query sequence positions.
//!
//! Walking an [`Alignment`] column by column:
//!
//! | structure | query   | output                                   |
//! |-----------|---------|------------------------------------------|
//! | gap       | residue | `None` (no structural data)              |
//! | residue   | gap     | nothing; the coordinate is consumed      |
//! | residue   | residue | `Some(coordinate)`                       |
//!
//! The output therefore has one entry per query residue, and position `i` of the
//! output is query position `i` (0-based).

use crate::alignment::{Alignment, GAP};
use crate::{ContactError, Result};

/// Structural data per query position; `None` marks a gap.
pub type Gapped<T> = Vec<Option<T>>;

/// Place per-residue structural data onto query positions.
///
/// `coordinates` must hold one entry per non-gap symbol on the structure side of
/// the alignment, in the same order. Anything else is a caller error and gives
/// [`ContactError::AlignmentLengthMismatch`].
pub fn map_gaps<T: Clone>(alignment: &Alignment, coordinates: &[T]) -> Result<Gapped<T>> {
    let structural = alignment.structure().chars().filter(|&c| c != GAP).count();
    if structural != coordinates.len() {
        return Err(ContactError::AlignmentLengthMismatch {
            consumed: structural,
            available: coordinates.len(),
        });
    }

    let mut remaining = coordinates.iter();
    let mut gapped = Vec::with_capacity(alignment.len());
    for (structure, query) in alignment.columns() {
        match (structure == GAP, query == GAP) {
            (true, true) => {}
            (true, false) => gapped.push(None),
            (false, true) => {
                remaining.next();
            }
            (false, false) => gapped.push(remaining.next().cloned()),
        }
    }
    debug_assert!(remaining.next().is_none());
    Ok(gapped)
}

/// Use structural data as is, i.e. assume structure and query numbering coincide.
///
/// The output has `length` entries: surplus coordinates are dropped and missing
/// ones become gaps.
pub fn without_alignment<T: Clone>(coordinates: &[T], length: usize) -> Gapped<T> {
    let mut gapped: Gapped<T> = coordinates.iter().take(length).cloned().map(Some).collect();
    gapped.resize(length, None);
    gapped
}
