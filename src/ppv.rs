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

//! Positive predictive value of ranked contact predictions.
//!
//! Predictions are walked in rank order. Pairs closer than the minimum sequence
//! separation are ignored altogether. The remaining pairs are selected until
//! either the budget, `ceil(L × factor)` with `L` the query length, is filled or
//! a prediction scores below the optional minimum score; that prediction is the
//! last one considered and is itself selected. Selected pairs touching
//! a position without structural data are skipped: they count against the budget
//! but are neither true nor false positives.

use crate::contactmap::ContactMap;
use crate::{ContactError, PredictedContact, Result};
use serde::Serialize;

/// Default minimum sequence separation of scored contacts
pub const MIN_SEPARATION: usize = 5;

/// Which predictions enter the evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Query sequence length `L`
    pub reference_length: usize,
    /// Budget in units of `L`
    pub factor: f64,
    /// Stop at the first prediction scoring below this
    pub min_score: Option<f64>,
    /// Pairs with `|i - j|` below this are ignored
    pub min_separation: usize,
}

impl Selection {
    pub const fn new(reference_length: usize, factor: f64) -> Self {
        Self {
            reference_length,
            factor,
            min_score: None,
            min_separation: MIN_SEPARATION,
        }
    }

    pub const fn with_min_score(mut self, min_score: Option<f64>) -> Self {
        self.min_score = min_score;
        self
    }

    pub const fn with_min_separation(mut self, min_separation: usize) -> Self {
        self.min_separation = min_separation;
        self
    }

    /// Maximum number of selected pairs, `ceil(L × factor)`
    pub fn budget(&self) -> usize {
        (self.reference_length as f64 * self.factor).ceil().max(0.0) as usize
    }
}

/// Select the top ranked pairs; returned positions are 0-based.
///
/// The input is trusted to be sorted by descending score. Position zero is
/// rejected; upper bounds are checked against the reference map when scoring.
pub fn select_contacts(
    contacts: &[PredictedContact],
    selection: &Selection,
) -> Result<Vec<(usize, usize)>> {
    let budget = selection.budget();
    let mut selected = Vec::with_capacity(budget.min(contacts.len()));
    for contact in contacts {
        if selected.len() >= budget {
            break;
        }
        if contact.separation() >= selection.min_separation {
            if contact.i == 0 || contact.j == 0 {
                return Err(ContactError::PositionOutOfRange {
                    position: 0,
                    length: selection.reference_length,
                });
            }
            selected.push((contact.i - 1, contact.j - 1));
        }
        // the first contact below the minimum score is still selected
        if selection.min_score.is_some_and(|min| contact.score < min) {
            break;
        }
    }
    Ok(selected)
}

/// Outcome of scoring a prediction list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Precision {
    /// Positive predictive value, `tp / (tp + fp)`
    pub ppv: f64,
    /// True positives as a fraction of scored pairs
    pub tp: f64,
    /// False positives as a fraction of scored pairs
    pub fp: f64,
    /// Pairs selected within the budget
    pub selected: usize,
    /// Selected pairs skipped for lack of structural data
    pub skipped: usize,
}

impl Precision {
    /// From raw counts of true and false positives.
    fn from_counts(true_positives: usize, false_positives: usize, skipped: usize) -> Self {
        let scored = true_positives + false_positives;
        if scored == 0 {
            return Self {
                skipped,
                selected: skipped,
                ..Default::default()
            };
        }
        let tp = true_positives as f64 / scored as f64;
        let fp = false_positives as f64 / scored as f64;
        Self {
            ppv: if tp > 0.0 { tp / (tp + fp) } else { 0.0 },
            tp,
            fp,
            selected: scored + skipped,
            skipped,
        }
    }

    /// Number of pairs counted as true or false positives
    pub const fn scored(&self) -> usize {
        self.selected - self.skipped
    }
}

/// Classify selected pairs against the reference: `Some(true)` for a true
/// positive, `Some(false)` for a false positive and `None` for skipped pairs.
fn classify<'a>(
    pairs: &'a [(usize, usize)],
    reference: &'a ContactMap,
) -> Result<impl Iterator<Item = Option<bool>> + 'a> {
    if let Some(&(i, j)) = pairs
        .iter()
        .find(|&&(i, j)| i.max(j) >= reference.len())
    {
        return Err(ContactError::PositionOutOfRange {
            position: i.max(j) + 1,
            length: reference.len(),
        });
    }
    Ok(pairs.iter().map(move |&(i, j)| {
        (reference.is_defined(i) && reference.is_defined(j)).then(|| reference.is_contact(i, j))
    }))
}

/// Score ranked predictions against a reference contact map indexed by query position.
pub fn score_predictions(
    contacts: &[PredictedContact],
    reference: &ContactMap,
    selection: &Selection,
) -> Result<Precision> {
    let pairs = select_contacts(contacts, selection)?;
    let (mut true_positives, mut false_positives, mut skipped) = (0, 0, 0);
    for outcome in classify(&pairs, reference)? {
        match outcome {
            Some(true) => true_positives += 1,
            Some(false) => false_positives += 1,
            None => skipped += 1,
        }
    }
    let precision = Precision::from_counts(true_positives, false_positives, skipped);
    log::debug!(
        "Selected {} of {} predictions; {} skipped, PPV = {:.3}",
        precision.selected,
        contacts.len(),
        skipped,
        precision.ppv
    );
    Ok(precision)
}

/// Precision after each selected prediction, in rank order.
///
/// Entry `k` scores the first `k + 1` selected pairs. Until the first scoreable
/// pair the precision is zero.
pub fn ppv_curve(
    contacts: &[PredictedContact],
    reference: &ContactMap,
    selection: &Selection,
) -> Result<Vec<Precision>> {
    let pairs = select_contacts(contacts, selection)?;
    let (mut true_positives, mut false_positives, mut skipped) = (0, 0, 0);
    let curve = classify(&pairs, reference)?
        .map(|outcome| {
            match outcome {
                Some(true) => true_positives += 1,
                Some(false) => false_positives += 1,
                None => skipped += 1,
            }
            Precision::from_counts(true_positives, false_positives, skipped)
        })
        .collect();
    Ok(curve)
}
