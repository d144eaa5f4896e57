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

//! Evaluation of one prediction against one reference structure.

use crate::alignment::{Alignment, SequenceAligner};
use crate::config::{EvaluationSettings, Target};
use crate::contactmap::{ContactKind, ContactMap, ResidueGeometry};
use crate::contacts::{contacts_from_file, ContactStats};
use crate::coordinates::{
    alpha_carbon_coordinates, atom_sequence, heavy_atom_coordinates, representative_coordinates,
};
use crate::gapmap::{map_gaps, without_alignment};
use crate::ppv::{ppv_curve, score_predictions, Precision};
use crate::sequence::query_sequence_from_file;
use crate::{GlobalAligner, PredictedContact, Result, Structure};
use derive_getters::Getters;
use serde::Serialize;
use std::path::Path;

/// Result of evaluating a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct Evaluation {
    /// Structure identifier from the header, if any
    accession: String,
    query_length: usize,
    /// Residues with structural data
    structure_length: usize,
    /// Query residues paired with a structure residue; `None` without alignment
    aligned: Option<usize>,
    /// Sequence identity over the query; `None` without alignment
    identity: Option<f64>,
    precision: Precision,
    stats: ContactStats,
    /// Precision after each selected contact
    #[serde(skip_serializing_if = "Vec::is_empty")]
    curve: Vec<f64>,
}

/// Place structural data on query positions and build the reference map.
fn reference_map<T: ResidueGeometry + Clone>(
    coordinates: &[T],
    alignment: Option<&Alignment>,
    query_length: usize,
    cutoff: f64,
) -> Result<ContactMap> {
    let gapped = match alignment {
        Some(alignment) => map_gaps(alignment, coordinates)?,
        None => without_alignment(coordinates, query_length),
    };
    Ok(ContactMap::new(&gapped, cutoff))
}

/// Score ranked `contacts` for the `query` sequence against a reference structure.
pub fn evaluate(
    query: &str,
    contacts: &[PredictedContact],
    structure: &Structure,
    aligner: &dyn SequenceAligner,
    settings: &EvaluationSettings,
) -> Result<Evaluation> {
    let query_length = query.chars().count();
    let structure_sequence = atom_sequence(structure);
    log::debug!(
        "Structure sequence ({} residues): {}",
        structure_sequence.len(),
        structure_sequence
    );
    if structure_sequence.is_empty() {
        log::warn!("No residues with alpha or beta carbons in the selected chain and model");
    }

    let alignment = if settings.align {
        Some(aligner.align(&structure_sequence, query)?)
    } else {
        None
    };
    if let Some(alignment) = &alignment {
        log::debug!("Aligned structure: {}", alignment.structure());
        log::debug!("Aligned query:     {}", alignment.query());
    }

    let cutoff = settings.effective_cutoff();
    let reference = match settings.contact_kind {
        ContactKind::BetaCarbon => reference_map(
            &representative_coordinates(structure),
            alignment.as_ref(),
            query_length,
            cutoff,
        )?,
        ContactKind::AlphaCarbon => reference_map(
            &alpha_carbon_coordinates(structure),
            alignment.as_ref(),
            query_length,
            cutoff,
        )?,
        ContactKind::HeavyAtom => reference_map(
            &heavy_atom_coordinates(structure),
            alignment.as_ref(),
            query_length,
            cutoff,
        )?,
    };

    let selection = settings.selection(query_length);
    let precision = score_predictions(contacts, &reference, &selection)?;
    let curve = if settings.curve {
        ppv_curve(contacts, &reference, &selection)?
            .iter()
            .map(|p| p.ppv)
            .collect()
    } else {
        Vec::new()
    };

    Ok(Evaluation {
        accession: structure.accession(),
        query_length,
        structure_length: structure_sequence.len(),
        aligned: alignment.as_ref().map(Alignment::num_aligned),
        identity: alignment.as_ref().map(Alignment::query_identity),
        precision,
        stats: ContactStats::new(contacts, settings.score_threshold),
        curve,
    })
}

/// Read sequence, contacts and structure from files and evaluate with the default aligner.
pub fn evaluate_files(
    sequence: impl AsRef<Path>,
    contacts: impl AsRef<Path>,
    structure: impl AsRef<Path>,
    settings: &EvaluationSettings,
) -> anyhow::Result<Evaluation> {
    let query = query_sequence_from_file(sequence)?;
    let contacts = contacts_from_file(contacts)?;
    let structure = Structure::from_file(structure, settings.chain, settings.model)?;
    let aligner = GlobalAligner::new(settings.scoring);
    let evaluation = evaluate(&query, &contacts, &structure, &aligner, settings)?;
    log::info!(
        "PPV = {:.3} ({} of {} selected contacts scored)",
        evaluation.precision.ppv,
        evaluation.precision.scored(),
        evaluation.precision.selected
    );
    Ok(evaluation)
}

/// Evaluate a batch target.
pub fn evaluate_target(target: &Target, settings: &EvaluationSettings) -> anyhow::Result<Evaluation> {
    evaluate_files(&target.sequence, &target.contacts, &target.structure, settings)
        .map_err(|e| anyhow::anyhow!("{}: {}", target.label(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::parse_structure;
    use float_cmp::assert_approx_eq;

    /// Alanines 10 Å apart along x; the last residue folds back next to the first.
    fn hairpin(n: usize) -> Structure {
        let records: Vec<String> = (1..=n)
            .map(|i| {
                let (x, y) = match i {
                    i if i == n => (0.0, 3.0),
                    _ => (10.0 * (i - 1) as f64, 0.0),
                };
                format!(
                    "ATOM  {:>5}  CB  ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
                    i, i, x, y, 0.0
                )
            })
            .collect();
        parse_structure(&records, None, 1).unwrap()
    }

    #[test]
    fn identical_sequences() {
        let contacts = [PredictedContact::new(1.0, 1, 10)];
        let evaluation = evaluate(
            "AAAAAAAAAA",
            &contacts,
            &hairpin(10),
            &GlobalAligner::default(),
            &EvaluationSettings::default(),
        )
        .unwrap();
        assert_approx_eq!(f64, evaluation.precision().ppv, 1.0);
        assert_approx_eq!(f64, evaluation.precision().tp, 1.0);
        assert_approx_eq!(f64, evaluation.precision().fp, 0.0);
        assert_eq!(*evaluation.aligned(), Some(10));
        assert_eq!(*evaluation.structure_length(), 10);
    }

    #[test]
    fn five_residues_have_no_long_range_contact() {
        let contacts = [PredictedContact::new(1.0, 1, 5)];
        let evaluation = evaluate(
            "AAAAA",
            &contacts,
            &hairpin(5),
            &GlobalAligner::default(),
            &EvaluationSettings::default(),
        )
        .unwrap();
        assert_eq!(evaluation.precision().selected, 0);
        assert_approx_eq!(f64, evaluation.precision().ppv, 0.0);
    }

    #[test]
    fn numbering_taken_from_structure() {
        let settings = EvaluationSettings {
            align: false,
            curve: true,
            ..Default::default()
        };
        let contacts = [
            PredictedContact::new(1.0, 2, 9),
            PredictedContact::new(0.5, 1, 10),
            PredictedContact::new(0.2, 1, 12),
        ];
        let evaluation = evaluate(
            "AAAAAAAAAAAA",
            &contacts,
            &hairpin(10),
            &GlobalAligner::default(),
            &settings,
        )
        .unwrap();
        assert_eq!(*evaluation.aligned(), None);
        assert_eq!(evaluation.precision().selected, 3);
        assert_eq!(evaluation.precision().skipped, 1);
        assert_approx_eq!(f64, evaluation.precision().ppv, 0.5);
        assert_eq!(evaluation.curve().len(), 3);
        assert_approx_eq!(f64, evaluation.curve()[0], 0.0);
    }

    #[test]
    fn empty_structure() {
        let contacts = [PredictedContact::new(1.0, 1, 10)];
        let evaluation = evaluate(
            "AAAAAAAAAA",
            &contacts,
            &Structure::default(),
            &GlobalAligner::default(),
            &EvaluationSettings::default(),
        )
        .unwrap();
        assert_eq!(evaluation.precision().skipped, 1);
        assert_approx_eq!(f64, evaluation.precision().ppv, 0.0);
        assert_eq!(*evaluation.identity(), Some(0.0));
    }
}
