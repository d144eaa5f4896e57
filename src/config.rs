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

//! # Evaluation settings and batch input
//!
//! Settings are read from YAML, either as a standalone document or under the
//! `settings` key of a batch input file:
//!
//! ~~~yaml
//! settings:
//!   factor: 0.5
//!   chain: A
//!   contact_kind: HeavyAtom
//! targets:
//!   - name: 1abc
//!     sequence: 1abc.fa
//!     contacts: 1abc.gdca
//!     structure: 1abc.pdb
//! ~~~
//!
//! Relative target paths are resolved against the directory of the input file.

use crate::alignment::AlignmentScoring;
use crate::contactmap::ContactKind;
use crate::ppv::{Selection, MIN_SEPARATION};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Parameters of a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Builder)]
#[serde(default, deny_unknown_fields)]
#[builder(default)]
pub struct EvaluationSettings {
    /// Number of scored contacts in units of the query length
    #[validate(range(exclusive_min = 0.0))]
    pub factor: f64,
    /// Stop at the first contact scoring below this
    pub min_score: Option<f64>,
    /// Chain to evaluate; `None` picks the first chain in the file
    pub chain: Option<char>,
    /// 1-based model number
    #[validate(range(min = 1))]
    pub model: usize,
    pub contact_kind: ContactKind,
    /// Contact distance cutoff (Å); defaults to that of `contact_kind`
    #[validate(range(exclusive_min = 0.0))]
    pub cutoff: Option<f64>,
    /// Minimum sequence separation of scored contacts
    pub min_separation: usize,
    /// Align structure and query sequences. If false, structure residues are
    /// taken to be numbered as the query.
    pub align: bool,
    pub scoring: AlignmentScoring,
    /// Predicted contact scores above this count in the contact statistics
    pub score_threshold: f64,
    /// Also report precision after each selected contact
    pub curve: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            factor: 1.0,
            min_score: None,
            chain: None,
            model: 1,
            contact_kind: ContactKind::default(),
            cutoff: None,
            min_separation: MIN_SEPARATION,
            align: true,
            scoring: AlignmentScoring::default(),
            score_threshold: 0.0,
            curve: false,
        }
    }
}

impl EvaluationSettings {
    /// Load from a YAML file, either from a `settings` section or the whole document.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot open '{}': {}", path.display(), e))?;
        let full: serde_yaml::Value = serde_yaml::from_str(&yaml)?;
        let section = match full.get("settings") {
            Some(section) => section.clone(),
            None if full.get("targets").is_some() => return Ok(Self::default()),
            None => full,
        };
        let settings: Self = serde_yaml::from_value(section).map_err(anyhow::Error::msg)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Distance cutoff in use
    pub fn effective_cutoff(&self) -> f64 {
        self.cutoff
            .unwrap_or_else(|| self.contact_kind.default_cutoff())
    }

    /// Contact selection for a query of the given length
    pub fn selection(&self, reference_length: usize) -> Selection {
        Selection::new(reference_length, self.factor)
            .with_min_score(self.min_score)
            .with_min_separation(self.min_separation)
    }
}

/// Input files of one evaluation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Label used in reports; defaults to the contact file name
    #[serde(default)]
    pub name: Option<String>,
    /// Query sequence (FASTA or bare)
    pub sequence: PathBuf,
    /// Ranked contact list
    pub contacts: PathBuf,
    /// Reference structure
    pub structure: PathBuf,
}

impl Target {
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.contacts
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    fn resolve(mut self, directory: &Path) -> Self {
        for path in [&mut self.sequence, &mut self.contacts, &mut self.structure] {
            if path.is_relative() {
                *path = directory.join(&*path);
            }
        }
        self
    }
}

/// Shared settings plus a list of targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BatchInput {
    #[serde(default)]
    #[validate(nested)]
    pub settings: EvaluationSettings,
    pub targets: Vec<Target>,
}

impl BatchInput {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot open '{}': {}", path.display(), e))?;
        let mut input: Self = serde_yaml::from_str(&yaml).map_err(anyhow::Error::msg)?;
        input.validate()?;
        if input.targets.is_empty() {
            anyhow::bail!("No targets in '{}'", path.display());
        }
        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        input.targets = input
            .targets
            .into_iter()
            .map(|target| target.resolve(directory))
            .collect();
        Ok(input)
    }
}
