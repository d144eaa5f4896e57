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

//! Reference contact maps from residue geometry.

use crate::Point;
use itertools::iproduct;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Residue geometry that a residue-residue distance can be computed for.
pub trait ResidueGeometry {
    fn distance_to(&self, other: &Self) -> f64;
}

/// Single representative point
impl ResidueGeometry for Point {
    fn distance_to(&self, other: &Self) -> f64 {
        (self - other).norm()
    }
}

/// Set of atoms; the distance is the shortest atom-atom distance.
impl ResidueGeometry for Vec<Point> {
    fn distance_to(&self, other: &Self) -> f64 {
        iproduct!(self.iter(), other.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(f64::INFINITY, f64::min)
    }
}

/// How residue positions are represented when defining contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContactKind {
    /// Beta carbons (alpha carbon for glycine)
    #[default]
    BetaCarbon,
    /// Alpha carbons
    AlphaCarbon,
    /// Closest pair of heavy atoms
    HeavyAtom,
}

impl ContactKind {
    /// Distance (Å) below which two residues are in contact.
    pub const fn default_cutoff(&self) -> f64 {
        match self {
            Self::BetaCarbon | Self::AlphaCarbon => 8.0,
            Self::HeavyAtom => 5.0,
        }
    }
}

/// Symmetric residue-residue distance matrix with a contact cutoff.
///
/// Rows and columns are query positions. Positions without structural data
/// are undefined: all their distances are infinite and they are never in contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMap {
    distances: Array2<f64>,
    defined: Vec<bool>,
    cutoff: f64,
}

impl ContactMap {
    /// Build the distance matrix for gapped residue geometry.
    ///
    /// Only the lower triangle is computed; the upper triangle is its mirror.
    pub fn new<T: ResidueGeometry>(gapped: &[Option<T>], cutoff: f64) -> Self {
        let n = gapped.len();
        let mut distances = Array2::from_elem((n, n), f64::INFINITY);
        for (i, first) in gapped.iter().enumerate() {
            let Some(first) = first else { continue };
            for (j, second) in gapped.iter().enumerate().take(i + 1) {
                let Some(second) = second else { continue };
                let distance = first.distance_to(second);
                distances[[i, j]] = distance;
                distances[[j, i]] = distance;
            }
        }
        Self {
            distances,
            defined: gapped.iter().map(Option::is_some).collect(),
            cutoff,
        }
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    pub const fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub const fn distances(&self) -> &Array2<f64> {
        &self.distances
    }

    /// Distance between positions `i` and `j`; infinite if either is undefined.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[[i, j]]
    }

    /// Whether position `i` has structural data.
    pub fn is_defined(&self, i: usize) -> bool {
        self.defined[i]
    }

    pub fn is_contact(&self, i: usize, j: usize) -> bool {
        self.distance(i, j) < self.cutoff
    }

    /// Boolean contact mask.
    pub fn mask(&self) -> Array2<bool> {
        self.distances.mapv(|d| d < self.cutoff)
    }

    /// Contacting pairs `(i, j)` with `j - i >= min_separation`.
    pub fn contacts(&self, min_separation: usize) -> Vec<(usize, usize)> {
        let n = self.len();
        (0..n)
            .flat_map(|i| (i + min_separation.max(1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.is_contact(i, j))
            .collect()
    }
}

/// Threshold gapped residue geometry into a reference contact map.
pub fn build_reference_contacts<T: ResidueGeometry>(
    gapped: &[Option<T>],
    cutoff: f64,
) -> ContactMap {
    ContactMap::new(gapped, cutoff)
}
