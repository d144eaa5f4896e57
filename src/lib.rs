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

//! # Contact map evaluation
//!
//! Scores ranked lists of predicted residue-residue contacts against a reference
//! protein structure. The pipeline is:
//!
//! 1. [`structure`]: read fixed-column coordinate records into residues.
//! 2. [`coordinates`]: pick one point (or all heavy atoms) per residue and derive the sequence.
//! 3. [`alignment`]: align the structure sequence with the query sequence.
//! 4. [`gapmap`]: place structural coordinates on query positions.
//! 5. [`contactmap`]: threshold pairwise distances into a reference contact map.
//! 6. [`ppv`]: count true and false positives among the top ranked predictions.
//!
//! # Examples
//! ~~~
//! use contact_bench::{PredictedContact, Point};
//! use contact_bench::contactmap::ContactMap;
//! use contact_bench::ppv::{score_predictions, Selection};
//!
//! let mut points: Vec<Option<Point>> = (0..8)
//!     .map(|i| Some(Point::new(10.0 * i as f64, 0.0, 0.0)))
//!     .collect();
//! points[7] = Some(Point::new(0.0, 3.0, 0.0));
//!
//! let reference = ContactMap::new(&points, 8.0);
//! let predictions = vec![PredictedContact::new(0.9, 1, 8)];
//! let selection = Selection::new(8, 1.0);
//! let precision = score_predictions(&predictions, &reference, &selection).unwrap();
//! assert_eq!(precision.ppv, 1.0);
//! ~~~

use nalgebra::Vector3;

pub type Point = Vector3<f64>;

pub mod alignment;
pub(crate) mod auxiliary;
pub mod config;
pub mod contactmap;
pub mod contacts;
pub mod coordinates;
mod error;
pub mod evaluate;
pub mod gapmap;
pub mod ppv;
pub mod sequence;
pub mod structure;

pub use alignment::{Alignment, GlobalAligner, SequenceAligner};
pub use contactmap::{build_reference_contacts, ContactKind, ContactMap};
pub use contacts::PredictedContact;
pub use coordinates::{atom_sequence, representative_coordinates};
pub use error::{ContactError, Result};
pub use ppv::{score_predictions, Precision};
pub use structure::{parse_structure, Structure};
