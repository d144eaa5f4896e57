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

use thiserror::Error;

/// Errors raised while reading structures and scoring contacts.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A coordinate record with a missing or non-numeric fixed column.
    /// `line` is 1-based; zero means the record was parsed outside a file.
    #[error("malformed record on line {line}: invalid {field} '{value}'")]
    MalformedRecord {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// The gap mapper did not consume exactly the structural coordinates it was given.
    #[error("alignment/coordinate mismatch: consumed {consumed} of {available} structural residues")]
    AlignmentLengthMismatch { consumed: usize, available: usize },

    /// The two gapped sequences of an alignment differ in length.
    #[error("aligned sequences differ in length ({structure} vs {query})")]
    UnequalAlignment { structure: usize, query: usize },

    /// A predicted contact refers to a position outside the query sequence.
    #[error("contact position {position} is outside the sequence of length {length}")]
    PositionOutOfRange { position: usize, length: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContactError {
    /// Attach a 1-based line number to a malformed record error.
    pub(crate) fn at_line(self, line_number: usize) -> Self {
        match self {
            Self::MalformedRecord { field, value, .. } => Self::MalformedRecord {
                line: line_number,
                field,
                value,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContactError>;
