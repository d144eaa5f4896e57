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

//! Fixed-column coordinate records.

use crate::{ContactError, Point, Result};
use derive_getters::Getters;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Zero-based column ranges of a coordinate record.
pub mod columns {
    use std::ops::Range;

    pub const RECORD: Range<usize> = 0..6;
    pub const SERIAL: Range<usize> = 6..11;
    pub const ATOM_NAME: Range<usize> = 12..16;
    pub const RESIDUE_NAME: Range<usize> = 17..20;
    pub const CHAIN: usize = 21;
    pub const RESIDUE_NUMBER: Range<usize> = 22..26;
    pub const INSERTION_CODE: usize = 26;
    pub const X: Range<usize> = 30..38;
    pub const Y: Range<usize> = 38..46;
    pub const Z: Range<usize> = 46..54;
    pub const OCCUPANCY: Range<usize> = 54..60;
    pub const TEMPERATURE_FACTOR: Range<usize> = 60..66;
    pub const ELEMENT: Range<usize> = 76..78;
    pub const CHARGE: Range<usize> = 78..80;
}

/// Record tag of coordinate records.
pub const COORDINATE_TAG: &str = "ATOM";

/// Single atom parsed from a coordinate record.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct AtomRecord {
    /// Record tag, e.g. `ATOM`
    record: String,
    /// Atom serial number
    serial: i64,
    /// Atom name, e.g. `CA`
    name: String,
    /// Three-letter residue name
    residue_name: String,
    /// Chain identifier; blank is the default chain
    chain: char,
    /// Residue sequence number
    residue_number: i32,
    /// Insertion code, if any
    insertion_code: Option<char>,
    /// Cartesian position (Å)
    pos: Point,
    occupancy: f64,
    temperature_factor: f64,
    /// Element symbol; absent in short records
    element: Option<String>,
    /// Formal charge, e.g. `2+`
    charge: Option<String>,
}

impl AtomRecord {
    /// Parse a line known to be a coordinate record.
    ///
    /// Errors name the offending field; the line number is left as zero.
    pub fn from_line(line: &str) -> Result<Self> {
        Ok(Self {
            record: text(line, columns::RECORD, "record tag")?.to_string(),
            serial: number(line, columns::SERIAL, "atom serial")?,
            name: text(line, columns::ATOM_NAME, "atom name")?.to_string(),
            residue_name: text(line, columns::RESIDUE_NAME, "residue name")?.to_string(),
            chain: character(line, columns::CHAIN, "chain identifier")?,
            residue_number: number(line, columns::RESIDUE_NUMBER, "residue number")?,
            insertion_code: Some(character(line, columns::INSERTION_CODE, "insertion code")?)
                .filter(|c| !c.is_whitespace()),
            pos: Point::new(
                number(line, columns::X, "x")?,
                number(line, columns::Y, "y")?,
                number(line, columns::Z, "z")?,
            ),
            occupancy: number(line, columns::OCCUPANCY, "occupancy")?,
            temperature_factor: number(line, columns::TEMPERATURE_FACTOR, "temperature factor")?,
            element: optional_text(line, columns::ELEMENT),
            charge: optional_text(line, columns::CHARGE),
        })
    }

    /// True for hydrogen and deuterium atoms, judged from the atom name.
    ///
    /// Leading digits are skipped so that e.g. `1HB` counts as hydrogen.
    pub fn is_hydrogen(&self) -> bool {
        matches!(
            self.name.trim_start_matches(|c: char| c.is_ascii_digit()).chars().next(),
            Some('H') | Some('D')
        )
    }
}

impl FromStr for AtomRecord {
    type Err = ContactError;
    fn from_str(line: &str) -> Result<Self> {
        Self::from_line(line)
    }
}

impl fmt::Display for AtomRecord {
    /// Write the record back into fixed columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // four-letter atom names start one column earlier
        let name = if self.name.len() < 4 {
            format!(" {:<3}", self.name)
        } else {
            self.name.clone()
        };
        write!(
            f,
            "{:<6}{:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}",
            self.record,
            self.serial,
            name,
            self.residue_name,
            self.chain,
            self.residue_number,
            self.insertion_code.unwrap_or(' '),
            self.pos.x,
            self.pos.y,
            self.pos.z,
            self.occupancy,
            self.temperature_factor,
        )?;
        if self.element.is_some() || self.charge.is_some() {
            write!(f, "{:10}{:>2}", "", self.element.as_deref().unwrap_or_default())?;
        }
        if let Some(charge) = &self.charge {
            write!(f, "{:<2}", charge)?;
        }
        Ok(())
    }
}

fn malformed(field: &'static str, value: &str) -> ContactError {
    ContactError::MalformedRecord {
        line: 0,
        field,
        value: value.to_string(),
    }
}

/// Trimmed text in a column range; fails if the line is too short.
fn text<'a>(line: &'a str, range: Range<usize>, field: &'static str) -> Result<&'a str> {
    line.get(range)
        .map(str::trim)
        .ok_or_else(|| malformed(field, line.trim_end()))
}

/// Trimmed, non-blank text in a trailing column range that may be cut short.
fn optional_text(line: &str, range: Range<usize>) -> Option<String> {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn character(line: &str, column: usize, field: &'static str) -> Result<char> {
    line.get(column..column + 1)
        .and_then(|s| s.chars().next())
        .ok_or_else(|| malformed(field, line.trim_end()))
}

fn number<T: FromStr>(line: &str, range: Range<usize>, field: &'static str) -> Result<T> {
    let value = text(line, range, field)?;
    value.parse().map_err(|_| malformed(field, value))
}
