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

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Open a file for buffered reading. Files ending in `.gz` are decompressed on the fly.
pub(crate) fn open_maybe_compressed(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Cannot open '{}': {}", path.display(), e))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}
