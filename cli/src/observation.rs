// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Observation stream format
//!
//! One JSON object per line: `{"source": "sensor1", "history": [0, 1, 1]}`.
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub history: Vec<f64>,
}

impl Observation {
    /// Parse a single line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some)
    }
}

/// Iterates observations from a line-oriented reader, tagging errors with
/// their line number
pub struct ObservationReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> ObservationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ObservationReader<R> {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            let line_number = self.line_number;

            let parsed = line
                .with_context(|| format!("Failed to read observation line {}", line_number))
                .and_then(|line| {
                    Observation::parse_line(&line)
                        .with_context(|| format!("Invalid observation on line {}", line_number))
                });

            match parsed {
                Ok(Some(observation)) => return Some(Ok(observation)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
