/* Exhaustive enumeration of the strings over a DFA's alphabet up to a caller supplied length.
 * The number of strings grows as |alphabet|^length, so the length bound is always explicit. */

use crate::dfa::DFA;
use log::{debug, info};
use serde::Serialize;
use std::fmt;

/// Display form of the empty string
pub const EMPTY_STRING: &str = "ε";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedString {
    pub string: String,
    pub accepted: bool,
}

impl GeneratedString {
    /// The string as shown to a user, with the empty string spelled as ε
    pub fn display_string(&self) -> &str {
        if self.string.is_empty() {
            EMPTY_STRING
        } else {
            self.string.as_str()
        }
    }
}

impl fmt::Display for GeneratedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.accepted { "accepted" } else { "rejected" };
        write!(f, "{}: {}", self.display_string(), verdict)
    }
}

/// Lazily yields every string over `symbols` of length `0..=max_length`, shortest first and in
/// lexicographic order of the symbol ordering within one length.
#[derive(Debug, Clone)]
pub struct StringEnumerator {
    symbols: Vec<String>,
    max_length: usize,
    digits: Vec<usize>,
    finished: bool,
}

impl StringEnumerator {
    pub fn new(symbols: &[String], max_length: usize) -> Self {
        StringEnumerator {
            symbols: symbols.to_vec(),
            max_length,
            digits: Vec::new(),
            finished: false,
        }
    }

    fn current(&self) -> String {
        self.digits
            .iter()
            .map(|digit| self.symbols[*digit].as_str())
            .collect()
    }

    /// Step the odometer to the next string, growing the length once every position has wrapped.
    fn advance(&mut self) {
        let base = self.symbols.len();

        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }

        if base == 0 || self.digits.len() == self.max_length {
            self.finished = true;
        } else {
            self.digits.push(0);
        }
    }
}

impl Iterator for StringEnumerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let string = self.current();
        self.advance();
        Some(string)
    }
}

/// Number of strings of length `0..=max_length` over an alphabet of `alphabet_len` symbols, or
/// `None` if it does not fit in a usize.
pub fn enumeration_size(alphabet_len: usize, max_length: usize) -> Option<usize> {
    // Below two symbols every length contributes at most one string
    match alphabet_len {
        0 => return Some(1),
        1 => return max_length.checked_add(1),
        _ => {}
    }

    let mut total: usize = 0;
    let mut per_length: usize = 1;

    // per_length at least doubles each round, so this overflows within usize::BITS rounds
    for length in 0..=max_length {
        if length > 0 {
            per_length = per_length.checked_mul(alphabet_len)?;
        }
        total = total.checked_add(per_length)?;
    }
    Some(total)
}

/// Accepted and total counts for one string length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LengthCount {
    pub length: usize,
    pub accepted: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenerationSummary {
    pub total: usize,
    pub accepted: usize,
    pub empty_accepted: bool,
    /// Counts for lengths 1 and up; the empty string is reported by `empty_accepted`
    pub by_length: Vec<LengthCount>,
}

impl GenerationSummary {
    pub fn from_results(results: &[GeneratedString]) -> Self {
        let mut summary = GenerationSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.accepted {
                summary.accepted += 1;
            }

            let length = result.string.chars().count();
            if length == 0 {
                summary.empty_accepted |= result.accepted;
                continue;
            }

            while summary.by_length.len() < length {
                let next = summary.by_length.len() + 1;
                summary.by_length.push(LengthCount {
                    length: next,
                    ..Default::default()
                });
            }

            let count = &mut summary.by_length[length - 1];
            count.total += 1;
            if result.accepted {
                count.accepted += 1;
            }
        }

        summary
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let empty = if self.empty_accepted {
            "accepted"
        } else {
            "rejected"
        };
        writeln!(
            f,
            "{} of {} strings accepted ({} {})",
            self.accepted, self.total, EMPTY_STRING, empty
        )?;

        for count in self.by_length.iter() {
            writeln!(
                f,
                "  length {}: {}/{}",
                count.length, count.accepted, count.total
            )?;
        }
        Ok(())
    }
}

impl DFA {
    /// Simulate every string over the alphabet with length up to and including `max_length`.
    /// A run that gets stuck on a missing transition counts as rejected.
    pub fn generate_all_strings(&self, max_length: usize) -> Vec<GeneratedString> {
        let enumerator = StringEnumerator::new(self.alphabet().symbols(), max_length);

        let results: Vec<GeneratedString> = enumerator
            .map(|string| {
                let accepted = self.accepts(&string);
                debug!("Generated '{}': accepted = {}", string, accepted);
                GeneratedString { string, accepted }
            })
            .collect();

        info!(
            "Enumerated {} strings up to length {}",
            results.len(),
            max_length
        );
        results
    }
}
