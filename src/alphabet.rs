/* Ordered symbol set of an automaton. The insertion order is the order used when enumerating
 * strings, so it is preserved instead of using a hash set. Input is read one character at a time,
 * so every symbol is exactly one character. */

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alphabet {
    symbols: Vec<String>,
}

impl Alphabet {
    pub fn new() -> Self {
        Alphabet {
            symbols: Vec::new(),
        }
    }

    /// Build an alphabet from the given symbols. Repeated symbols keep their first position.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alphabet = Alphabet::new();
        for symbol in symbols {
            alphabet.insert(symbol.into());
        }
        alphabet
    }

    /// Whether `symbol` can be part of an alphabet, i.e. it is a single character
    pub fn is_valid_symbol(symbol: &str) -> bool {
        symbol.chars().count() == 1
    }

    /// Add a symbol at the end of the ordering. Returns false if it was already present or is not
    /// a single character.
    pub fn insert(&mut self, symbol: String) -> bool {
        if !Alphabet::is_valid_symbol(&symbol) || self.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.symbols.iter()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.symbols.join(", "))
    }
}
