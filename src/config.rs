/* The editing surface handed to the model by a front end: alphabet, named states, start and accept
 * choices and transitions between names. Everything the model would silently reject is caught
 * here and reported back to the user instead. */

use crate::alphabet::Alphabet;
use crate::dfa::DFA;
use crate::fa::{Position, StateId};
use color_eyre::eyre::{Report, Result};
use std::collections::HashMap;
use std::fmt;

/// Horizontal spacing used to lay out states built from a configuration
const STATE_SPACING: f32 = 120.0;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    EmptySymbol,
    MultiCharSymbol(String),
    DuplicateSymbol(String),
    DuplicateState(String),
    UnknownState(String),
    RejectedTransition {
        from: String,
        symbol: String,
        to: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySymbol => write!(f, "Error: Alphabet symbols cannot be empty!"),
            ConfigError::MultiCharSymbol(symbol) => write!(
                f,
                "Error: Symbol '{}' is not a single character, input is read one character at a time!",
                symbol
            ),
            ConfigError::DuplicateSymbol(symbol) => {
                write!(f, "Error: Symbol '{}' is already in the alphabet!", symbol)
            }
            ConfigError::DuplicateState(name) => {
                write!(f, "Error: State {} is defined more than once!", name)
            }
            ConfigError::UnknownState(name) => write!(f, "Error: Unknown state {}!", name),
            ConfigError::RejectedTransition { from, symbol, to } => write!(
                f,
                "Error: Transition {} --{}--> {} uses a symbol outside the alphabet!",
                from, symbol, to
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_symbol(symbols: &[String], symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(Report::new(ConfigError::EmptySymbol));
    }

    if !Alphabet::is_valid_symbol(symbol) {
        return Err(Report::new(ConfigError::MultiCharSymbol(symbol.to_string())));
    }

    if symbols.iter().any(|s| s == symbol) {
        return Err(Report::new(ConfigError::DuplicateSymbol(symbol.to_string())));
    }

    Ok(())
}

/// Split a comma separated alphabet such as `0,1` into its symbols. Surrounding whitespace is
/// trimmed; empty, multi-character and repeated symbols are errors.
pub fn parse_alphabet(alphabet: &str) -> Result<Vec<String>> {
    let mut symbols: Vec<String> = Vec::new();

    if alphabet.trim().is_empty() {
        return Ok(symbols);
    }

    for symbol in alphabet.split(',') {
        let symbol = symbol.trim();
        check_symbol(&symbols, symbol)?;
        symbols.push(symbol.to_string());
    }

    Ok(symbols)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomatonConfig {
    pub alphabet: Vec<String>,
    pub states: Vec<String>,
    pub start: Option<String>,
    pub accept: Vec<String>,
    /// (from, symbol, to) triples naming states
    pub transitions: Vec<(String, String, String)>,
}

impl AutomatonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_names(&self) -> Result<Vec<&str>> {
        let mut names: Vec<&str> = Vec::new();

        for name in self.states.iter() {
            if names.contains(&name.as_str()) {
                return Err(Report::new(ConfigError::DuplicateState(name.to_string())));
            }
            names.push(name);
        }

        Ok(names)
    }

    /// Build an automaton from the configuration
    pub fn build(&self) -> Result<DFA> {
        for (idx, symbol) in self.alphabet.iter().enumerate() {
            check_symbol(&self.alphabet[..idx], symbol)?;
        }

        let mut dfa = DFA::new();
        dfa.set_alphabet(self.alphabet.iter().cloned());

        let mut ids: HashMap<&str, StateId> = HashMap::new();

        let names = self.state_names()?;
        for (idx, name) in names.into_iter().enumerate() {
            let position = Position::new(idx as f32 * STATE_SPACING, 0.0);
            let id = dfa.add_state(position, Some(name));
            ids.insert(name, id);
        }

        let lookup = |name: &str| -> Result<StateId> {
            ids.get(name)
                .copied()
                .ok_or_else(|| Report::new(ConfigError::UnknownState(name.to_string())))
        };

        if let Some(start) = &self.start {
            let id = lookup(start)?;
            dfa.set_start_state(Some(id));
        }

        for name in self.accept.iter() {
            let id = lookup(name)?;
            dfa.set_accept(id, true);
        }

        for (from, symbol, to) in self.transitions.iter() {
            let from_id = lookup(from)?;
            let to_id = lookup(to)?;

            if !dfa.add_transition(from_id, to_id, symbol) {
                return Err(Report::new(ConfigError::RejectedTransition {
                    from: from.to_string(),
                    symbol: symbol.to_string(),
                    to: to.to_string(),
                }));
            }
        }

        Ok(dfa)
    }
}
