/* Symbol by symbol walk of a DFA over an input string. Every run produces a report holding the
 * verdict and a trace of the states visited; failures are part of the report rather than an Err
 * because a stuck partial DFA is an expected outcome. */

use crate::dfa::DFA;
use log::debug;
use serde::{Serialize, Serializer};
use std::fmt;

/// Reasons a run stops before consuming its whole input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// No start state has been chosen
    NoStartState,
    /// The input contains a symbol outside the alphabet
    SymbolNotInAlphabet(String),
    /// The current state has no outgoing transition for the next symbol
    NoTransitionDefined { state: String, symbol: String },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::NoStartState => write!(f, "No start state defined"),
            SimulationError::SymbolNotInAlphabet(symbol) => {
                write!(f, "Symbol '{}' not in alphabet", symbol)
            }
            SimulationError::NoTransitionDefined { state, symbol } => write!(
                f,
                "No transition from state {} on symbol '{}'",
                state, symbol
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

impl Serialize for SimulationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Symbol column of a trace step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceSymbol {
    /// Marks the entry into the start state, before any input is read
    Start,
    Symbol(String),
}

impl fmt::Display for TraceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceSymbol::Start => write!(f, "START"),
            TraceSymbol::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl Serialize for TraceSymbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub state: String,
    pub symbol: TraceSymbol,
    pub remaining: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceStep {
    fn new(state: &str, symbol: TraceSymbol, remaining: &str) -> Self {
        TraceStep {
            state: state.to_string(),
            symbol,
            remaining: remaining.to_string(),
            error: None,
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining = if self.remaining.is_empty() {
            "ε"
        } else {
            self.remaining.as_str()
        };

        write!(f, "{} -> {} [{}]", self.symbol, self.state, remaining)?;

        if let Some(error) = &self.error {
            write!(f, " ({})", error)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SimulationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<String>,
    pub trace: Vec<TraceStep>,
}

impl SimulationReport {
    fn failed(error: SimulationError, trace: Vec<TraceStep>) -> Self {
        SimulationReport {
            accepted: false,
            error: Some(error),
            final_state: None,
            trace,
        }
    }

    /// True only when the run consumed all input and stopped in an accept state
    pub fn is_accepted(&self) -> bool {
        self.accepted && self.error.is_none()
    }
}

impl DFA {
    /// Run the automaton over `input`, one character per symbol. The model is only read, so
    /// repeated runs without edits in between return identical reports.
    pub fn simulate(&self, input: &str) -> SimulationReport {
        let Some(start) = self.start_state() else {
            debug!("Simulation of '{}' aborted: no start state", input);
            return SimulationReport::failed(SimulationError::NoStartState, Vec::new());
        };

        let mut trace = vec![TraceStep::new(start.get_name(), TraceSymbol::Start, input)];
        let mut current = start;

        for (idx, ch) in input.char_indices() {
            let symbol = ch.to_string();

            if !self.alphabet().contains(&symbol) {
                debug!("Simulation of '{}' halted: '{}' not in alphabet", input, symbol);
                return SimulationReport::failed(
                    SimulationError::SymbolNotInAlphabet(symbol),
                    trace,
                );
            }

            let next = current
                .get_transition(&symbol)
                .and_then(|target| self.state(target));

            let Some(next) = next else {
                let error = SimulationError::NoTransitionDefined {
                    state: current.get_name().to_string(),
                    symbol: symbol.clone(),
                };

                let mut step = TraceStep::new(
                    current.get_name(),
                    TraceSymbol::Symbol(symbol),
                    &input[idx..],
                );
                step.error = Some(error.to_string());
                trace.push(step);

                debug!("Simulation of '{}' halted: {}", input, error);
                return SimulationReport::failed(error, trace);
            };

            debug!(
                "{} --{}--> {}",
                current.get_name(),
                symbol,
                next.get_name()
            );

            let remaining = &input[idx + ch.len_utf8()..];
            trace.push(TraceStep::new(
                next.get_name(),
                TraceSymbol::Symbol(symbol),
                remaining,
            ));
            current = next;
        }

        SimulationReport {
            accepted: current.is_accept(),
            error: None,
            final_state: Some(current.get_name().to_string()),
            trace,
        }
    }
}

impl DFA {
    /// Acceptance of `input` without building a trace. Agrees with `simulate(input).is_accepted()`.
    pub fn accepts(&self, input: &str) -> bool {
        let Some(mut current) = self.start_state() else {
            return false;
        };

        let mut buf = [0u8; 4];
        for ch in input.chars() {
            let symbol: &str = ch.encode_utf8(&mut buf);

            let next = current
                .get_transition(symbol)
                .and_then(|target| self.state(target));

            match next {
                Some(next) => current = next,
                None => return false,
            }
        }

        current.is_accept()
    }
}
