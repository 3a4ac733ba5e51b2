//! # dfasim
//!
//! A library for building deterministic finite automata by hand and exercising them.
//!
//! This library provides functionality to:
//! - Create, move, rename and remove states and the transitions between them
//! - Change the alphabet, pruning transitions that no longer fit it
//! - Simulate an input string and obtain a step by step trace of the run
//! - Enumerate every string up to a given length and classify it as accepted or rejected
//! - Export the automaton to Graphviz or view it in an interactive window

// Re-export the modules
pub mod alphabet;
pub mod config;
pub mod dfa;
pub mod fa;
pub mod generator;
pub mod simulation;
pub mod visualizer;

// Re-export commonly used items for convenience
pub use alphabet::Alphabet;
pub use config::{parse_alphabet, AutomatonConfig};
pub use dfa::{DFAState, DFA};
pub use fa::{Position, StateId, FA};
pub use generator::{enumeration_size, GeneratedString, GenerationSummary};
pub use simulation::{SimulationError, SimulationReport, TraceStep, TraceSymbol};
