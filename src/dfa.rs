/* Editable DFA model. States live in an arena addressed by StateId and transition tables store
 * target ids, so removing a state is a matter of scrubbing its id from every table. */

use crate::alphabet::Alphabet;
use crate::fa::{Position, StateId, FA};
use bitvec::prelude::*;
use log::{trace, warn};
use std::collections::{HashMap, VecDeque};

/// Radius given to every new state on the canvas
pub const DEFAULT_RADIUS: f32 = 30.0;

#[derive(Debug)]
pub struct DFA {
    states: Vec<DFAState>,
    start_state: Option<StateId>,
    alphabet: Alphabet,
    next_id: usize,
}

#[derive(Debug, Clone)]
pub struct DFAState {
    id: StateId,
    name: String,
    position: Position,
    radius: f32,
    is_start: bool,
    is_accept: bool,
    transitions: HashMap<String, StateId>,
}

impl DFAState {
    fn new(id: StateId, position: Position, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("q{}", id.0),
        };

        DFAState {
            id,
            name,
            position,
            radius: DEFAULT_RADIUS,
            is_start: false,
            is_accept: false,
            transitions: HashMap::new(),
        }
    }

    pub fn get_id(&self) -> StateId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_position(&self) -> Position {
        self.position
    }

    pub fn get_radius(&self) -> f32 {
        self.radius
    }

    pub fn is_start(&self) -> bool {
        self.is_start
    }

    pub fn is_accept(&self) -> bool {
        self.is_accept
    }

    /// Get the full transition table of the state
    pub fn get_transitions(&self) -> &HashMap<String, StateId> {
        &self.transitions
    }

    /// Get the target of the transition on `symbol`, if one is defined
    pub fn get_transition(&self, symbol: &str) -> Option<StateId> {
        self.transitions.get(symbol).copied()
    }

    fn contains_point(&self, x: f32, y: f32) -> bool {
        self.position.distance_to(x, y) <= self.radius
    }
}

impl Default for DFA {
    fn default() -> Self {
        Self::new()
    }
}

impl FA for DFA {
    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_state_ids(&self) -> Vec<StateId> {
        self.states.iter().map(|state| state.id).collect()
    }

    fn get_state_name(&self, id: StateId) -> Option<&str> {
        self.state(id).map(|state| state.get_name())
    }

    fn get_start_state(&self) -> Option<StateId> {
        self.start_state
    }

    fn get_alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> BitVec<u8> {
        self.states.iter().map(|state| state.is_accept).collect()
    }

    fn get_state_transitions(&self, id: StateId) -> Vec<(&str, StateId)> {
        let Some(state) = self.state(id) else {
            return Vec::new();
        };

        self.alphabet
            .iter()
            .filter_map(|symbol| {
                state
                    .transitions
                    .get(symbol)
                    .map(|target| (symbol.as_str(), *target))
            })
            .collect()
    }
}

impl DFA {
    pub fn new() -> Self {
        DFA {
            states: Vec::new(),
            start_state: None,
            alphabet: Alphabet::new(),
            next_id: 0,
        }
    }

    /// Drop every state, the alphabet and the start state, and restart id allocation at 0.
    pub fn reset(&mut self) {
        *self = DFA::new();
    }

    fn index_of(&self, id: StateId) -> Option<usize> {
        self.states.iter().position(|state| state.id == id)
    }

    /// Create a new state at `position`. The name defaults to `q<id>`.
    pub fn add_state(&mut self, position: Position, name: Option<&str>) -> StateId {
        let id = StateId(self.next_id);
        self.next_id += 1;

        let state = DFAState::new(id, position, name);
        trace!("Added state {} ({})", state.name, id);
        self.states.push(state);
        id
    }

    /// Remove a state along with every transition pointing at it. Unknown ids are ignored.
    pub fn remove_state(&mut self, id: StateId) {
        let Some(index) = self.index_of(id) else {
            return;
        };

        if self.start_state == Some(id) {
            self.start_state = None;
        }

        for state in self.states.iter_mut() {
            state.transitions.retain(|_, target| *target != id);
        }

        let removed = self.states.remove(index);
        trace!("Removed state {} ({})", removed.name, id);
    }

    /// Find the topmost state covering the point. Later states are drawn above earlier ones, so
    /// the search runs from the most recently added state backwards.
    pub fn state_at(&self, x: f32, y: f32) -> Option<StateId> {
        self.states
            .iter()
            .rev()
            .find(|state| state.contains_point(x, y))
            .map(|state| state.id)
    }

    /// Record `from --symbol--> to`, replacing any previous target for `symbol`. Rejected when the
    /// symbol is outside the alphabet or either state does not exist.
    pub fn add_transition(&mut self, from: StateId, to: StateId, symbol: &str) -> bool {
        if !self.alphabet.contains(symbol) {
            warn!("Rejected transition on '{}': not in alphabet {}", symbol, self.alphabet);
            return false;
        }

        if self.index_of(to).is_none() {
            warn!("Rejected transition to unknown state {}", to);
            return false;
        }

        let Some(index) = self.index_of(from) else {
            warn!("Rejected transition from unknown state {}", from);
            return false;
        };

        let state = &mut self.states[index];
        state.transitions.insert(symbol.to_string(), to);
        trace!("Added transition {} --{}--> {}", from, symbol, to);
        true
    }

    pub fn remove_transition(&mut self, from: StateId, symbol: &str) {
        if let Some(index) = self.index_of(from) {
            self.states[index].transitions.remove(symbol);
        }
    }

    /// Replace the alphabet. Transitions on symbols that are no longer part of it are deleted.
    /// Symbols that are not a single character are ignored.
    pub fn set_alphabet<I, S>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        for symbol in symbols.iter() {
            if !Alphabet::is_valid_symbol(symbol) {
                warn!("Ignored alphabet symbol '{}': not a single character", symbol);
            }
        }
        self.alphabet = Alphabet::from_symbols(symbols);

        let alphabet = &self.alphabet;
        let mut pruned = 0;

        for state in self.states.iter_mut() {
            let before = state.transitions.len();
            state
                .transitions
                .retain(|symbol, _| alphabet.contains(symbol));
            pruned += before - state.transitions.len();
        }

        if pruned > 0 {
            warn!(
                "Alphabet changed to {}, pruned {} transitions",
                self.alphabet, pruned
            );
        } else {
            trace!("Alphabet changed to {}", self.alphabet);
        }
    }

    /// Make `id` the start state, or clear the start state with `None`. Returns false, leaving
    /// the automaton untouched, if the id is unknown.
    pub fn set_start_state(&mut self, id: Option<StateId>) -> bool {
        if let Some(id) = id {
            if self.index_of(id).is_none() {
                return false;
            }
        }

        for state in self.states.iter_mut() {
            state.is_start = Some(state.id) == id;
        }
        self.start_state = id;
        true
    }

    pub fn set_accept(&mut self, id: StateId, is_accept: bool) -> bool {
        match self.state_mut(id) {
            Some(state) => {
                state.is_accept = is_accept;
                true
            }
            None => false,
        }
    }

    pub fn set_name(&mut self, id: StateId, name: &str) -> bool {
        match self.state_mut(id) {
            Some(state) => {
                state.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn move_state(&mut self, id: StateId, position: Position) -> bool {
        match self.state_mut(id) {
            Some(state) => {
                state.position = position;
                true
            }
            None => false,
        }
    }

    fn state_mut(&mut self, id: StateId) -> Option<&mut DFAState> {
        self.states.iter_mut().find(|state| state.id == id)
    }

    /// Returns the state whose id is provided
    pub fn state(&self, id: StateId) -> Option<&DFAState> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Returns all states in the order they were added
    pub fn states(&self) -> &[DFAState] {
        &self.states
    }

    /// First state carrying `name`, in insertion order
    pub fn find_by_name(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .find(|state| state.name == name)
            .map(|state| state.id)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn start_state(&self) -> Option<&DFAState> {
        self.start_state.and_then(|id| self.state(id))
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// States reachable from the start state, one bit per state in insertion order. Empty when
    /// there is no start state.
    pub fn reachable_states(&self) -> BitVec<u8> {
        let mut visited: BitVec<u8, Lsb0> = BitVec::repeat(false, self.states.len());

        let Some(start) = self.start_state else {
            return visited;
        };

        let mut stack: VecDeque<StateId> = VecDeque::new();
        stack.push_front(start);

        while let Some(id) = stack.pop_front() {
            let Some(index) = self.index_of(id) else {
                continue;
            };

            if visited[index] {
                continue;
            }
            visited.set(index, true);

            for target in self.states[index].transitions.values() {
                stack.push_front(*target);
            }
        }

        visited
    }

    /// Whether every state has a transition for every symbol of the alphabet
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|state| {
            self.alphabet
                .iter()
                .all(|symbol| state.transitions.contains_key(symbol))
        })
    }
}

#[cfg(test)]
mod dfa_tests {
    use super::*;

    fn origin() -> Position {
        Position::new(0.0, 0.0)
    }

    #[test]
    fn test_dfa_state_creation() {
        let mut dfa = DFA::new();
        let id = dfa.add_state(Position::new(10.0, 20.0), None);
        let state = dfa.state(id).unwrap();

        assert_eq!(state.get_name(), "q0");
        assert_eq!(state.get_position(), Position::new(10.0, 20.0));
        assert_eq!(state.get_radius(), DEFAULT_RADIUS);
        assert!(!state.is_start());
        assert!(!state.is_accept());
        assert_eq!(state.get_transitions().len(), 0);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), Some("custom"));
        dfa.remove_state(s1);
        let s2 = dfa.add_state(origin(), None);

        assert_eq!(s0, StateId(0));
        assert_eq!(s2, StateId(2));
        assert_eq!(dfa.state(s2).unwrap().get_name(), "q2");
        assert_eq!(dfa.get_num_states(), 2);
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a"]);
        dfa.add_state(origin(), None);
        dfa.add_state(origin(), None);
        dfa.reset();

        assert_eq!(dfa.num_states(), 0);
        assert!(dfa.alphabet().is_empty());
        assert_eq!(dfa.add_state(origin(), None), StateId(0));
    }

    #[test]
    fn test_transition_requires_alphabet_symbol() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);

        assert!(!dfa.add_transition(s0, s1, "b"));
        assert!(dfa.state(s0).unwrap().get_transitions().is_empty());

        assert!(dfa.add_transition(s0, s1, "a"));
        assert_eq!(dfa.state(s0).unwrap().get_transition("a"), Some(s1));
    }

    #[test]
    fn test_transition_rejects_unknown_states() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a"]);
        let s0 = dfa.add_state(origin(), None);

        assert!(!dfa.add_transition(s0, StateId(7), "a"));
        assert!(!dfa.add_transition(StateId(7), s0, "a"));
    }

    #[test]
    fn test_transition_overwrite_keeps_determinism() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);
        let s2 = dfa.add_state(origin(), None);

        assert!(dfa.add_transition(s0, s1, "a"));
        assert!(dfa.add_transition(s0, s2, "a"));

        let transitions = dfa.get_state_transitions(s0);
        assert_eq!(transitions, vec![("a", s2)]);
    }

    #[test]
    fn test_remove_transition() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a", "b"]);
        let s0 = dfa.add_state(origin(), None);

        assert!(dfa.add_transition(s0, s0, "a"));
        dfa.remove_transition(s0, "a");
        dfa.remove_transition(s0, "b");
        dfa.remove_transition(StateId(42), "a");

        assert!(dfa.state(s0).unwrap().get_transitions().is_empty());
    }

    #[test]
    fn test_alphabet_change_prunes_transitions() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a", "b", "c"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);

        dfa.add_transition(s0, s1, "a");
        dfa.add_transition(s0, s1, "b");
        dfa.add_transition(s1, s0, "c");

        dfa.set_alphabet(["b", "d"]);

        for state in dfa.states() {
            for symbol in state.get_transitions().keys() {
                assert!(dfa.alphabet().contains(symbol));
            }
        }
        assert_eq!(dfa.get_state_transitions(s0), vec![("b", s1)]);
        assert!(dfa.get_state_transitions(s1).is_empty());
    }

    #[test]
    fn test_multi_character_symbols_are_not_transitions() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["ab", "c"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);

        assert_eq!(dfa.alphabet().symbols(), &["c"]);
        assert!(!dfa.add_transition(s0, s1, "ab"));
        assert!(dfa.add_transition(s0, s1, "c"));
    }

    #[test]
    fn test_remove_state_scrubs_incoming_transitions() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["0", "1"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);
        let s2 = dfa.add_state(origin(), None);

        dfa.set_start_state(Some(s0));
        dfa.add_transition(s0, s1, "0");
        dfa.add_transition(s0, s2, "1");
        dfa.add_transition(s2, s1, "1");
        dfa.add_transition(s1, s1, "0");

        dfa.remove_state(s1);

        assert!(dfa.state(s1).is_none());
        for state in dfa.states() {
            assert!(state.get_transitions().values().all(|target| *target != s1));
        }
        assert_eq!(dfa.get_state_transitions(s0), vec![("1", s2)]);
        assert_eq!(dfa.get_start_state(), Some(s0));
    }

    #[test]
    fn test_remove_start_state_clears_start() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);
        dfa.set_start_state(Some(s0));

        dfa.remove_state(s0);

        assert_eq!(dfa.get_start_state(), None);
        assert!(dfa.start_state().is_none());
    }

    #[test]
    fn test_remove_unknown_state_is_noop() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);
        dfa.set_start_state(Some(s0));

        dfa.remove_state(StateId(99));

        assert_eq!(dfa.num_states(), 1);
        assert_eq!(dfa.get_start_state(), Some(s0));
    }

    #[test]
    fn test_single_start_flag() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);

        assert!(dfa.set_start_state(Some(s0)));
        assert!(dfa.set_start_state(Some(s1)));

        let starts: Vec<StateId> = dfa
            .states()
            .iter()
            .filter(|state| state.is_start())
            .map(|state| state.get_id())
            .collect();
        assert_eq!(starts, vec![s1]);
        assert_eq!(dfa.get_start_state(), Some(s1));

        assert!(!dfa.set_start_state(Some(StateId(5))));
        assert_eq!(dfa.get_start_state(), Some(s1));

        assert!(dfa.set_start_state(None));
        assert!(dfa.states().iter().all(|state| !state.is_start()));
    }

    #[test]
    fn test_state_at_prefers_latest_state() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(Position::new(0.0, 0.0), None);
        let s1 = dfa.add_state(Position::new(20.0, 0.0), None);

        assert_eq!(dfa.state_at(10.0, 0.0), Some(s1));
        assert_eq!(dfa.state_at(-25.0, 0.0), Some(s0));
        assert_eq!(dfa.state_at(0.0, DEFAULT_RADIUS), Some(s0));
        assert_eq!(dfa.state_at(200.0, 200.0), None);

        dfa.move_state(s0, Position::new(300.0, 300.0));
        assert_eq!(dfa.state_at(-25.0, 0.0), None);
        assert_eq!(dfa.state_at(300.0, 310.0), Some(s0));
    }

    #[test]
    fn test_flag_and_name_edits() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);

        assert!(dfa.set_accept(s0, true));
        assert!(dfa.set_name(s0, "even"));
        assert!(!dfa.set_accept(StateId(3), true));
        assert!(!dfa.set_name(StateId(3), "odd"));

        let state = dfa.state(s0).unwrap();
        assert!(state.is_accept());
        assert_eq!(state.get_name(), "even");
        assert_eq!(dfa.find_by_name("even"), Some(s0));
        assert_eq!(dfa.find_by_name("q0"), None);
    }

    #[test]
    fn test_acceptor_states_follow_state_order() {
        let mut dfa = DFA::new();
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);
        let s2 = dfa.add_state(origin(), None);
        dfa.set_accept(s2, true);
        dfa.remove_state(s0);

        let accepts = dfa.get_acceptor_states();
        assert_eq!(accepts.len(), 2);
        assert!(!accepts[0]);
        assert!(accepts[1]);
        assert_eq!(dfa.get_state_ids(), vec![s1, s2]);
    }

    #[test]
    fn test_reachable_states() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a"]);
        let s0 = dfa.add_state(origin(), None);
        let s1 = dfa.add_state(origin(), None);
        let s2 = dfa.add_state(origin(), None);

        assert!(dfa.reachable_states().not_any());

        dfa.set_start_state(Some(s0));
        dfa.add_transition(s0, s1, "a");
        dfa.add_transition(s1, s0, "a");
        dfa.add_transition(s2, s0, "a");

        let reachable: Vec<usize> = dfa.reachable_states().iter_ones().collect();
        assert_eq!(reachable, vec![0, 1]);
    }

    #[test]
    fn test_is_complete() {
        let mut dfa = DFA::new();
        dfa.set_alphabet(["a", "b"]);
        let s0 = dfa.add_state(origin(), None);

        dfa.add_transition(s0, s0, "a");
        assert!(!dfa.is_complete());

        dfa.add_transition(s0, s0, "b");
        assert!(dfa.is_complete());
    }
}
