use crate::alphabet::Alphabet;
use bitvec::prelude::BitVec;
use color_eyre::eyre::{Report, Result};
use log::info;
use petgraph::dot::Dot;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::prelude::StableGraph;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::process::Command;

/// Stable identity of a state. Ids are handed out by the owning automaton and never reused until
/// the automaton is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Centre of a state on the editing canvas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug)]
pub enum RenderError {
    DotWriteError(String),
    GraphvizError(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DotWriteError(reason) => {
                write!(f, "Error: Failed to write dot file: {}", reason)
            }
            RenderError::GraphvizError(reason) => {
                write!(f, "Error: Failed to execute Graphviz: {}", reason)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Read-only view of a finite automaton, consumed by the renderers.
pub trait FA {
    fn get_num_states(&self) -> usize;
    /// State ids in display order
    fn get_state_ids(&self) -> Vec<StateId>;
    fn get_state_name(&self, id: StateId) -> Option<&str>;
    fn get_start_state(&self) -> Option<StateId>;
    fn get_alphabet(&self) -> &Alphabet;
    /// One bit per state, in the order of `get_state_ids`
    fn get_acceptor_states(&self) -> BitVec<u8>;
    /// Outgoing transitions of a state, ordered by the alphabet
    fn get_state_transitions(&self, id: StateId) -> Vec<(&str, StateId)>;

    /// Write the automaton as a dot file and render it to `<file_name>.jpg` with Graphviz.
    fn show_fa(&self, file_name: &str) -> Result<()>
    where
        Self: Sized,
    {
        let dot_filename = format!("{}.dot", file_name);

        let mut dot_file = File::create(&dot_filename)
            .map_err(|err| Report::new(RenderError::DotWriteError(err.to_string())))?;

        dot_file
            .write_all(to_dot(self).as_bytes())
            .map_err(|err| Report::new(RenderError::DotWriteError(err.to_string())))?;

        let output = Command::new("dot")
            .args(["-Tjpg", &dot_filename, "-o", &format!("{}.jpg", file_name)])
            .output()
            .map_err(|err| Report::new(RenderError::GraphvizError(err.to_string())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(Report::new(RenderError::GraphvizError(stderr)));
        }

        info!("Automaton visualization saved as {}.jpg", file_name);
        Ok(())
    }
}

fn node_label<T: FA>(fa: &T, id: StateId, is_accept: bool) -> String {
    let name = fa.get_state_name(id).unwrap_or_default();
    let is_start = fa.get_start_state() == Some(id);

    match (is_start, is_accept) {
        (true, true) => format!("Start\nAccept\n{}", name),
        (true, false) => format!("Start\n{}", name),
        (false, true) => format!("Accept\n{}", name),
        (false, false) => name.to_string(),
    }
}

/// Render the automaton in Graphviz dot syntax. Parallel transitions between the same pair of
/// states share one edge whose label lists the symbols in alphabet order.
pub fn to_dot<T: FA>(fa: &T) -> String {
    let mut stable_graph: StableGraph<String, String> = StableGraph::new();

    let state_ids = fa.get_state_ids();
    let accept_states = fa.get_acceptor_states();

    let mut node_map: HashMap<StateId, NodeIndex> = HashMap::new();
    let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();

    for (idx, id) in state_ids.iter().enumerate() {
        let is_accept = accept_states.get(idx).map(|bit| *bit).unwrap_or(false);
        let node = stable_graph.add_node(node_label(fa, *id, is_accept));
        node_map.insert(*id, node);
    }

    for id in state_ids.iter() {
        let source = node_map[id];

        for (symbol, target) in fa.get_state_transitions(*id) {
            let Some(&target) = node_map.get(&target) else {
                continue;
            };

            match edge_map.get(&(source, target)) {
                Some(edge_idx) => {
                    let old_label = &stable_graph[*edge_idx];
                    stable_graph[*edge_idx] = format!("{}, {}", old_label, symbol);
                }
                None => {
                    let edge_idx = stable_graph.add_edge(source, target, symbol.to_string());
                    edge_map.insert((source, target), edge_idx);
                }
            }
        }
    }

    Dot::new(&stable_graph).to_string()
}
