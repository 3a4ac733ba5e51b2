use std::collections::HashMap;

use eframe::{run_native, App, CreationContext, NativeOptions};
use egui::Color32;
use egui_graphs::{
    DefaultGraphView, Graph, SettingsInteraction, SettingsNavigation, SettingsStyle,
};
use petgraph::{graph::EdgeIndex, graph::NodeIndex, prelude::StableGraph};

use crate::fa::{StateId, FA};
use crate::generator::{GeneratedString, GenerationSummary};
use crate::simulation::SimulationReport;

/// Results shown next to the automaton graph
#[derive(Debug, Clone, Default)]
pub struct Results {
    pub runs: Vec<(String, SimulationReport)>,
    pub generated: Vec<GeneratedString>,
}

impl Results {
    /// Text lines of the results panel
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for (input, report) in self.runs.iter() {
            let verdict = if report.is_accepted() {
                "ACCEPTED"
            } else {
                "REJECTED"
            };
            let input = if input.is_empty() { "ε" } else { input.as_str() };
            lines.push(format!("{}: {}", input, verdict));

            for step in report.trace.iter() {
                lines.push(format!("    {}", step));
            }

            if let Some(error) = &report.error {
                lines.push(format!("    {}", error));
            }
        }

        if !self.generated.is_empty() {
            let summary = GenerationSummary::from_results(&self.generated);
            lines.extend(summary.to_string().lines().map(|line| line.to_string()));

            for result in self.generated.iter().filter(|result| result.accepted) {
                lines.push(format!("    {}", result.display_string()));
            }
        }

        lines
    }
}

struct Visualizer {
    graph: Graph,
    lines: Vec<String>,
}

impl Visualizer {
    fn new(_: &CreationContext<'_>, graph: Graph, lines: Vec<String>) -> Self {
        Visualizer { graph, lines }
    }
}

impl App for Visualizer {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        if !self.lines.is_empty() {
            egui::SidePanel::right("results").show(ctx, |ui| {
                ui.heading("Results");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for line in self.lines.iter() {
                        ui.monospace(line.as_str());
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let navigation_settings = &SettingsNavigation::new()
                .with_zoom_and_pan_enabled(true)
                .with_fit_to_screen_enabled(true);
            let interactive_settings = &SettingsInteraction::new()
                .with_dragging_enabled(true)
                .with_node_clicking_enabled(true)
                .with_node_selection_enabled(true)
                .with_edge_clicking_enabled(true)
                .with_edge_selection_enabled(true);
            let style_settings = &SettingsStyle::default().with_labels_always(true);
            ui.add(
                &mut DefaultGraphView::new(&mut self.graph)
                    .with_styles(style_settings)
                    .with_interactions(interactive_settings)
                    .with_navigations(navigation_settings),
            );
        });
    }
}

/// One entry per pair of connected states with the symbols of all transitions between them, in
/// alphabet order.
fn edge_labels<T: FA>(fa: &T) -> Vec<(StateId, StateId, String)> {
    let mut edges: Vec<(StateId, StateId, String)> = Vec::new();

    for id in fa.get_state_ids() {
        for (symbol, target) in fa.get_state_transitions(id) {
            let existing = edges
                .iter()
                .position(|(from, to, _)| *from == id && *to == target);

            match existing {
                Some(idx) => {
                    let label = &mut edges[idx].2;
                    label.push_str(", ");
                    label.push_str(symbol);
                }
                None => edges.push((id, target, symbol.to_string())),
            }
        }
    }

    edges
}

fn generate_stable_graph<T: FA>(fa: &T) -> Graph {
    let mut stable_graph = StableGraph::new();

    let state_ids = fa.get_state_ids();

    let start_node_color = Color32::from_rgb(20, 67, 130);
    let accept_node_color = Color32::from_rgb(20, 130, 90);

    let mut node_map: HashMap<StateId, NodeIndex> = HashMap::new();
    let mut edge_list: Vec<(EdgeIndex, String)> = Vec::new();

    for id in state_ids.iter() {
        let node = stable_graph.add_node(());
        node_map.insert(*id, node);
    }

    for (from, to, label) in edge_labels(fa) {
        let edge_idx = stable_graph.add_edge(node_map[&from], node_map[&to], ());
        edge_list.push((edge_idx, label));
    }

    let mut graph = Graph::from(&stable_graph);

    for (idx, accept) in fa.get_acceptor_states().iter().enumerate() {
        if *accept {
            if let Some(node) = graph.node_mut(node_map[&state_ids[idx]]) {
                node.set_color(accept_node_color);
            }
        }
    }

    if let Some(start) = fa.get_start_state() {
        if let Some(node) = graph.node_mut(node_map[&start]) {
            node.set_color(start_node_color);
        }
    }

    for id in state_ids.iter() {
        let node_label = fa.get_state_name(*id).unwrap_or_default().to_string();
        if let Some(node) = graph.node_mut(node_map[id]) {
            node.set_label(node_label);
        }
    }

    for (edge_idx, label) in edge_list {
        if let Some(edge) = graph.edge_mut(edge_idx) {
            edge.set_label(label);
        }
    }

    graph
}

/// Open a window showing the automaton and the results of its runs
pub fn visualize<T: FA>(fa: &T, results: &Results) -> color_eyre::Result<()> {
    let graph = generate_stable_graph(fa);
    let lines = results.lines();
    run_native(
        "dfa simulator",
        NativeOptions::default(),
        Box::new(|cc| Ok(Box::new(Visualizer::new(cc, graph, lines)))),
    )
    .map_err(|err| color_eyre::eyre::eyre!("Failed to open the visualizer: {}", err))
}
