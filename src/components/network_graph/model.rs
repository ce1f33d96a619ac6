//! Raw evaluation dataset to sized, colored and styled visual descriptors.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::types::{NodeId, RawDataset, RawNode};

pub const GHOST_NODE_SIZE: f64 = 8.0;
pub const BASE_NODE_SIZE: f64 = 10.0;
pub const DEGREE_SIZE_SCALE: f64 = 3.0;

pub const GHOST_FILL: &str = "rgba(230,230,230,0.5)";
pub const GHOST_BORDER: &str = "rgba(150,150,150,0.5)";
pub const GHOST_HIGHLIGHT_FILL: &str = "#eee";
pub const GHOST_HIGHLIGHT_BORDER: &str = "#999";
pub const GHOST_BORDER_DASH: [f64; 2] = [4.0, 4.0];
pub const GHOST_OPACITY: f64 = 0.6;
pub const NODE_HIGHLIGHT_BORDER: &str = "#333";
pub const NODE_OPACITY: f64 = 1.0;

pub const FONT_SIZE: f64 = 11.0;
pub const GHOST_FONT_COLOR: &str = "#999";
pub const FONT_COLOR: &str = "#333";
pub const FONT_STROKE_WIDTH: f64 = 2.0;
pub const FONT_STROKE_COLOR: &str = "#ffffff";

pub const DASHED_EDGE_COLOR: &str = "#ccc";
pub const SOLID_EDGE_COLOR: &str = "#bbb";
pub const EDGE_HIGHLIGHT_COLOR: &str = "#002D80";
pub const EDGE_OPACITY: f64 = 0.6;
pub const EDGE_WIDTH: f64 = 1.0;
pub const ARROW_SCALE: f64 = 0.4;
pub const EDGE_ROUNDNESS: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeHighlight {
	pub background: String,
	pub border: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
	pub id: NodeId,
	pub label: String,
	pub title: String,
	pub size: f64,
	pub base_color: String,
	pub border_color: String,
	pub highlight: NodeHighlight,
	pub font_size: f64,
	pub base_font_color: String,
	pub stroke_width: f64,
	pub stroke_color: String,
	pub dashed_border: bool,
	pub base_opacity: f64,
	/// Live value, patched by focus transitions.
	pub opacity: f64,
	/// Live value, patched by focus transitions.
	pub font_color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
	pub from: NodeId,
	pub to: NodeId,
	pub dashed: bool,
	pub width: f64,
	pub base_color: String,
	pub highlight_color: String,
	pub base_opacity: f64,
	/// Live value, patched by focus transitions.
	pub opacity: f64,
	pub arrow_enabled: bool,
	pub arrow_scale: f64,
	pub roundness: f64,
}

/// Edge endpoint occurrences per node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DegreeIndex(HashMap<NodeId, usize>);

impl DegreeIndex {
	pub fn get(&self, id: &str) -> usize {
		self.0.get(id).copied().unwrap_or(0)
	}

	pub fn total(&self) -> usize {
		self.0.values().sum()
	}
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	pub nodes: Vec<VisualNode>,
	pub edges: Vec<VisualEdge>,
	pub degrees: DegreeIndex,
	/// Edges dropped because an endpoint is not a known node.
	pub dropped_edges: usize,
}

/// Isolated nodes are sized as if they had one connection.
pub fn node_size(is_ghost: bool, degree: usize) -> f64 {
	if is_ghost {
		GHOST_NODE_SIZE
	} else {
		BASE_NODE_SIZE + (degree.max(1) as f64).sqrt() * DEGREE_SIZE_SCALE
	}
}

pub fn build(dataset: &RawDataset) -> GraphModel {
	if dataset.is_empty() {
		return GraphModel::default();
	}

	let mut known: HashSet<&str> = HashSet::with_capacity(dataset.nodes.len());
	let mut unique_nodes: Vec<&RawNode> = Vec::with_capacity(dataset.nodes.len());
	for node in &dataset.nodes {
		if known.insert(node.id.as_str()) {
			unique_nodes.push(node);
		} else {
			warn!("duplicate node id {:?} in network payload, keeping the first", node.id);
		}
	}

	let mut degrees: HashMap<NodeId, usize> =
		unique_nodes.iter().map(|n| (n.id.clone(), 0)).collect();
	let mut edges = Vec::with_capacity(dataset.edges.len());
	let mut dropped_edges = 0;

	for edge in &dataset.edges {
		if !known.contains(edge.from.as_str()) || !known.contains(edge.to.as_str()) {
			warn!(
				"dropping edge {} -> {}: endpoint is not a node of this network",
				edge.from, edge.to
			);
			dropped_edges += 1;
			continue;
		}
		for endpoint in [&edge.from, &edge.to] {
			if let Some(count) = degrees.get_mut(endpoint) {
				*count += 1;
			}
		}
		edges.push(VisualEdge {
			from: edge.from.clone(),
			to: edge.to.clone(),
			dashed: edge.dashes,
			width: EDGE_WIDTH,
			base_color: (if edge.dashes { DASHED_EDGE_COLOR } else { SOLID_EDGE_COLOR }).into(),
			highlight_color: EDGE_HIGHLIGHT_COLOR.into(),
			base_opacity: EDGE_OPACITY,
			opacity: EDGE_OPACITY,
			arrow_enabled: true,
			arrow_scale: ARROW_SCALE,
			roundness: EDGE_ROUNDNESS,
		});
	}

	let degrees = DegreeIndex(degrees);
	let nodes: Vec<VisualNode> = unique_nodes
		.into_iter()
		.map(|node| visual_node(node, degrees.get(&node.id)))
		.collect();

	debug_assert_eq!(degrees.total(), 2 * edges.len());
	debug_assert_eq!(degrees.0.len(), nodes.len());

	GraphModel {
		nodes,
		edges,
		degrees,
		dropped_edges,
	}
}

fn visual_node(node: &RawNode, degree: usize) -> VisualNode {
	let size = node_size(node.is_ghost, degree);
	let (fill, border, highlight, font, opacity) = if node.is_ghost {
		(
			GHOST_FILL.to_string(),
			GHOST_BORDER.to_string(),
			NodeHighlight {
				background: GHOST_HIGHLIGHT_FILL.into(),
				border: GHOST_HIGHLIGHT_BORDER.into(),
			},
			GHOST_FONT_COLOR,
			GHOST_OPACITY,
		)
	} else {
		let color = node.fill_color().to_string();
		(
			color.clone(),
			color.clone(),
			NodeHighlight {
				background: color,
				border: NODE_HIGHLIGHT_BORDER.into(),
			},
			FONT_COLOR,
			NODE_OPACITY,
		)
	};

	VisualNode {
		id: node.id.clone(),
		label: node.label.clone(),
		title: node.title.clone(),
		size,
		base_color: fill,
		border_color: border,
		highlight,
		font_size: FONT_SIZE,
		base_font_color: font.into(),
		stroke_width: FONT_STROKE_WIDTH,
		stroke_color: FONT_STROKE_COLOR.into(),
		dashed_border: node.is_ghost,
		base_opacity: opacity,
		opacity,
		font_color: font.into(),
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::network_graph::types::RawEdge;
	use pretty_assertions::assert_eq;

	pub(crate) fn node(id: &str, color: &str, is_ghost: bool) -> RawNode {
		RawNode {
			id: id.into(),
			label: id.into(),
			title: format!("Name: {id}"),
			color: Some(color.into()),
			is_ghost,
		}
	}

	pub(crate) fn edge(from: &str, to: &str) -> RawEdge {
		RawEdge {
			from: from.into(),
			to: to.into(),
			dashes: false,
		}
	}

	/// A evaluates B (external) and C.
	pub(crate) fn triangle_dataset() -> RawDataset {
		RawDataset {
			nodes: vec![
				node("A", "#e41a1c", false),
				node("B", "#000000", true),
				node("C", "#377eb8", false),
			],
			edges: vec![
				RawEdge {
					dashes: true,
					..edge("A", "B")
				},
				edge("A", "C"),
			],
			..Default::default()
		}
	}

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-2
	}

	#[test]
	fn degrees_and_sizes_of_small_network() {
		let model = build(&triangle_dataset());
		assert_eq!(model.degrees.get("A"), 2);
		assert_eq!(model.degrees.get("B"), 1);
		assert_eq!(model.degrees.get("C"), 1);

		let sizes: Vec<f64> = model.nodes.iter().map(|n| n.size).collect();
		assert!(approx(sizes[0], 14.24), "A was {}", sizes[0]);
		assert_eq!(sizes[1], GHOST_NODE_SIZE);
		assert!(approx(sizes[2], 13.0), "C was {}", sizes[2]);
	}

	#[test]
	fn degree_sum_is_twice_edge_count() {
		let mut data = triangle_dataset();
		data.edges.push(edge("A", "C"));
		data.edges.push(edge("C", "C"));
		let model = build(&data);
		assert_eq!(model.edges.len(), 4);
		assert_eq!(model.degrees.total(), 8);
		assert_eq!(model.degrees.get("C"), 4);
	}

	#[test]
	fn isolated_nodes_are_sized_as_degree_one() {
		let data = RawDataset {
			nodes: vec![node("x", "#111", false), node("y", "#222", false)],
			..Default::default()
		};
		let model = build(&data);
		assert_eq!(model.degrees.get("x"), 0);
		assert_eq!(model.nodes[0].size, node_size(false, 1));
		assert_eq!(model.nodes[1].size, 13.0);
	}

	#[test]
	fn size_grows_with_degree_except_for_ghosts() {
		let mut last = 0.0;
		for degree in 0..50 {
			let size = node_size(false, degree);
			assert!(size >= last);
			last = size;
			assert_eq!(node_size(true, degree), GHOST_NODE_SIZE);
		}
	}

	#[test]
	fn ghost_styling_ignores_payload_color() {
		let model = build(&triangle_dataset());
		let ghost = &model.nodes[1];
		assert_eq!(ghost.base_color, GHOST_FILL);
		assert_eq!(ghost.border_color, GHOST_BORDER);
		assert!(ghost.dashed_border);
		assert_eq!(ghost.base_opacity, GHOST_OPACITY);
		assert_eq!(ghost.font_color, GHOST_FONT_COLOR);

		let member = &model.nodes[0];
		assert_eq!(member.base_color, "#e41a1c");
		assert_eq!(member.border_color, "#e41a1c");
		assert_eq!(member.highlight.border, NODE_HIGHLIGHT_BORDER);
		assert!(!member.dashed_border);
		assert_eq!(member.opacity, 1.0);
		assert_eq!(member.font_color, FONT_COLOR);
		assert_eq!(member.stroke_color, FONT_STROKE_COLOR);
	}

	#[test]
	fn edge_styling_follows_dashes() {
		let model = build(&triangle_dataset());
		assert!(model.edges[0].dashed);
		assert_eq!(model.edges[0].base_color, DASHED_EDGE_COLOR);
		assert_eq!(model.edges[1].base_color, SOLID_EDGE_COLOR);
		for edge in &model.edges {
			assert_eq!(edge.opacity, EDGE_OPACITY);
			assert!(edge.arrow_enabled);
		}
	}

	#[test]
	fn dangling_edges_are_dropped() {
		let mut data = triangle_dataset();
		data.edges.push(edge("A", "nobody"));
		let model = build(&data);
		assert_eq!(model.dropped_edges, 1);
		assert_eq!(model.edges.len(), 2);
		assert_eq!(model.degrees.get("A"), 2);
		assert_eq!(model.degrees.get("nobody"), 0);
	}

	#[test]
	fn duplicate_nodes_keep_the_first() {
		let mut data = triangle_dataset();
		data.nodes.push(node("A", "#ffffff", false));
		let model = build(&data);
		assert_eq!(model.nodes.len(), 3);
		assert_eq!(model.nodes[0].base_color, "#e41a1c");
	}

	#[test]
	fn empty_dataset_builds_empty_model() {
		let model = build(&RawDataset::default());
		assert!(model.nodes.is_empty());
		assert!(model.edges.is_empty());
		assert_eq!(model.degrees.total(), 0);
	}

	#[test]
	fn build_is_deterministic() {
		let data = triangle_dataset();
		let (a, b) = (build(&data), build(&data));
		assert_eq!(a.nodes, b.nodes);
		assert_eq!(a.edges, b.edges);
		assert_eq!(a.degrees, b.degrees);
	}
}
