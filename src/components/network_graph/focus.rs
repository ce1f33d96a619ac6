//! Which node, if any, the user has isolated, and the fades that go with it.

use std::collections::HashSet;

use log::debug;

use super::surface::{EdgePatch, Neighborhood, NodePatch, RenderSurface};
use super::types::NodeId;

pub const RELEVANT_OPACITY: f64 = 1.0;
pub const DIMMED_NODE_OPACITY: f64 = 0.1;
pub const DIMMED_EDGE_OPACITY: f64 = 0.05;
pub const HIDDEN_FONT_COLOR: &str = "rgba(0,0,0,0)";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FocusState {
	#[default]
	Idle,
	Focused(NodeId),
}

impl FocusState {
	pub fn focused(&self) -> Option<&str> {
		match self {
			FocusState::Idle => None,
			FocusState::Focused(id) => Some(id),
		}
	}
}

/// Applies a selection event and returns the state the graph is now in.
///
/// Selecting a node that is not part of the current graph (a stale event from before the data
/// was replaced) behaves like selecting empty canvas.
pub fn select<S: RenderSurface + ?Sized>(
	state: FocusState,
	target: Option<&str>,
	surface: &mut S,
) -> FocusState {
	let focus = target.and_then(|id| surface.neighbors_of(id).map(|hood| (id, hood)));
	match (state, focus) {
		(FocusState::Idle, None) => FocusState::Idle,
		(_, None) => {
			if let Some(id) = target {
				debug!("ignoring selection of {id}, not in the current graph");
			}
			let (nodes, edges) = reset_patch(surface);
			surface.patch(&nodes, &edges);
			FocusState::Idle
		}
		(_, Some((id, hood))) => {
			debug!("focusing {id} with {} neighbors", hood.node_ids.len());
			let (nodes, edges) = focus_patch(surface, id, &hood);
			surface.patch(&nodes, &edges);
			FocusState::Focused(id.to_owned())
		}
	}
}

pub fn focus_patch<S: RenderSurface + ?Sized>(
	surface: &S,
	id: &str,
	hood: &Neighborhood,
) -> (Vec<NodePatch>, Vec<EdgePatch>) {
	let relevant: HashSet<&str> = hood
		.node_ids
		.iter()
		.map(String::as_str)
		.chain(std::iter::once(id))
		.collect();

	let nodes = surface
		.nodes()
		.iter()
		.map(|node| {
			let keep = relevant.contains(node.id.as_str());
			NodePatch {
				id: node.id.clone(),
				opacity: if keep { RELEVANT_OPACITY } else { DIMMED_NODE_OPACITY },
				font_color: if keep {
					node.base_font_color.clone()
				} else {
					HIDDEN_FONT_COLOR.into()
				},
			}
		})
		.collect();

	let edges = (0..surface.edges().len())
		.map(|edge_id| EdgePatch {
			id: edge_id,
			opacity: if hood.edge_ids.contains(&edge_id) {
				RELEVANT_OPACITY
			} else {
				DIMMED_EDGE_OPACITY
			},
		})
		.collect();

	(nodes, edges)
}

/// Back to the values the model builder assigned.
pub fn reset_patch<S: RenderSurface + ?Sized>(surface: &S) -> (Vec<NodePatch>, Vec<EdgePatch>) {
	let nodes = surface
		.nodes()
		.iter()
		.map(|node| NodePatch {
			id: node.id.clone(),
			opacity: node.base_opacity,
			font_color: node.base_font_color.clone(),
		})
		.collect();
	let edges = surface
		.edges()
		.iter()
		.enumerate()
		.map(|(edge_id, edge)| EdgePatch {
			id: edge_id,
			opacity: edge.base_opacity,
		})
		.collect();
	(nodes, edges)
}
