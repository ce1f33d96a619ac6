use std::collections::{BTreeSet, HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::model::{VisualEdge, VisualNode};
use super::types::{EdgeId, NodeId};

pub const NODE_MASS: f32 = 10.0;
/// Pick tolerance around a node's drawn radius, in world units.
pub const HIT_SLOP: f64 = 2.0;
const STABILIZATION_DT: f32 = 0.016;
const STABILIZATION_STEPS_PER_FRAME: usize = 10;

/// Tunables of the force-directed layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Charge pushing every pair of nodes apart.
	pub repulsion: f32,
	/// Share of its distance to the origin a node is pulled back per second.
	pub central_gravity: f32,
	/// Length at which an edge spring is at rest.
	pub spring_length: f32,
	pub spring_stiffness: f32,
	/// Share of velocity lost per simulation step.
	pub damping: f32,
	/// Simulation steps run ahead of the regular frame ticks after new data is set.
	pub stabilization_iterations: usize,
	pub max_force: f32,
	pub node_speed: f32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			repulsion: 150.0,
			central_gravity: 0.3,
			spring_length: 95.0,
			spring_stiffness: 0.04,
			damping: 0.09,
			stabilization_iterations: 200,
			max_force: 100.0,
			node_speed: 3000.0,
		}
	}
}

impl LayoutConfig {
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.repulsion,
			force_spring: self.spring_stiffness,
			force_max: self.max_force,
			node_speed: self.node_speed,
			damping_factor: 1.0 - self.damping.clamp(0.0, 1.0),
		}
	}

	/// Radius of the ring new nodes are seeded on.
	fn seed_radius(&self, node_count: usize) -> f64 {
		(self.spring_length as f64 * (node_count as f64).sqrt() / 2.0).max(100.0)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
	pub node_ids: HashSet<NodeId>,
	pub edge_ids: HashSet<EdgeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodePatch {
	pub id: NodeId,
	pub opacity: f64,
	pub font_color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgePatch {
	pub id: EdgeId,
	pub opacity: f64,
}

pub type SelectHandler = Box<dyn FnMut(Option<&str>)>;

/// What the focus logic needs from whatever draws and lays out the graph.
pub trait RenderSurface {
	/// Replaces every node and edge and restarts layout stabilization.
	fn set_data(&mut self, nodes: Vec<VisualNode>, edges: Vec<VisualEdge>, config: &LayoutConfig);
	/// Registers the selection handler, replacing any previous one.
	fn on_select(&mut self, handler: SelectHandler);
	/// `None` when `id` is not part of the current graph.
	fn neighbors_of(&self, id: &str) -> Option<Neighborhood>;
	fn patch(&mut self, nodes: &[NodePatch], edges: &[EdgePatch]);
	fn nodes(&self) -> &[VisualNode];
	fn edges(&self) -> &[VisualEdge];
}

/// Visual collections laid out by a `force_graph` simulation.
///
/// Nodes and edges live in arenas addressed by slot; `index` maps node ids to slots and
/// `incident` lists the edge slots touching every node slot.
pub struct ForceSurface {
	nodes: Vec<VisualNode>,
	edges: Vec<VisualEdge>,
	index: HashMap<NodeId, usize>,
	incident: Vec<Vec<EdgeId>>,
	layout: ForceGraph<usize, ()>,
	layout_idx: Vec<DefaultNodeIdx>,
	springs: Vec<(usize, usize)>,
	config: LayoutConfig,
	stabilization_left: usize,
	select_handler: Option<SelectHandler>,
}

impl ForceSurface {
	pub fn new(config: LayoutConfig) -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			index: HashMap::new(),
			incident: Vec::new(),
			layout: ForceGraph::new(config.simulation_parameters()),
			layout_idx: Vec::new(),
			springs: Vec::new(),
			config,
			stabilization_left: 0,
			select_handler: None,
		}
	}

	pub fn slot_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn position(&self, slot: usize) -> (f64, f64) {
		let node = &self.layout.get_graph()[self.layout_idx[slot]];
		(node.x() as f64, node.y() as f64)
	}

	/// Topmost node whose disc contains the world point.
	pub fn node_at(&self, gx: f64, gy: f64) -> Option<usize> {
		(0..self.nodes.len()).rev().find(|&slot| {
			let (x, y) = self.position(slot);
			let (dx, dy) = (x - gx, y - gy);
			(dx * dx + dy * dy).sqrt() < self.nodes[slot].size + HIT_SLOP
		})
	}

	/// Pins a node at the given world position.
	pub fn move_node(&mut self, slot: usize, x: f32, y: f32) {
		self.layout.visit_nodes_mut(|node| {
			if node.data.user_data == slot {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Reports a user activation of `slot` (or of empty canvas) to the selection handler.
	pub fn activate(&mut self, slot: Option<usize>) -> Option<NodeId> {
		let id = slot.and_then(|s| self.nodes.get(s)).map(|n| n.id.clone());
		if let Some(handler) = self.select_handler.as_mut() {
			handler(id.as_deref());
		}
		id
	}

	pub fn is_stabilizing(&self) -> bool {
		self.stabilization_left > 0
	}

	pub fn tick(&mut self, dt: f32) {
		let burst = self.stabilization_left.min(STABILIZATION_STEPS_PER_FRAME);
		for _ in 0..burst {
			self.step(STABILIZATION_DT);
		}
		self.stabilization_left -= burst;
		self.step(dt);
	}

	fn step(&mut self, dt: f32) {
		self.layout.update(dt);

		let mut pos = vec![(0.0f32, 0.0f32); self.nodes.len()];
		self.layout.visit_nodes(|node| pos[node.data.user_data] = (node.x(), node.y()));

		let gravity = self.config.central_gravity * dt;
		let mut shift: Vec<(f32, f32)> = pos
			.iter()
			.map(|&(x, y)| (-x * gravity, -y * gravity))
			.collect();

		let push = self.rest_length_push(dt);
		for &(a, b) in &self.springs {
			let (dx, dy) = (pos[b].0 - pos[a].0, pos[b].1 - pos[a].1);
			let dist = (dx * dx + dy * dy).sqrt().max(1.0);
			let (ux, uy) = (dx / dist * push, dy / dist * push);
			shift[a].0 -= ux;
			shift[a].1 -= uy;
			shift[b].0 += ux;
			shift[b].1 += uy;
		}

		self.layout.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				let (sx, sy) = shift[node.data.user_data];
				node.data.x += sx;
				node.data.y += sy;
			}
		});
	}

	/// force_graph springs rest at zero length; this outward push, integrated the way the
	/// simulation integrates forces, moves the equilibrium to `spring_length`.
	fn rest_length_push(&self, dt: f32) -> f32 {
		let c = &self.config;
		let force = (c.spring_stiffness * c.spring_length * 0.5).min(c.max_force);
		force * dt * dt * dt * c.node_speed / c.damping.clamp(0.01, 1.0)
	}
}

impl RenderSurface for ForceSurface {
	fn set_data(&mut self, nodes: Vec<VisualNode>, edges: Vec<VisualEdge>, config: &LayoutConfig) {
		let mut layout = ForceGraph::new(config.simulation_parameters());
		let mut index = HashMap::with_capacity(nodes.len());
		let mut layout_idx = Vec::with_capacity(nodes.len());
		let radius = config.seed_radius(nodes.len());

		for (slot, node) in nodes.iter().enumerate() {
			let angle = slot as f64 * 2.0 * PI / nodes.len() as f64;
			let idx = layout.add_node(NodeData {
				x: (radius * angle.cos()) as f32,
				y: (radius * angle.sin()) as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: slot,
			});
			index.insert(node.id.clone(), slot);
			layout_idx.push(idx);
		}

		let mut incident = vec![Vec::new(); nodes.len()];
		let mut springs = BTreeSet::new();
		for (edge_id, edge) in edges.iter().enumerate() {
			let endpoints = (index.get(&edge.from).copied(), index.get(&edge.to).copied());
			debug_assert!(
				endpoints.0.is_some() && endpoints.1.is_some(),
				"edge {} -> {} references a node outside the graph",
				edge.from,
				edge.to
			);
			let (Some(from), Some(to)) = endpoints else {
				continue;
			};
			incident[from].push(edge_id);
			// Self-loops stay out of the simulation, it cannot attract a node to itself.
			if from != to {
				incident[to].push(edge_id);
				if springs.insert((from.min(to), from.max(to))) {
					layout.add_edge(layout_idx[from], layout_idx[to], EdgeData::default());
				}
			}
		}

		let select_handler = self.select_handler.take();
		*self = Self {
			nodes,
			edges,
			index,
			incident,
			layout,
			layout_idx,
			springs: springs.into_iter().collect(),
			config: config.clone(),
			stabilization_left: config.stabilization_iterations,
			select_handler,
		};
	}

	fn on_select(&mut self, handler: SelectHandler) {
		self.select_handler = Some(handler);
	}

	fn neighbors_of(&self, id: &str) -> Option<Neighborhood> {
		let slot = self.slot_of(id)?;
		let mut hood = Neighborhood::default();
		for &edge_id in &self.incident[slot] {
			let edge = &self.edges[edge_id];
			hood.edge_ids.insert(edge_id);
			let other = if edge.from == id { &edge.to } else { &edge.from };
			if other != id {
				hood.node_ids.insert(other.clone());
			}
		}
		Some(hood)
	}

	fn patch(&mut self, nodes: &[NodePatch], edges: &[EdgePatch]) {
		for update in nodes {
			if let Some(node) = self.index.get(&update.id).map(|&slot| &mut self.nodes[slot]) {
				node.opacity = update.opacity;
				node.font_color.clone_from(&update.font_color);
			}
		}
		for update in edges {
			if let Some(edge) = self.edges.get_mut(update.id) {
				edge.opacity = update.opacity;
			}
		}
	}

	fn nodes(&self) -> &[VisualNode] {
		&self.nodes
	}

	fn edges(&self) -> &[VisualEdge] {
		&self.edges
	}
}
