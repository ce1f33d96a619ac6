use log::{debug, info};

use super::focus::{self, FocusState};
use super::model::GraphModel;
use super::surface::{ForceSurface, LayoutConfig, RenderSurface, SelectHandler};

/// Pointer travel, in screen pixels, below which a press counts as a click.
pub const CLICK_TOLERANCE: f64 = 4.0;
/// Seconds a pointer must rest on a node before its title shows.
pub const TOOLTIP_DELAY: f64 = 0.2;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub slot: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub slot: Option<usize>,
	pub pointer_x: f64,
	pub pointer_y: f64,
	pub rest_t: f64,
}

/// Everything the canvas component mutates: the laid-out visual model, the focus, and the
/// pan/zoom/drag bookkeeping of the pointer.
pub struct NetworkGraphState {
	pub surface: ForceSurface,
	pub focus: FocusState,
	pub layout: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
}

impl NetworkGraphState {
	pub fn new(layout: LayoutConfig, width: f64, height: f64) -> Self {
		Self {
			surface: ForceSurface::new(layout.clone()),
			focus: FocusState::Idle,
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
		}
	}

	/// Installs a freshly built model; any focus or pointer interaction in progress is dropped.
	pub fn set_data(&mut self, model: GraphModel) {
		let max_degree = model
			.nodes
			.iter()
			.map(|n| model.degrees.get(&n.id))
			.max()
			.unwrap_or(0);
		info!(
			"rendering network: {} nodes, {} edges, max degree {}, {} dropped edges",
			model.nodes.len(),
			model.edges.len(),
			max_degree,
			model.dropped_edges
		);
		self.surface.set_data(model.nodes, model.edges, &self.layout);
		self.focus = FocusState::Idle;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k: 1.0,
		};
	}

	pub fn on_select(&mut self, handler: SelectHandler) {
		self.surface.on_select(handler);
	}

	/// Routes a user activation through the surface's handler and the focus state machine.
	pub fn activate(&mut self, slot: Option<usize>) {
		let target = self.surface.activate(slot);
		let previous = std::mem::take(&mut self.focus);
		self.focus = focus::select(previous, target.as_deref(), &mut self.surface);
		debug!("focus is now {:?}", self.focus);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.surface.node_at(gx, gy)
	}

	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(slot) = self.node_at_position(x, y) {
			let (nx, ny) = self.surface.position(slot);
			self.drag = DragState {
				active: true,
				moved: false,
				slot: Some(slot),
				start_x: x,
				start_y: y,
				node_start_x: nx,
				node_start_y: ny,
			};
		} else {
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_moved(&mut self, x: f64, y: f64) {
		if self.drag.active {
			if let Some(slot) = self.drag.slot {
				self.drag.moved |= travelled(self.drag.start_x, self.drag.start_y, x, y);
				if self.drag.moved {
					let (dx, dy) = (
						(x - self.drag.start_x) / self.transform.k,
						(y - self.drag.start_y) / self.transform.k,
					);
					self.surface.move_node(
						slot,
						(self.drag.node_start_x + dx) as f32,
						(self.drag.node_start_y + dy) as f32,
					);
				}
			}
		} else if self.pan.active {
			self.pan.moved |= travelled(self.pan.start_x, self.pan.start_y, x, y);
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			self.set_hover(self.node_at_position(x, y), x, y);
		}
	}

	/// Ends a press; a press that did not travel is a selection of what was under it.
	pub fn release(&mut self) {
		let clicked = if self.drag.active && !self.drag.moved {
			Some(self.drag.slot)
		} else if self.pan.active && !self.pan.moved {
			Some(None)
		} else {
			None
		};
		self.drag = DragState::default();
		self.pan = PanState::default();
		if let Some(slot) = clicked {
			self.activate(slot);
		}
	}

	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
	}

	pub fn zoom(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn is_dragging(&self) -> bool {
		(self.drag.active && self.drag.moved) || (self.pan.active && self.pan.moved)
	}

	/// Node whose title should be shown, once the pointer has rested on it.
	pub fn tooltip_slot(&self) -> Option<usize> {
		self.hover
			.slot
			.filter(|_| self.hover.rest_t >= TOOLTIP_DELAY && !self.is_dragging())
	}

	fn set_hover(&mut self, slot: Option<usize>, x: f64, y: f64) {
		if self.hover.slot != slot {
			self.hover.rest_t = 0.0;
		}
		self.hover.slot = slot;
		self.hover.pointer_x = x;
		self.hover.pointer_y = y;
	}

	pub fn tick(&mut self, dt: f32) {
		let stabilizing = self.surface.is_stabilizing();
		self.surface.tick(dt);
		if stabilizing && !self.surface.is_stabilizing() {
			debug!("layout stabilized");
		}
		if self.hover.slot.is_some() {
			self.hover.rest_t += dt as f64;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn travelled(x0: f64, y0: f64, x1: f64, y1: f64) -> bool {
	let (dx, dy) = (x1 - x0, y1 - y0);
	(dx * dx + dy * dy).sqrt() > CLICK_TOLERANCE
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::network_graph::focus::DIMMED_NODE_OPACITY;
	use crate::components::network_graph::model::{self, tests as fixtures};
	use pretty_assertions::assert_eq;

	fn state() -> NetworkGraphState {
		let mut state = NetworkGraphState::new(LayoutConfig::default(), 800.0, 600.0);
		state.set_data(model::build(&fixtures::triangle_dataset()));
		state
	}

	/// Screen coordinates of a node's center.
	fn on_screen(state: &NetworkGraphState, slot: usize) -> (f64, f64) {
		let (x, y) = state.surface.position(slot);
		(
			x * state.transform.k + state.transform.x,
			y * state.transform.k + state.transform.y,
		)
	}

	#[test]
	fn click_on_node_focuses_it() {
		let mut state = state();
		let (x, y) = on_screen(&state, 2);
		state.press(x, y);
		state.release();
		assert_eq!(state.focus, FocusState::Focused("C".into()));
		assert_eq!(state.surface.nodes()[1].opacity, DIMMED_NODE_OPACITY);
	}

	#[test]
	fn click_on_empty_canvas_clears_focus() {
		let mut state = state();
		let (x, y) = on_screen(&state, 0);
		state.press(x, y);
		state.release();
		assert_eq!(state.focus.focused(), Some("A"));

		state.press(5.0, 5.0);
		state.release();
		assert_eq!(state.focus, FocusState::Idle);
	}

	#[test]
	fn dragging_a_node_does_not_select_it() {
		let mut state = state();
		let (x, y) = on_screen(&state, 0);
		state.press(x, y);
		state.pointer_moved(x + 30.0, y + 10.0);
		assert!(state.is_dragging());
		state.release();
		assert_eq!(state.focus, FocusState::Idle);
		let (nx, ny) = state.surface.position(0);
		let (sx, sy) = (nx + state.transform.x, ny + state.transform.y);
		assert!((sx - (x + 30.0)).abs() < 1e-3 && (sy - (y + 10.0)).abs() < 1e-3);
	}

	#[test]
	fn panning_does_not_clear_focus() {
		let mut state = state();
		let (x, y) = on_screen(&state, 0);
		state.press(x, y);
		state.release();

		state.press(5.0, 5.0);
		state.pointer_moved(60.0, 5.0);
		state.release();
		assert_eq!(state.focus.focused(), Some("A"));
		assert_eq!(state.transform.x, 400.0 + 55.0);
	}

	#[test]
	fn new_data_resets_focus() {
		let mut state = state();
		state.activate(Some(0));
		assert_eq!(state.focus.focused(), Some("A"));

		state.set_data(model::build(&fixtures::triangle_dataset()));
		assert_eq!(state.focus, FocusState::Idle);
		assert!(state.surface.nodes().iter().all(|n| n.opacity == n.base_opacity));
	}

	#[test]
	fn selection_handler_sees_every_activation() {
		let mut state = state();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		state.on_select(Box::new(move |id: Option<&str>| sink.borrow_mut().push(id.map(str::to_owned))));
		state.activate(Some(1));
		state.activate(None);
		assert_eq!(*seen.borrow(), vec![Some("B".to_string()), None]);
	}

	#[test]
	fn tooltip_waits_for_the_pointer_to_rest() {
		let mut state = state();
		let (x, y) = on_screen(&state, 0);
		state.pointer_moved(x, y);
		assert_eq!(state.tooltip_slot(), None);
		state.hover.rest_t = TOOLTIP_DELAY;
		assert_eq!(state.tooltip_slot(), Some(0));
		state.pointer_moved(1.0, 1.0);
		assert_eq!(state.tooltip_slot(), None);
	}

	#[test]
	fn zoom_keeps_the_pointer_fixed() {
		let mut state = state();
		let before = state.screen_to_graph(100.0, 50.0);
		state.zoom(100.0, 50.0, true);
		let after = state.screen_to_graph(100.0, 50.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		assert!((state.transform.k - 1.1).abs() < 1e-12);
	}
}
