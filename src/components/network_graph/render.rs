use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::model::{GHOST_BORDER_DASH, VisualEdge, VisualNode};
use super::state::NetworkGraphState;
use super::surface::RenderSurface;

const BACKGROUND: &str = "#ffffff";
const EDGE_DASH: [f64; 2] = [5.0, 5.0];
const ARROW_LENGTH: f64 = 15.0;
const SELF_LOOP_RADIUS: f64 = 10.0;
const BORDER_WIDTH: f64 = 1.0;
const SELECTED_BORDER_WIDTH: f64 = 2.0;
const TOOLTIP_FONT: &str = "12px sans-serif";
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_PADDING: f64 = 6.0;

fn dash_array(pattern: &[f64]) -> js_sys::Array {
	pattern.iter().map(|&v| JsValue::from_f64(v)).collect()
}

pub fn render(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	if !state.is_dragging() {
		draw_edges(state, ctx);
	}
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, ctx);
}

fn draw_edges(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let surface = &state.surface;
	let focused = state.focus.focused();

	for edge in surface.edges() {
		let (Some(from), Some(to)) = (surface.slot_of(&edge.from), surface.slot_of(&edge.to))
		else {
			continue;
		};
		let selected = focused.is_some_and(|id| edge.from == id || edge.to == id);

		ctx.set_global_alpha(edge.opacity);
		ctx.set_stroke_style_str(if selected {
			&edge.highlight_color
		} else {
			&edge.base_color
		});
		ctx.set_fill_style_str(if selected {
			&edge.highlight_color
		} else {
			&edge.base_color
		});
		ctx.set_line_width(edge.width);
		let pattern: &[f64] = if edge.dashed { &EDGE_DASH } else { &[] };
		let _ = ctx.set_line_dash(&dash_array(pattern));

		if from == to {
			let (x, y) = surface.position(from);
			let r = surface.nodes()[from].size;
			ctx.begin_path();
			let _ = ctx.arc(x, y - r, SELF_LOOP_RADIUS, 0.0, 2.0 * PI);
			ctx.stroke();
			continue;
		}
		draw_curved_edge(
			edge,
			surface.position(from),
			surface.position(to),
			&surface.nodes()[to],
			ctx,
		);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

/// Quadratic curve bent clockwise, ending in an arrowhead on the target's border.
fn draw_curved_edge(
	edge: &VisualEdge,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
	target: &VisualNode,
	ctx: &CanvasRenderingContext2d,
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (cx, cy) = (
		(x1 + x2) / 2.0 - dy * edge.roundness,
		(y1 + y2) / 2.0 + dx * edge.roundness,
	);

	// The arrow follows the curve's tangent at the target, which points from the control point.
	let (tx, ty) = (x2 - cx, y2 - cy);
	let tangent = (tx * tx + ty * ty).sqrt().max(0.001);
	let (ux, uy) = (tx / tangent, ty / tangent);
	let arrow = if edge.arrow_enabled {
		ARROW_LENGTH * edge.arrow_scale + edge.width
	} else {
		0.0
	};
	let (tip_x, tip_y) = (x2 - ux * target.size, y2 - uy * target.size);
	let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);

	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.quadratic_curve_to(cx, cy, back_x, back_y);
	ctx.stroke();

	if edge.arrow_enabled {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let surface = &state.surface;
	let focused = state.focus.focused();

	for (slot, node) in surface.nodes().iter().enumerate() {
		let (x, y) = surface.position(slot);
		let selected = focused == Some(node.id.as_str());
		let (fill, border, border_width) = if selected {
			(
				&node.highlight.background,
				&node.highlight.border,
				SELECTED_BORDER_WIDTH,
			)
		} else {
			(&node.base_color, &node.border_color, BORDER_WIDTH)
		};

		ctx.set_global_alpha(node.opacity);
		ctx.begin_path();
		let _ = ctx.arc(x, y, node.size, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(fill);
		ctx.fill();
		let pattern: &[f64] = if node.dashed_border {
			&GHOST_BORDER_DASH
		} else {
			&[]
		};
		let _ = ctx.set_line_dash(&dash_array(pattern));
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(border_width);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if !node.label.is_empty() {
			draw_label(node, x, y + node.size + node.font_size, ctx);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_label(node: &VisualNode, x: f64, y: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(&format!("{}px sans-serif", node.font_size));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_width(node.stroke_width);
	ctx.set_stroke_style_str(&node.stroke_color);
	let _ = ctx.stroke_text(&node.label, x, y);
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(&node.font_color);
	let _ = ctx.fill_text(&node.label, x, y);
}

fn draw_tooltip(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d) {
	let Some(node) = state
		.tooltip_slot()
		.and_then(|slot| state.surface.nodes().get(slot))
	else {
		return;
	};
	if node.title.is_empty() {
		return;
	}

	ctx.set_font(TOOLTIP_FONT);
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	let lines: Vec<&str> = node.title.lines().collect();
	let text_width = lines
		.iter()
		.filter_map(|line| ctx.measure_text(line).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let (w, h) = (
		text_width + 2.0 * TOOLTIP_PADDING,
		lines.len() as f64 * TOOLTIP_LINE_HEIGHT + 2.0 * TOOLTIP_PADDING,
	);
	// Keep the box on the canvas.
	let x = (state.hover.pointer_x + 12.0).min(state.width - w).max(0.0);
	let y = (state.hover.pointer_y + 12.0).min(state.height - h).max(0.0);

	ctx.set_fill_style_str("#f5f4ed");
	ctx.fill_rect(x, y, w, h);
	ctx.set_stroke_style_str("#808074");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(x, y, w, h);
	ctx.set_fill_style_str("#000000");
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(
			line,
			x + TOOLTIP_PADDING,
			y + TOOLTIP_PADDING + i as f64 * TOOLTIP_LINE_HEIGHT,
		);
	}
}
