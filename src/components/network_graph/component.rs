use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::legend;
use super::model::{self, GraphModel};
use super::render;
use super::state::NetworkGraphState;
use super::surface::LayoutConfig;
use super::types::RawDataset;

const EMPTY_MESSAGE: &str = "No network data to display.";

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// An explicit size wins, then the measured layout size, then `fallback`. Elements that are not
/// laid out yet measure 0.
fn extent(explicit: Option<f64>, measured: Option<i32>, fallback: f64) -> f64 {
	explicit
		.or(measured.filter(|&px| px > 0).map(f64::from))
		.unwrap_or(fallback)
}

fn build_model(data: Option<&RawDataset>) -> GraphModel {
	data.map(model::build).unwrap_or_default()
}

/// Evaluation network canvas with its legend.
///
/// Clicking a node isolates it and its direct connections; clicking empty canvas restores the
/// whole network. Every new `data` value replaces the graph and clears the focus.
#[component]
pub fn NetworkGraph(
	#[prop(into)] data: Signal<Option<RawDataset>>,
	#[prop(optional)] layout: LayoutConfig,
	#[prop(optional, into)] on_select: Option<Callback<Option<String>>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<NetworkGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let viewport = canvas.parent_element();
			(
				extent(width, viewport.as_ref().map(|v| v.client_width()), 800.0),
				extent(height, viewport.as_ref().map(|v| v.client_height()), 600.0),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("2d canvas context unavailable, network graph disabled");
			return;
		};

		let mut graph = NetworkGraphState::new(layout.clone(), w, h);
		graph.on_select(Box::new(move |id: Option<&str>| {
			if let Some(cb) = on_select {
				cb.run(id.map(str::to_owned));
			}
		}));
		graph.set_data(data.with_untracked(|d| build_model(d.as_ref())));
		*state_init.borrow_mut() = Some(graph);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_data = state.clone();
	Effect::new(move |_| {
		let model = data.with(|d| build_model(d.as_ref()));
		if let Some(ref mut s) = *state_data.borrow_mut() {
			s.set_data(model);
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_moved(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.release();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.leave();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y() <= 0.0);
		}
	};

	let is_empty = move || data.with(|d| d.as_ref().is_none_or(RawDataset::is_empty));
	let project_legend = move || data.with(|d| d.as_ref().map(legend::project));

	view! {
		<div class="network-graph">
			<div class="network-legend">
				{move || {
					project_legend()
						.map(|legend| {
							view! {
								<div class="legend-items">
									{legend
										.entries
										.into_iter()
										.map(|entry| {
											view! {
												<span class="legend-item">
													<span class="legend-dot" style=entry.swatch.css()></span>
													{entry.label}
												</span>
											}
										})
										.collect_view()}
								</div>
								<p class="legend-summary">{legend.summary_line}</p>
							}
						})
				}}
			</div>
			<p class="empty-msg" style:display=move || if is_empty() { "block" } else { "none" }>
				{EMPTY_MESSAGE}
			</p>
			<div class="network-graph-viewport">
				<canvas
					node_ref=canvas_ref
					class="network-graph-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style:display=move || if is_empty() { "none" } else { "block" }
					style:cursor="grab"
				/>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn explicit_size_wins() {
		assert_eq!(extent(Some(320.0), Some(900), 600.0), 320.0);
	}

	#[test]
	fn measured_size_is_used_once_laid_out() {
		assert_eq!(extent(None, Some(592), 600.0), 592.0);
		assert_eq!(extent(None, Some(0), 600.0), 600.0);
		assert_eq!(extent(None, None, 800.0), 800.0);
	}
}
