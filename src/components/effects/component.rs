//! Leptos component binding an effect to a canvas element.
//!
//! The component sizes its canvas to the on-screen box, samples the
//! background behind it, and drives a [`RenderLoop`] with
//! `requestAnimationFrame`. Window resize and pointer events are plain
//! last-value-wins updates consumed by the next frame. Everything is torn
//! down when the owning reactive scope is cleaned up.

use std::cell::RefCell;
use std::iter::successors;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent};

use super::color::{Color, effective_background, parse_css_color};
use super::config::EffectConfig;
use super::grid::Pointer;
use super::orchestrator::{EffectState, FrameScheduler, RenderLoop, entropy_seed};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type SharedLoop = Rc<RefCell<RenderLoop<AnimationFrameScheduler>>>;

/// [`FrameScheduler`] backed by `window.requestAnimationFrame`.
struct AnimationFrameScheduler {
	callback: FrameCallback,
	handle: Option<i32>,
}

impl FrameScheduler for AnimationFrameScheduler {
	fn request_frame(&mut self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Some(ref cb) = *self.callback.borrow() {
			self.handle = window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.ok();
		}
	}

	fn cancel_frame(&mut self) {
		if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
			let _ = window.cancel_animation_frame(handle);
		}
	}
}

/// An event listener that detaches itself when dropped.
struct Listener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
	fn attach(
		target: EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Option<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		target
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.ok()?;
		Some(Self {
			target,
			event,
			callback,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// A running effect. Dropping it stops the loop and detaches listeners.
struct Mounted {
	render_loop: SharedLoop,
	callback: FrameCallback,
	_listeners: Vec<Listener>,
}

impl Drop for Mounted {
	fn drop(&mut self) {
		self.render_loop.borrow_mut().unmount();
		// Breaks the loop <-> callback reference cycle.
		self.callback.borrow_mut().take();
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
}

/// Matches the backing store to the element's on-screen size.
fn sync_canvas_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = (canvas.client_width().max(0), canvas.client_height().max(0));
	if canvas.width() != w as u32 {
		canvas.set_width(w as u32);
	}
	if canvas.height() != h as u32 {
		canvas.set_height(h as u32);
	}
	(w as f64, h as f64)
}

/// Computed background of the nearest ancestor that actually paints one.
fn sample_background(canvas: &HtmlCanvasElement) -> Option<Color> {
	let window = web_sys::window()?;
	effective_background(
		successors(canvas.parent_element(), |el| el.parent_element()).map(|el| {
			window
				.get_computed_style(&el)
				.ok()
				.flatten()
				.and_then(|style| style.get_property_value("background-color").ok())
				.and_then(|css| parse_css_color(&css))
		}),
	)
}

fn pointer_from(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Pointer {
	let rect = canvas.get_bounding_client_rect();
	let p = Pointer::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	);
	if p.is_within(rect.width(), rect.height()) {
		p
	} else {
		Pointer::OFFSCREEN
	}
}

fn mount_effect(canvas: HtmlCanvasElement, config: &EffectConfig) -> Option<Mounted> {
	let Some(ctx) = context_2d(&canvas) else {
		warn!("lab-effects: 2d context unavailable, effect skipped");
		return None;
	};
	let window = web_sys::window()?;

	let (w, h) = sync_canvas_size(&canvas);
	let state = EffectState::new(
		config.resolve(),
		sample_background(&canvas),
		w,
		h,
		entropy_seed(),
	);

	let callback: FrameCallback = Rc::new(RefCell::new(None));
	let render_loop: SharedLoop = Rc::new(RefCell::new(RenderLoop::new(
		AnimationFrameScheduler {
			callback: callback.clone(),
			handle: None,
		},
	)));

	let (loop_frame, canvas_frame, mut surface) = (render_loop.clone(), canvas.clone(), ctx);
	*callback.borrow_mut() = Some(Closure::new(move || {
		let mut rl = loop_frame.borrow_mut();
		if !canvas_frame.is_connected() {
			rl.unmount();
			return;
		}
		rl.on_frame(&mut surface);
	}));

	if !render_loop.borrow_mut().mount(state) {
		callback.borrow_mut().take();
		return None;
	}

	let mut listeners = Vec::with_capacity(3);

	let (loop_resize, canvas_resize) = (render_loop.clone(), canvas.clone());
	listeners.extend(Listener::attach(window.clone().into(), "resize", move |_| {
		let (nw, nh) = sync_canvas_size(&canvas_resize);
		let background = sample_background(&canvas_resize);
		if let Some(state) = loop_resize.borrow_mut().state_mut() {
			debug!("lab-effects: resized to {}x{}", nw, nh);
			state.resize(nw, nh);
			state.set_background(background);
		}
	}));

	let (loop_move, canvas_move) = (render_loop.clone(), canvas.clone());
	listeners.extend(Listener::attach(window.clone().into(), "mousemove", move |ev| {
		let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
			return;
		};
		if let Some(state) = loop_move.borrow_mut().state_mut() {
			state.set_pointer(pointer_from(&canvas_move, ev));
		}
	}));

	if let Some(root) = window.document().and_then(|d| d.document_element()) {
		let loop_leave = render_loop.clone();
		listeners.extend(Listener::attach(root.into(), "mouseleave", move |_| {
			if let Some(state) = loop_leave.borrow_mut().state_mut() {
				state.pointer_left();
			}
		}));
	}

	Some(Mounted {
		render_loop,
		callback,
		_listeners: listeners,
	})
}

/// Decorative background canvas.
///
/// Place it inside a positioned container; it stretches to fill the container
/// and ignores pointer events so the content above stays interactive. Pass a
/// preset or a full [`EffectConfig`]; the `none` preset renders nothing.
#[component]
pub fn EffectCanvas(
	/// Preset and overrides; defaults to the hero preset.
	#[prop(into, optional)]
	config: EffectConfig,
	/// Extra CSS classes for the canvas element.
	#[prop(into, optional)]
	class: Option<String>,
) -> impl IntoView {
	if config.resolve().is_disabled() {
		debug!("lab-effects: effect disabled");
		return ().into_any();
	}

	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted = StoredValue::new_local(None::<Mounted>);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		// Dropping any previous instance tears it down first.
		mounted.set_value(None);
		mounted.set_value(mount_effect(canvas, &config));
	});

	on_cleanup(move || mounted.dispose());

	let class = class.unwrap_or_else(|| "lab-effect-canvas".to_string());
	view! {
		<canvas
			node_ref=canvas_ref
			class=class
			aria-hidden="true"
			style="position: absolute; inset: 0; width: 100%; height: 100%; display: block; pointer-events: none;"
		/>
	}
	.into_any()
}
