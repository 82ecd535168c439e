//! Composed frames checked against real alpha compositing.
//!
//! [`DrawLog`] only records calls. The tests here replay each frame onto a few
//! sampled pixels with source-over blending, the way a canvas would, so state
//! that leaks from one frame into the next shows up as accumulated colour.

#![allow(unused_crate_dependencies)]

use lab_effects::components::effects::DrawOp;
use lab_effects::components::effects::color::{Color, luminance, parse_css_color};
use lab_effects::components::effects::grid::Pointer;
use lab_effects::{DrawLog, EffectConfig, EffectPreset, EffectState, Surface};

/// One canvas pixel, tracked as straight (non-premultiplied) RGBA.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Pixel {
	at: (f64, f64),
	rgb: (f64, f64, f64),
	alpha: f64,
}

impl Pixel {
	fn new(x: f64, y: f64) -> Self {
		Self {
			at: (x, y),
			rgb: (0.0, 0.0, 0.0),
			alpha: 0.0,
		}
	}

	fn blend(&mut self, color: Color, coverage: f64) {
		let src = color.a * coverage;
		if src <= 0.0 {
			return;
		}
		let dst = self.alpha * (1.0 - src);
		let out = src + dst;
		let mix = |s: u8, d: f64| (s as f64 * src + d * dst) / out;
		self.rgb = (
			mix(color.r, self.rgb.0),
			mix(color.g, self.rgb.1),
			mix(color.b, self.rgb.2),
		);
		self.alpha = out;
	}

	/// What the viewer sees: this pixel painted over the page background.
	fn over(&self, page: Color) -> Color {
		let ch = |c: f64, p: u8| (c * self.alpha + p as f64 * (1.0 - self.alpha)).round() as u8;
		Color::rgb(
			ch(self.rgb.0, page.r),
			ch(self.rgb.1, page.g),
			ch(self.rgb.2, page.b),
		)
	}

	fn in_rect(&self, x: f64, y: f64, w: f64, h: f64) -> bool {
		let (px, py) = self.at;
		px >= x && px < x + w && py >= y && py < y + h
	}

	fn near_segment(&self, a: (f64, f64), b: (f64, f64), half_width: f64) -> bool {
		let (px, py) = self.at;
		let (dx, dy) = (b.0 - a.0, b.1 - a.1);
		let len2 = dx * dx + dy * dy;
		let t = if len2 > 0.0 {
			(((px - a.0) * dx + (py - a.1) * dy) / len2).clamp(0.0, 1.0)
		} else {
			0.0
		};
		let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
		((px - cx).powi(2) + (py - cy).powi(2)).sqrt() <= half_width
	}
}

impl Surface for Pixel {
	fn clear(&mut self, width: f64, height: f64) {
		if self.in_rect(0.0, 0.0, width, height) {
			self.rgb = (0.0, 0.0, 0.0);
			self.alpha = 0.0;
		}
	}

	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
		if self.in_rect(x, y, w, h) {
			self.blend(color, 1.0);
		}
	}

	fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, line_width: f64) {
		let hw = line_width / 2.0;
		let outer = self.in_rect(x - hw, y - hw, w + line_width, h + line_width);
		let inner = self.in_rect(x + hw, y + hw, w - line_width, h - line_width);
		if outer && !inner {
			self.blend(color, 1.0);
		}
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f64) {
		if self.near_segment(from, to, line_width / 2.0) {
			self.blend(color, 1.0);
		}
	}

	fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, line_width: f64) {
		if points
			.windows(2)
			.any(|seg| self.near_segment(seg[0], seg[1], line_width / 2.0))
		{
			self.blend(color, 1.0);
		}
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
		if self.near_segment((x, y), (x, y), radius) {
			self.blend(color, 1.0);
		}
	}

	fn fill_glow(&mut self, x: f64, y: f64, inner: f64, outer: f64, color: Color) {
		let (px, py) = self.at;
		let d = ((px - x).powi(2) + (py - y).powi(2)).sqrt();
		if d <= outer {
			let fade = ((d - inner) / (outer - inner)).clamp(0.0, 1.0);
			self.blend(color, 1.0 - fade);
		}
	}

	fn fill_text(&mut self, _text: &str, _x: f64, _y: f64, _font: &str, _color: Color) {}
}

fn replay<S: Surface>(ops: &[DrawOp], surface: &mut S) {
	for op in ops {
		match op {
			DrawOp::Clear { width, height } => surface.clear(*width, *height),
			DrawOp::FillRect { x, y, w, h, color } => surface.fill_rect(*x, *y, *w, *h, *color),
			DrawOp::StrokeRect {
				x,
				y,
				w,
				h,
				color,
				line_width,
			} => surface.stroke_rect(*x, *y, *w, *h, *color, *line_width),
			DrawOp::Line {
				from,
				to,
				color,
				line_width,
			} => surface.stroke_line(*from, *to, *color, *line_width),
			DrawOp::Path {
				points,
				color,
				line_width,
			} => surface.stroke_path(points, *color, *line_width),
			DrawOp::Circle {
				x,
				y,
				radius,
				color,
			} => surface.fill_circle(*x, *y, *radius, *color),
			DrawOp::Glow {
				x,
				y,
				inner,
				outer,
				color,
			} => surface.fill_glow(*x, *y, *inner, *outer, *color),
			DrawOp::Text { text, x, y, color } => surface.fill_text(text, *x, *y, "", *color),
		}
	}
}

/// Renders `frames` frames, compositing each onto `canvas` and checking that
/// every sampled pixel matches the same frame drawn onto a blank canvas.
fn run_frames(state: &mut EffectState, canvas: &mut [Pixel], frames: usize) -> DrawLog {
	let mut log = DrawLog::new();
	for frame in 0..frames {
		log.reset();
		state.render_frame(&mut log);
		for px in canvas.iter_mut() {
			replay(&log.ops, px);
			let mut blank = Pixel::new(px.at.0, px.at.1);
			replay(&log.ops, &mut blank);
			assert_eq!(*px, blank, "frame {frame} carried colour over at {:?}", px.at);
		}
	}
	log
}

#[test]
fn light_section_keeps_its_background() {
	let page = parse_css_color("#f8fafc").unwrap();
	let mut state = EffectState::new(
		EffectConfig::from(EffectPreset::Light).resolve(),
		Some(page),
		600.0,
		400.0,
		21,
	);
	assert!(state.particles().is_some());

	// cell centres plus two points on grid lines
	let mut canvas: Vec<Pixel> = (0..4)
		.flat_map(|i| {
			(0..3).map(move |j| Pixel::new(30.0 + 150.0 * i as f64, 30.0 + 120.0 * j as f64))
		})
		.chain([Pixel::new(60.0, 200.0), Pixel::new(300.0, 180.0)])
		.collect();

	run_frames(&mut state, &mut canvas, 60);

	let seen = canvas
		.iter()
		.map(|px| luminance(px.over(page)))
		.sum::<f64>()
		/ canvas.len() as f64;
	assert!(seen > 0.8, "light section darkened to luminance {seen:.3}");
}

#[test]
fn grid_lines_do_not_build_up() {
	let page = parse_css_color("#0b1120").unwrap();
	let mut state = EffectState::new(
		EffectConfig {
			show_transactions: Some(false),
			..EffectPreset::Hero.into()
		}
		.resolve(),
		Some(page),
		800.0,
		480.0,
		4,
	);
	let palette = state.palette().clone();
	// both on vertical lines of the 80px grid
	let mut canvas = vec![Pixel::new(160.0, 40.0), Pixel::new(640.0, 400.0)];

	let log = run_frames(&mut state, &mut canvas, 90);

	// offscreen pointer: every grid stroke stays at the base floor
	for op in log.lines() {
		if let DrawOp::Line { from, to, color, .. } = op {
			let axis_aligned = from.0 == to.0 || from.1 == to.1;
			let full_span = (to.0 - from.0).abs() == 800.0 || (to.1 - from.1).abs() == 480.0;
			if axis_aligned && full_span {
				assert_eq!(color.a, palette.base_opacity);
			}
		}
	}
}

#[test]
fn highlight_is_gone_one_frame_after_leaving() {
	let mut state = EffectState::new(
		EffectConfig::from(EffectPreset::Dark).resolve(),
		None,
		700.0,
		420.0,
		13,
	);
	assert!(state.particles().is_some());
	// cell (5, 3) of the 70px grid
	let centre = Pixel::new(385.0, 245.0);
	let mut canvas = vec![centre];

	state.set_pointer(Pointer::new(385.0, 245.0));
	let log = run_frames(&mut state, &mut canvas, 20);
	assert!(log.filled_rects().count() > 0);

	state.pointer_left();
	let log = run_frames(&mut state, &mut canvas, 1);
	assert_eq!(log.filled_rects().count(), 0);
	assert!(!log.ops.iter().any(|op| matches!(op, DrawOp::StrokeRect { .. })));
}
