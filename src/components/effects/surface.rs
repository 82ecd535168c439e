//! Drawing surface abstraction.
//!
//! Effects draw through [`Surface`] so the simulation never touches CSS
//! strings or `web_sys` directly. The canvas implementation converts
//! [`Color`] values at the call boundary; [`DrawLog`] records operations for
//! headless rendering and tests.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::color::Color;

/// The 2D primitives the effects need from their host.
pub trait Surface {
	/// Clears the whole surface to transparent.
	fn clear(&mut self, width: f64, height: f64);
	/// Fills an axis-aligned rectangle.
	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);
	/// Outlines an axis-aligned rectangle.
	fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, line_width: f64);
	/// Strokes a single segment.
	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f64);
	/// Strokes an open polyline through `points`.
	fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, line_width: f64);
	/// Fills a disc.
	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color);
	/// Radial gradient from `color` at `inner` to transparent at `outer`.
	fn fill_glow(&mut self, x: f64, y: f64, inner: f64, outer: f64, color: Color);
	/// Draws `text` centred on `(x, y)`.
	fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: Color);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		CanvasRenderingContext2d::fill_rect(self, x, y, w, h);
	}

	fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, line_width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(line_width);
		CanvasRenderingContext2d::stroke_rect(self, x, y, w, h);
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(line_width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, line_width: f64) {
		let Some((&(x0, y0), rest)) = points.split_first() else {
			return;
		};
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(line_width);
		self.begin_path();
		self.move_to(x0, y0);
		for &(x, y) in rest {
			self.line_to(x, y);
		}
		self.stroke();
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
		self.set_fill_style_str(&color.to_css());
		self.begin_path();
		let _ = self.arc(x, y, radius, 0.0, PI * 2.0);
		self.fill();
	}

	fn fill_glow(&mut self, x: f64, y: f64, inner: f64, outer: f64, color: Color) {
		let Ok(gradient) = self.create_radial_gradient(x, y, inner, x, y, outer) else {
			return;
		};
		let _ = gradient.add_color_stop(0.0, &color.to_css());
		let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css());

		self.begin_path();
		let _ = self.arc(x, y, outer, 0.0, PI * 2.0);
		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		self.fill();
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &str, color: Color) {
		self.set_fill_style_str(&color.to_css());
		self.set_font(font);
		self.set_text_align("center");
		self.set_text_baseline("middle");
		let _ = CanvasRenderingContext2d::fill_text(self, text, x, y);
	}
}

/// A single recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
	/// [`Surface::clear`]
	Clear {
		/// Cleared width.
		width: f64,
		/// Cleared height.
		height: f64,
	},
	/// [`Surface::fill_rect`]
	FillRect {
		/// Left edge.
		x: f64,
		/// Top edge.
		y: f64,
		/// Width.
		w: f64,
		/// Height.
		h: f64,
		/// Fill colour.
		color: Color,
	},
	/// [`Surface::stroke_rect`]
	StrokeRect {
		/// Left edge.
		x: f64,
		/// Top edge.
		y: f64,
		/// Width.
		w: f64,
		/// Height.
		h: f64,
		/// Stroke colour.
		color: Color,
		/// Stroke width.
		line_width: f64,
	},
	/// [`Surface::stroke_line`]
	Line {
		/// Start point.
		from: (f64, f64),
		/// End point.
		to: (f64, f64),
		/// Stroke colour.
		color: Color,
		/// Stroke width.
		line_width: f64,
	},
	/// [`Surface::stroke_path`]
	Path {
		/// Polyline vertices in order.
		points: Vec<(f64, f64)>,
		/// Stroke colour.
		color: Color,
		/// Stroke width.
		line_width: f64,
	},
	/// [`Surface::fill_circle`]
	Circle {
		/// Centre x.
		x: f64,
		/// Centre y.
		y: f64,
		/// Disc radius.
		radius: f64,
		/// Fill colour.
		color: Color,
	},
	/// [`Surface::fill_glow`]
	Glow {
		/// Centre x.
		x: f64,
		/// Centre y.
		y: f64,
		/// Radius where the gradient starts.
		inner: f64,
		/// Radius where it reaches transparent.
		outer: f64,
		/// Colour at the inner radius.
		color: Color,
	},
	/// [`Surface::fill_text`]; the font is not recorded.
	Text {
		/// Label text.
		text: String,
		/// Centre x.
		x: f64,
		/// Centre y.
		y: f64,
		/// Fill colour.
		color: Color,
	},
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct DrawLog {
	/// Calls in the order they were made.
	pub ops: Vec<DrawOp>,
}

impl DrawLog {
	/// An empty log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Forgets everything recorded so far.
	pub fn reset(&mut self) {
		self.ops.clear();
	}

	/// Recorded [`DrawOp::Line`] calls.
	pub fn lines(&self) -> impl Iterator<Item = &DrawOp> {
		self.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. }))
	}

	/// Recorded [`DrawOp::FillRect`] calls.
	pub fn filled_rects(&self) -> impl Iterator<Item = &DrawOp> {
		self.ops
			.iter()
			.filter(|op| matches!(op, DrawOp::FillRect { .. }))
	}

	/// Text of every recorded label, in draw order.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.ops.iter().filter_map(|op| match op {
			DrawOp::Text { text, .. } => Some(text.as_str()),
			_ => None,
		})
	}
}

impl Surface for DrawLog {
	fn clear(&mut self, width: f64, height: f64) {
		self.ops.push(DrawOp::Clear { width, height });
	}

	fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
		self.ops.push(DrawOp::FillRect { x, y, w, h, color });
	}

	fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color, line_width: f64) {
		self.ops.push(DrawOp::StrokeRect {
			x,
			y,
			w,
			h,
			color,
			line_width,
		});
	}

	fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f64) {
		self.ops.push(DrawOp::Line {
			from,
			to,
			color,
			line_width,
		});
	}

	fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, line_width: f64) {
		self.ops.push(DrawOp::Path {
			points: points.to_vec(),
			color,
			line_width,
		});
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Color) {
		self.ops.push(DrawOp::Circle {
			x,
			y,
			radius,
			color,
		});
	}

	fn fill_glow(&mut self, x: f64, y: f64, inner: f64, outer: f64, color: Color) {
		self.ops.push(DrawOp::Glow {
			x,
			y,
			inner,
			outer,
			color,
		});
	}

	fn fill_text(&mut self, text: &str, x: f64, y: f64, _font: &str, color: Color) {
		self.ops.push(DrawOp::Text {
			text: text.to_string(),
			x,
			y,
			color,
		});
	}
}
