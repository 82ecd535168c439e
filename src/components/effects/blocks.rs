//! Drifting "transaction" blocks.
//!
//! A handful of labelled rectangles slide left to right across the canvas.
//! Once a block passes the right edge it re-enters from the left on a new row
//! with a fresh label, so the stream never ends.

use rand::Rng;

use super::color::{Color, Palette};
use super::surface::Surface;

const BRACKET: f64 = 6.0;
const LABEL_FONT: &str = "10px ui-monospace, monospace";

/// Construction parameters for [`TransactionBlocks`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSettings {
	/// Number of blocks in the stream.
	pub count: usize,
	/// Drift speed multiplier.
	pub speed: f64,
	/// Alpha multiplier applied to every block.
	pub opacity: f64,
}

impl Default for BlockSettings {
	fn default() -> Self {
		Self {
			count: 5,
			speed: 1.0,
			opacity: 0.6,
		}
	}
}

/// One drifting block.
#[derive(Clone, Debug)]
pub struct DataBlock {
	/// Left edge; `-width` right after a wrap.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
	/// Pixels per frame, rightwards.
	pub speed: f64,
	/// `0x` plus eight hex digits, renewed on every wrap.
	pub label: String,
	/// One of the palette swatches.
	pub color: Color,
	/// Fixed at creation.
	pub opacity: f64,
}

/// Pseudo transaction hash, e.g. `0x3fa9c01e`.
pub fn random_label<R: Rng>(rng: &mut R) -> String {
	format!("0x{:08x}", rng.r#gen::<u32>())
}

/// Owns the block stream and the RNG used to recycle blocks.
pub struct TransactionBlocks<R: Rng> {
	/// The stream, in spawn order.
	pub blocks: Vec<DataBlock>,
	settings: BlockSettings,
	rng: R,
}

impl<R: Rng> TransactionBlocks<R> {
	/// Spawns `settings.count` blocks scattered across the canvas.
	pub fn new(settings: BlockSettings, palette: &Palette, width: f64, height: f64, mut rng: R) -> Self {
		let blocks = (0..settings.count)
			.map(|_| {
				let w = rng.gen_range(90.0..140.0);
				let h = rng.gen_range(28.0..40.0);
				DataBlock {
					x: rng.gen_range(-w..=width.max(0.0)),
					y: rng.gen_range(0.0..=(height - h).max(0.0)),
					width: w,
					height: h,
					speed: rng.gen_range(0.3..1.0) * settings.speed,
					label: random_label(&mut rng),
					color: palette.swatch(rng.gen_range(0..3)),
					opacity: rng.gen_range(0.4..=1.0) * settings.opacity,
				}
			})
			.collect();

		Self {
			blocks,
			settings,
			rng,
		}
	}

	/// Settings the stream was built with.
	pub fn settings(&self) -> &BlockSettings {
		&self.settings
	}

	/// Repaints block colours after the palette changes.
	pub fn recolor(&mut self, old: &Palette, new: &Palette) {
		for block in &mut self.blocks {
			let slot = (0..3)
				.find(|&i| old.swatch(i) == block.color)
				.unwrap_or(0);
			block.color = new.swatch(slot);
		}
	}

	/// Keeps rows inside a resized canvas.
	pub fn resize(&mut self, height: f64) {
		for b in &mut self.blocks {
			b.y = b.y.clamp(0.0, (height - b.height).max(0.0));
		}
	}

	/// Drifts every block, recycling the ones that left the canvas.
	pub fn advance(&mut self, width: f64, height: f64) {
		for b in &mut self.blocks {
			b.x += b.speed;
			if b.x > width {
				b.x = -b.width;
				b.y = self.rng.gen_range(0.0..=(height - b.height).max(0.0));
				b.label = random_label(&mut self.rng);
			}
		}
	}

	/// Draws guide lines, bodies, corner brackets and labels.
	pub fn draw<S: Surface + ?Sized>(&self, width: f64, surface: &mut S, palette: &Palette) {
		for b in &self.blocks {
			let mid_y = b.y + b.height / 2.0;
			surface.stroke_line(
				(0.0, mid_y),
				(width, mid_y),
				b.color.with_alpha(0.08 * b.opacity),
				palette.line_width * 0.5,
			);

			surface.fill_rect(b.x, b.y, b.width, b.height, b.color.with_alpha(0.1 * b.opacity));
			surface.stroke_rect(
				b.x,
				b.y,
				b.width,
				b.height,
				b.color.with_alpha(b.opacity),
				palette.line_width,
			);

			let stroke = b.color.with_alpha(b.opacity);
			for corner in bracket_paths(b) {
				surface.stroke_path(&corner, stroke, palette.line_width * 1.5);
			}

			surface.fill_text(
				&b.label,
				b.x + b.width / 2.0,
				mid_y,
				LABEL_FONT,
				b.color.with_alpha(b.opacity),
			);
		}
	}

	/// Full standalone frame: hard clear, drift, then drawing.
	pub fn advance_and_render<S: Surface + ?Sized>(
		&mut self,
		width: f64,
		height: f64,
		surface: &mut S,
		palette: &Palette,
	) {
		surface.clear(width, height);
		self.advance(width, height);
		self.draw(width, surface, palette);
	}
}

/// L-shaped marks just outside each corner of the block.
fn bracket_paths(b: &DataBlock) -> [[(f64, f64); 3]; 4] {
	let (l, t) = (b.x - 2.0, b.y - 2.0);
	let (r, bo) = (b.x + b.width + 2.0, b.y + b.height + 2.0);
	[
		[(l, t + BRACKET), (l, t), (l + BRACKET, t)],
		[(r - BRACKET, t), (r, t), (r, t + BRACKET)],
		[(r, bo - BRACKET), (r, bo), (r - BRACKET, bo)],
		[(l + BRACKET, bo), (l, bo), (l, bo - BRACKET)],
	]
}
