//! Interactive ledger grid.
//!
//! Draws a rectilinear grid whose lines brighten near the pointer, plus a
//! falloff highlight over the cells around it. The grid has no state of its
//! own beyond its settings; geometry is derived from the canvas size each frame.

use super::color::Palette;
use super::surface::Surface;

/// Distance (px) over which line opacity decays from max to base.
const LINE_FALLOFF: f64 = 300.0;
/// Highlight radius around the pointer cell, in cells.
const HIGHLIGHT_RADIUS: i64 = 3;
/// Fill opacity of the cell directly under the pointer.
const CENTER_CELL_OPACITY: f64 = 0.25;

/// Pointer position relative to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
	/// Pixels from the canvas's left edge.
	pub x: f64,
	/// Pixels from the canvas's top edge.
	pub y: f64,
}

impl Pointer {
	/// Far off-screen sentinel used once the pointer has left the canvas.
	pub const OFFSCREEN: Pointer = Pointer {
		x: -10_000.0,
		y: -10_000.0,
	};

	/// Pointer at canvas-relative `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Whether the pointer is over a pixel of a `width` x `height` canvas.
	/// The far edges are excluded so the pointer always maps to a real cell.
	pub fn is_within(&self, width: f64, height: f64) -> bool {
		(0.0..width).contains(&self.x) && (0.0..height).contains(&self.y)
	}
}

impl Default for Pointer {
	fn default() -> Self {
		Self::OFFSCREEN
	}
}

/// Grid geometry and behaviour.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSettings {
	/// Cell edge length in pixels.
	pub cell_size: f64,
	/// Whether the pointer modulates line opacity and highlights cells.
	pub interactive: bool,
}

impl Default for GridSettings {
	fn default() -> Self {
		Self {
			cell_size: 60.0,
			interactive: true,
		}
	}
}

/// Renders the grid. Holds only its settings.
#[derive(Clone, Debug, Default)]
pub struct GridRenderer {
	/// Geometry and pointer behaviour.
	pub settings: GridSettings,
}

impl GridRenderer {
	/// Renderer with the given settings.
	pub fn new(settings: GridSettings) -> Self {
		Self { settings }
	}

	/// Column and row counts for a canvas.
	pub fn dimensions(&self, width: f64, height: f64) -> (usize, usize) {
		let cell = self.settings.cell_size;
		if cell <= 0.0 || width <= 0.0 || height <= 0.0 {
			return (0, 0);
		}
		((width / cell).ceil() as usize, (height / cell).ceil() as usize)
	}

	/// Opacity of a line `distance` px away from the pointer.
	pub fn line_opacity(&self, distance: f64, palette: &Palette) -> f64 {
		if self.settings.interactive {
			palette
				.base_opacity
				.max(palette.max_opacity - distance / LINE_FALLOFF)
		} else {
			palette.base_opacity
		}
	}

	/// Draws one frame of the grid. Does not clear the surface.
	pub fn render<S: Surface + ?Sized>(
		&self,
		width: f64,
		height: f64,
		surface: &mut S,
		pointer: Pointer,
		palette: &Palette,
	) {
		let (cols, rows) = self.dimensions(width, height);
		if cols == 0 || rows == 0 {
			return;
		}
		let cell = self.settings.cell_size;

		for i in 0..=cols {
			let x = i as f64 * cell;
			let opacity = self.line_opacity((pointer.x - x).abs(), palette);
			let color = if i % 2 == 0 {
				palette.primary
			} else {
				palette.secondary
			};
			surface.stroke_line(
				(x, 0.0),
				(x, height),
				color.with_alpha(opacity),
				palette.line_width,
			);
		}

		for j in 0..=rows {
			let y = j as f64 * cell;
			let opacity = self.line_opacity((pointer.y - y).abs(), palette);
			let color = if j % 2 == 0 {
				palette.primary
			} else {
				palette.secondary
			};
			surface.stroke_line(
				(0.0, y),
				(width, y),
				color.with_alpha(opacity),
				palette.line_width,
			);
		}

		if self.settings.interactive && pointer.is_within(width, height) {
			self.highlight_cells(cols, rows, surface, pointer, palette);
		}
	}

	fn highlight_cells<S: Surface + ?Sized>(
		&self,
		cols: usize,
		rows: usize,
		surface: &mut S,
		pointer: Pointer,
		palette: &Palette,
	) {
		let cell = self.settings.cell_size;
		let cx = (pointer.x / cell).floor() as i64;
		let cy = (pointer.y / cell).floor() as i64;

		for dy in -HIGHLIGHT_RADIUS..=HIGHLIGHT_RADIUS {
			for dx in -HIGHLIGHT_RADIUS..=HIGHLIGHT_RADIUS {
				let (gx, gy) = (cx + dx, cy + dy);
				if gx < 0 || gy < 0 || gx >= cols as i64 || gy >= rows as i64 {
					continue;
				}
				let (x, y) = (gx as f64 * cell, gy as f64 * cell);

				if dx == 0 && dy == 0 {
					surface.fill_rect(
						x,
						y,
						cell,
						cell,
						palette.accent.with_alpha(CENTER_CELL_OPACITY),
					);
					surface.stroke_rect(
						x,
						y,
						cell,
						cell,
						palette.accent.with_alpha(palette.max_opacity),
						palette.line_width,
					);
					continue;
				}

				let distance = ((dx * dx + dy * dy) as f64).sqrt();
				if distance > HIGHLIGHT_RADIUS as f64 {
					continue;
				}
				let opacity =
					(1.0 - distance / HIGHLIGHT_RADIUS as f64) * palette.highlight_opacity;
				if opacity <= 0.0 {
					continue;
				}
				surface.fill_rect(x, y, cell, cell, palette.primary.with_alpha(opacity));
			}
		}
	}
}
