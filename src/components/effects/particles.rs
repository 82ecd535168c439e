//! Moving node network ("blockchain data flow").
//!
//! A fixed population of nodes drifts around the canvas, bouncing off the
//! walls. Every frame each node scans all others and links to the ones within
//! `connection_distance`; closer pairs get more opaque links.

use rand::Rng;

use super::color::{Color, Palette};
use super::surface::Surface;

/// Peak alpha of a connection line before the opacity multiplier.
const LINK_ALPHA: f64 = 0.7;
/// How far the glow halo reaches past a node's radius.
const GLOW_REACH: f64 = 6.0;

/// Construction parameters for a [`ParticleField`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSettings {
	/// Number of nodes, fixed for the life of the field.
	pub node_count: usize,
	/// Pairs closer than this (in pixels) are linked.
	pub connection_distance: f64,
	/// Velocity multiplier.
	pub speed: f64,
	/// Overall alpha multiplier for links, glows and bodies.
	pub opacity: f64,
}

impl Default for ParticleSettings {
	fn default() -> Self {
		Self {
			node_count: 30,
			connection_distance: 180.0,
			speed: 1.0,
			opacity: 1.0,
		}
	}
}

/// A single moving node.
#[derive(Clone, Debug)]
pub struct Node {
	/// Horizontal position, within `[0, width]`.
	pub x: f64,
	/// Vertical position, within `[0, height]`.
	pub y: f64,
	/// Horizontal velocity in pixels per frame.
	pub vx: f64,
	/// Vertical velocity in pixels per frame.
	pub vy: f64,
	/// Body radius, fixed at creation.
	pub radius: f64,
	/// One of the palette swatches.
	pub color: Color,
	/// Indices of nodes linked during the most recent frame.
	pub connections: Vec<usize>,
}

impl Node {
	/// Euclidean distance between the two node centres.
	pub fn distance_to(&self, other: &Node) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Integrates one step and reflects off the walls of a `width` x `height` box.
	fn step(&mut self, width: f64, height: f64) {
		self.x += self.vx;
		self.y += self.vy;

		if self.x < 0.0 || self.x > width {
			self.vx = -self.vx;
		}
		if self.y < 0.0 || self.y > height {
			self.vy = -self.vy;
		}

		self.x = self.x.clamp(0.0, width.max(0.0));
		self.y = self.y.clamp(0.0, height.max(0.0));
	}
}

/// Owns and animates the node population.
pub struct ParticleField {
	/// The population, in spawn order.
	pub nodes: Vec<Node>,
	settings: ParticleSettings,
	width: f64,
	height: f64,
}

impl ParticleField {
	/// Spawns `settings.node_count` nodes at random positions inside the
	/// canvas, coloured from `palette`.
	pub fn new<R: Rng>(
		settings: ParticleSettings,
		palette: &Palette,
		width: f64,
		height: f64,
		rng: &mut R,
	) -> Self {
		let nodes = (0..settings.node_count)
			.map(|_| Node {
				x: rng.gen_range(0.0..=width.max(0.0)),
				y: rng.gen_range(0.0..=height.max(0.0)),
				vx: rng.gen_range(-0.5..=0.5) * settings.speed,
				vy: rng.gen_range(-0.5..=0.5) * settings.speed,
				radius: rng.gen_range(1.5..3.5),
				color: palette.swatch(rng.gen_range(0..3)),
				connections: Vec::new(),
			})
			.collect();

		Self {
			nodes,
			settings,
			width,
			height,
		}
	}

	/// Settings the field was built with.
	pub fn settings(&self) -> &ParticleSettings {
		&self.settings
	}

	/// Repaints node colours after the palette changes, keeping each node's slot.
	pub fn recolor(&mut self, old: &Palette, new: &Palette) {
		for node in &mut self.nodes {
			let slot = (0..3)
				.find(|&i| old.swatch(i) == node.color)
				.unwrap_or(0);
			node.color = new.swatch(slot);
		}
	}

	/// Rescales positions into new bounds.
	pub fn resize(&mut self, width: f64, height: f64) {
		let scale_x = if self.width > 0.0 { width / self.width } else { 1.0 };
		let scale_y = if self.height > 0.0 { height / self.height } else { 1.0 };

		for n in &mut self.nodes {
			n.x = (n.x * scale_x).clamp(0.0, width.max(0.0));
			n.y = (n.y * scale_y).clamp(0.0, height.max(0.0));
		}

		self.width = width;
		self.height = height;
	}

	/// Moves every node one step.
	pub fn advance(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		for n in &mut self.nodes {
			n.step(width, height);
		}
	}

	/// Recomputes connections and draws links, glows and node bodies.
	pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, palette: &Palette) {
		let max_dist = self.settings.connection_distance;
		let opacity = self.settings.opacity;

		for i in 0..self.nodes.len() {
			let mut connections = std::mem::take(&mut self.nodes[i].connections);
			connections.clear();

			let a = &self.nodes[i];
			for (j, b) in self.nodes.iter().enumerate() {
				if i == j {
					continue;
				}
				let dist = a.distance_to(b);
				if dist < max_dist {
					connections.push(j);
					let alpha = (1.0 - dist / max_dist) * LINK_ALPHA * opacity;
					surface.stroke_line(
						(a.x, a.y),
						(b.x, b.y),
						a.color.with_alpha(alpha),
						palette.line_width * 0.5,
					);
				}
			}

			self.nodes[i].connections = connections;
		}

		for n in &self.nodes {
			surface.fill_glow(
				n.x,
				n.y,
				n.radius,
				n.radius + GLOW_REACH,
				n.color.with_alpha(0.5 * opacity),
			);
			surface.fill_circle(n.x, n.y, n.radius, n.color.with_alpha(opacity));
		}
	}

	/// Full standalone frame: trail overlay, integration, then drawing.
	pub fn advance_and_render<S: Surface + ?Sized>(
		&mut self,
		width: f64,
		height: f64,
		surface: &mut S,
		palette: &Palette,
	) {
		surface.fill_rect(0.0, 0.0, width, height, palette.trail);
		self.advance(width, height);
		self.draw(surface, palette);
	}
}
