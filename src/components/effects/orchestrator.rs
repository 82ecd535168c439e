//! Effect composition and render-loop lifecycle.
//!
//! [`EffectState`] owns every sub-effect for one mounted canvas and knows how
//! to compose a frame. [`RenderLoop`] drives it through a [`FrameScheduler`]:
//! a frame is only rescheduled while the loop is running, so stopping is an
//! explicit state change rather than a dropped closure.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::blocks::TransactionBlocks;
use super::color::{Color, Palette, resolve_palette};
use super::config::EffectSettings;
use super::grid::{GridRenderer, Pointer};
use super::particles::ParticleField;
use super::surface::Surface;

/// Seed for effect randomness, from the platform entropy source.
pub fn entropy_seed() -> u64 {
	let mut buf = [0u8; 8];
	match getrandom::getrandom(&mut buf) {
		Ok(()) => u64::from_le_bytes(buf),
		Err(e) => {
			warn!("lab-effects: no entropy source ({}), using fixed seed", e);
			0x5eed_c12f_1ab0_0001
		}
	}
}

/// Everything one mounted effect owns.
pub struct EffectState {
	settings: EffectSettings,
	background: Option<Color>,
	palette: Palette,
	particles: Option<ParticleField>,
	grid: Option<GridRenderer>,
	blocks: Option<TransactionBlocks<SmallRng>>,
	pointer: Pointer,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl EffectState {
	/// Builds every enabled layer for a `width` x `height` canvas over
	/// `background`. Equal seeds give equal frames.
	pub fn new(
		settings: EffectSettings,
		background: Option<Color>,
		width: f64,
		height: f64,
		seed: u64,
	) -> Self {
		let palette = resolve_palette(background, settings.theme);
		let mut rng = SmallRng::seed_from_u64(seed);

		let particles = settings
			.particles
			.clone()
			.map(|p| ParticleField::new(p, &palette, width, height, &mut rng));
		let grid = settings.grid.clone().map(GridRenderer::new);
		let blocks = settings.blocks.clone().map(|b| {
			let block_rng = SmallRng::seed_from_u64(seed.wrapping_add(1));
			TransactionBlocks::new(b, &palette, width, height, block_rng)
		});

		Self {
			settings,
			background,
			palette,
			particles,
			grid,
			blocks,
			pointer: Pointer::OFFSCREEN,
			width,
			height,
		}
	}

	/// Settings the effect was built with.
	pub fn settings(&self) -> &EffectSettings {
		&self.settings
	}

	/// Palette for the current background.
	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// Last sampled background colour.
	pub fn background(&self) -> Option<Color> {
		self.background
	}

	/// Particle layer, if enabled.
	pub fn particles(&self) -> Option<&ParticleField> {
		self.particles.as_ref()
	}

	/// Mutable particle layer, if enabled.
	pub fn particles_mut(&mut self) -> Option<&mut ParticleField> {
		self.particles.as_mut()
	}

	/// Transaction layer, if enabled.
	pub fn blocks(&self) -> Option<&TransactionBlocks<SmallRng>> {
		self.blocks.as_ref()
	}

	/// Mutable transaction layer, if enabled.
	pub fn blocks_mut(&mut self) -> Option<&mut TransactionBlocks<SmallRng>> {
		self.blocks.as_mut()
	}

	/// Pointer position the next frame will use.
	pub fn pointer(&self) -> Pointer {
		self.pointer
	}

	/// Records the latest pointer position; the next frame uses it.
	pub fn set_pointer(&mut self, pointer: Pointer) {
		self.pointer = pointer;
	}

	/// Parks the pointer at [`Pointer::OFFSCREEN`].
	pub fn pointer_left(&mut self) {
		self.pointer = Pointer::OFFSCREEN;
	}

	/// Re-resolves the palette against a newly sampled background.
	pub fn set_background(&mut self, background: Option<Color>) {
		self.background = background;
		let palette = resolve_palette(background, self.settings.theme);
		if palette == self.palette {
			return;
		}
		debug!("lab-effects: palette now {:?}", palette.theme);
		if let Some(ref mut p) = self.particles {
			p.recolor(&self.palette, &palette);
		}
		if let Some(ref mut b) = self.blocks {
			b.recolor(&self.palette, &palette);
		}
		self.palette = palette;
	}

	/// Moves layers into the new canvas bounds.
	pub fn resize(&mut self, width: f64, height: f64) {
		if let Some(ref mut p) = self.particles {
			p.resize(width, height);
		}
		if let Some(ref mut b) = self.blocks {
			b.resize(height);
		}
		self.width = width;
		self.height = height;
	}

	/// Composes one frame: clear, grid, particles, then blocks.
	///
	/// Always starts from a hard clear. The particle trail is only painted by a
	/// field running standalone through [`ParticleField::advance_and_render`].
	pub fn render_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) {
		let (w, h) = (self.width, self.height);
		if w <= 0.0 || h <= 0.0 {
			return;
		}

		surface.clear(w, h);

		if let Some(ref grid) = self.grid {
			grid.render(w, h, surface, self.pointer, &self.palette);
		}
		if let Some(ref mut p) = self.particles {
			p.advance(w, h);
			p.draw(surface, &self.palette);
		}
		if let Some(ref mut b) = self.blocks {
			b.advance(w, h);
			b.draw(w, surface, &self.palette);
		}
	}
}

/// Host primitive that runs a callback before the next paint.
pub trait FrameScheduler {
	/// Asks for one callback before the next paint.
	fn request_frame(&mut self);
	/// Drops a pending request, if any.
	fn cancel_frame(&mut self);
}

/// Lifecycle of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
	/// Not mounted yet.
	Idle,
	/// Rendering and rescheduling every frame.
	Running,
	/// Unmounted; frames that still arrive are ignored.
	Stopped,
}

/// Drives an [`EffectState`] one frame at a time.
pub struct RenderLoop<F: FrameScheduler> {
	scheduler: F,
	phase: LoopPhase,
	state: Option<EffectState>,
}

impl<F: FrameScheduler> RenderLoop<F> {
	/// Idle loop over `scheduler`.
	pub fn new(scheduler: F) -> Self {
		Self {
			scheduler,
			phase: LoopPhase::Idle,
			state: None,
		}
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> LoopPhase {
		self.phase
	}

	/// Whether frames are currently being rescheduled.
	pub fn is_running(&self) -> bool {
		self.phase == LoopPhase::Running
	}

	/// The frame scheduler the loop drives.
	pub fn scheduler(&self) -> &F {
		&self.scheduler
	}

	/// The mounted effect, while there is one.
	pub fn state(&self) -> Option<&EffectState> {
		self.state.as_ref()
	}

	/// Mutable access to the mounted effect.
	pub fn state_mut(&mut self) -> Option<&mut EffectState> {
		self.state.as_mut()
	}

	/// Takes ownership of `state` and schedules the first frame.
	/// Disabled effects are not started. Returns whether the loop is running.
	pub fn mount(&mut self, state: EffectState) -> bool {
		if state.settings().is_disabled() {
			debug!("lab-effects: effect disabled, not mounting");
			return false;
		}
		if self.is_running() {
			self.scheduler.cancel_frame();
		}
		info!(
			"lab-effects: mounted {}x{} effect",
			state.width, state.height
		);
		self.state = Some(state);
		self.phase = LoopPhase::Running;
		self.scheduler.request_frame();
		true
	}

	/// Renders one frame and schedules the next, only while running.
	pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) {
		if !self.is_running() {
			return;
		}
		if let Some(ref mut state) = self.state {
			state.render_frame(surface);
		}
		self.scheduler.request_frame();
	}

	/// Stops the loop and discards the effect state.
	pub fn unmount(&mut self) {
		if self.is_running() {
			self.scheduler.cancel_frame();
			info!("lab-effects: unmounted effect");
		}
		self.phase = LoopPhase::Stopped;
		self.state = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::effects::config::{EffectConfig, EffectPreset};
	use crate::components::effects::surface::{DrawLog, DrawOp};

	#[derive(Default)]
	struct Counting {
		requested: usize,
		cancelled: usize,
	}

	impl FrameScheduler for Counting {
		fn request_frame(&mut self) {
			self.requested += 1;
		}

		fn cancel_frame(&mut self) {
			self.cancelled += 1;
		}
	}

	fn state(preset: EffectPreset) -> EffectState {
		EffectState::new(
			EffectConfig::from(preset).resolve(),
			None,
			640.0,
			480.0,
			3,
		)
	}

	#[test]
	fn mount_schedules_and_frames_reschedule() {
		let mut rl = RenderLoop::new(Counting::default());
		assert_eq!(rl.phase(), LoopPhase::Idle);
		assert!(rl.mount(state(EffectPreset::Dark)));
		assert_eq!(rl.scheduler().requested, 1);

		let mut log = DrawLog::new();
		for _ in 0..5 {
			rl.on_frame(&mut log);
		}
		assert_eq!(rl.scheduler().requested, 6);
		assert!(!log.ops.is_empty());
	}

	#[test]
	fn unmount_stops_scheduling() {
		let mut rl = RenderLoop::new(Counting::default());
		rl.mount(state(EffectPreset::Hero));
		rl.unmount();
		let before = rl.scheduler().requested;

		// a callback that was already queued still fires once
		let mut log = DrawLog::new();
		rl.on_frame(&mut log);
		rl.on_frame(&mut log);

		assert_eq!(rl.scheduler().requested, before);
		assert_eq!(rl.scheduler().cancelled, 1);
		assert!(log.ops.is_empty());
		assert!(rl.state().is_none());
		assert_eq!(rl.phase(), LoopPhase::Stopped);
	}

	#[test]
	fn none_preset_never_schedules() {
		let mut rl = RenderLoop::new(Counting::default());
		assert!(!rl.mount(state(EffectPreset::None)));
		let mut log = DrawLog::new();
		rl.on_frame(&mut log);
		assert_eq!(rl.scheduler().requested, 0);
		assert!(log.ops.is_empty());
		rl.unmount();
		assert_eq!(rl.scheduler().cancelled, 0);
	}

	#[test]
	fn remount_after_unmount() {
		let mut rl = RenderLoop::new(Counting::default());
		rl.mount(state(EffectPreset::Light));
		rl.unmount();
		assert!(rl.mount(state(EffectPreset::Light)));
		assert!(rl.is_running());
		assert_eq!(rl.scheduler().requested, 2);
	}

	#[test]
	fn composed_frames_start_with_clear() {
		let mut log = DrawLog::new();
		for preset in [EffectPreset::Hero, EffectPreset::Light, EffectPreset::Dark] {
			let mut s = state(preset);
			for _ in 0..3 {
				log.reset();
				s.render_frame(&mut log);
				assert!(matches!(log.ops.first(), Some(DrawOp::Clear { .. })));
				let trail = s.palette().trail;
				assert!(!log.ops.iter().any(
					|op| matches!(op, DrawOp::FillRect { color, .. } if *color == trail)
				));
			}
		}
	}

	#[test]
	fn zero_sized_canvas_draws_nothing() {
		let mut s = state(EffectPreset::Hero);
		s.resize(0.0, 0.0);
		let mut log = DrawLog::new();
		s.render_frame(&mut log);
		assert!(log.ops.is_empty());
	}

	#[test]
	fn background_change_recolors_auto_theme() {
		let mut s = state(EffectPreset::Hero);
		assert_eq!(*s.palette(), Palette::dark_background());
		s.set_background(Some(Color::rgb(250, 250, 250)));
		assert_eq!(*s.palette(), Palette::light_background());
		let light = Palette::light_background();
		for n in &s.particles().unwrap().nodes {
			assert!((0..3).any(|i| light.swatch(i) == n.color));
		}
	}

	#[test]
	fn same_seed_same_frame() {
		let mut a = state(EffectPreset::Hero);
		let mut b = state(EffectPreset::Hero);
		let (mut la, mut lb) = (DrawLog::new(), DrawLog::new());
		for _ in 0..10 {
			a.render_frame(&mut la);
			b.render_frame(&mut lb);
		}
		assert_eq!(la.ops, lb.ops);
	}
}
