//! Effect presets and the host-facing configuration surface.
//!
//! Hosts pick a named [`EffectPreset`] and may override individual options
//! through [`EffectConfig`], which deserializes from the camelCase JSON the
//! site templates embed. [`EffectConfig::resolve`] folds both into the
//! concrete [`EffectSettings`] the orchestrator runs with.

use serde::Deserialize;

use super::blocks::BlockSettings;
use super::color::ThemeHint;
use super::grid::GridSettings;
use super::particles::ParticleSettings;

/// Upper bound on `nodeCount`; the link scan is quadratic.
pub const MAX_NODES: usize = 150;
/// Upper bound on `blockCount`.
pub const MAX_BLOCKS: usize = 20;

/// Named configuration bundles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectPreset {
	/// Every layer, auto theme.
	#[default]
	Hero,
	/// Particles and grid on a light background.
	Light,
	/// Particles and grid on a dark background.
	Dark,
	/// Faint particles only.
	Minimal,
	/// Renders nothing.
	None,
}

/// Optional overrides on top of a preset. Unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectConfig {
	/// Base bundle the other fields override.
	pub preset: EffectPreset,
	/// Palette selection (`theme` or `variant`).
	#[serde(alias = "variant")]
	pub theme: Option<ThemeHint>,
	/// Particle count, at most [`MAX_NODES`].
	pub node_count: Option<usize>,
	/// Shared particle and block speed multiplier (`speed` or `nodeSpeed`).
	#[serde(alias = "nodeSpeed")]
	pub speed: Option<f64>,
	/// Shared alpha multiplier in `[0, 1]` (`opacity` or `nodeOpacity`).
	#[serde(alias = "nodeOpacity")]
	pub opacity: Option<f64>,
	/// Link distance in pixels.
	pub connection_distance: Option<f64>,
	/// Grid cell size in pixels, at least 8.
	pub cell_size: Option<f64>,
	/// Pointer-driven grid brightening and cell highlight.
	pub interactive: Option<bool>,
	/// Grid layer on or off.
	pub show_grid: Option<bool>,
	/// Particle layer on or off; defaults to on.
	pub show_particles: Option<bool>,
	/// Transaction block layer on or off.
	pub show_transactions: Option<bool>,
	/// Transaction block count, at most [`MAX_BLOCKS`].
	pub block_count: Option<usize>,
	/// Turns every layer off regardless of preset.
	pub disabled: Option<bool>,
}

/// Fully resolved settings for one effect instance.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSettings {
	/// Hint passed to [`resolve_palette`](super::color::resolve_palette).
	pub theme: ThemeHint,
	/// `None` when the particle layer is off.
	pub particles: Option<ParticleSettings>,
	/// `None` when the grid layer is off.
	pub grid: Option<GridSettings>,
	/// `None` when the transaction layer is off.
	pub blocks: Option<BlockSettings>,
}

impl EffectSettings {
	/// True when no sub-effect would draw anything.
	pub fn is_disabled(&self) -> bool {
		self.particles.is_none() && self.grid.is_none() && self.blocks.is_none()
	}

	fn disabled() -> Self {
		Self {
			theme: ThemeHint::Auto,
			particles: None,
			grid: None,
			blocks: None,
		}
	}
}

/// Raw preset values before overrides.
struct PresetValues {
	theme: ThemeHint,
	node_count: usize,
	speed: f64,
	opacity: f64,
	connection_distance: f64,
	cell_size: f64,
	show_grid: bool,
	show_transactions: bool,
}

impl EffectPreset {
	fn values(self) -> Option<PresetValues> {
		let v = match self {
			EffectPreset::Hero => PresetValues {
				theme: ThemeHint::Auto,
				node_count: 35,
				speed: 1.0,
				opacity: 0.6,
				connection_distance: 200.0,
				cell_size: 80.0,
				show_grid: true,
				show_transactions: true,
			},
			EffectPreset::Light => PresetValues {
				theme: ThemeHint::Light,
				node_count: 20,
				speed: 0.5,
				opacity: 0.3,
				connection_distance: 150.0,
				cell_size: 60.0,
				show_grid: true,
				show_transactions: false,
			},
			EffectPreset::Dark => PresetValues {
				theme: ThemeHint::Dark,
				node_count: 30,
				speed: 0.8,
				opacity: 0.5,
				connection_distance: 180.0,
				cell_size: 70.0,
				show_grid: true,
				show_transactions: false,
			},
			EffectPreset::Minimal => PresetValues {
				theme: ThemeHint::Subtle,
				node_count: 20,
				speed: 0.5,
				opacity: 0.2,
				connection_distance: 150.0,
				cell_size: 80.0,
				show_grid: false,
				show_transactions: false,
			},
			EffectPreset::None => return None,
		};
		Some(v)
	}
}

impl From<EffectPreset> for EffectConfig {
	fn from(preset: EffectPreset) -> Self {
		Self {
			preset,
			..Default::default()
		}
	}
}

impl EffectConfig {
	/// Parses a JSON config blob.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Merges overrides onto the preset and clamps out-of-range values.
	pub fn resolve(&self) -> EffectSettings {
		if self.disabled == Some(true) {
			return EffectSettings::disabled();
		}
		let Some(preset) = self.preset.values() else {
			return EffectSettings::disabled();
		};

		let speed = self.speed.unwrap_or(preset.speed).max(0.0);
		let opacity = self.opacity.unwrap_or(preset.opacity).clamp(0.0, 1.0);

		let particles = self
			.show_particles
			.unwrap_or(true)
			.then(|| ParticleSettings {
				node_count: self.node_count.unwrap_or(preset.node_count).min(MAX_NODES),
				connection_distance: self
					.connection_distance
					.unwrap_or(preset.connection_distance)
					.max(0.0),
				speed,
				opacity,
			});

		let grid = self
			.show_grid
			.unwrap_or(preset.show_grid)
			.then(|| GridSettings {
				cell_size: self.cell_size.unwrap_or(preset.cell_size).max(8.0),
				interactive: self.interactive.unwrap_or(true),
			});

		let blocks = self
			.show_transactions
			.unwrap_or(preset.show_transactions)
			.then(|| BlockSettings {
				count: self
					.block_count
					.unwrap_or(BlockSettings::default().count)
					.min(MAX_BLOCKS),
				speed,
				opacity,
			});

		EffectSettings {
			theme: self.theme.unwrap_or(preset.theme),
			particles,
			grid,
			blocks,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hero_preset_enables_everything() {
		let s = EffectConfig::from(EffectPreset::Hero).resolve();
		assert_eq!(s.theme, ThemeHint::Auto);
		let p = s.particles.unwrap();
		assert_eq!(p.node_count, 35);
		assert_eq!(p.connection_distance, 200.0);
		assert_eq!(s.grid.unwrap().cell_size, 80.0);
		assert_eq!(s.blocks.unwrap().count, 5);
	}

	#[test]
	fn minimal_preset_has_no_grid() {
		let s = EffectConfig::from(EffectPreset::Minimal).resolve();
		assert!(s.grid.is_none());
		assert!(s.blocks.is_none());
		assert_eq!(s.theme, ThemeHint::Subtle);
		assert_eq!(s.particles.unwrap().opacity, 0.2);
	}

	#[test]
	fn none_preset_and_disabled_flag_render_nothing() {
		assert!(EffectConfig::from(EffectPreset::None).resolve().is_disabled());
		let cfg = EffectConfig {
			disabled: Some(true),
			..EffectPreset::Dark.into()
		};
		assert!(cfg.resolve().is_disabled());
	}

	#[test]
	fn parses_host_json_with_aliases() {
		let cfg = EffectConfig::from_json(
			r#"{
				"preset": "dark",
				"variant": "light",
				"nodeCount": 12,
				"nodeSpeed": 0.25,
				"nodeOpacity": 0.4,
				"connectionDistance": 120,
				"cellSize": 64,
				"interactive": false,
				"somethingElse": 1
			}"#,
		)
		.unwrap();
		let s = cfg.resolve();
		assert_eq!(s.theme, ThemeHint::Light);
		let p = s.particles.unwrap();
		assert_eq!(p.node_count, 12);
		assert_eq!(p.speed, 0.25);
		assert_eq!(p.opacity, 0.4);
		assert_eq!(p.connection_distance, 120.0);
		let g = s.grid.unwrap();
		assert_eq!(g.cell_size, 64.0);
		assert!(!g.interactive);
	}

	#[test]
	fn empty_json_is_hero() {
		let cfg = EffectConfig::from_json("{}").unwrap();
		assert_eq!(cfg.preset, EffectPreset::Hero);
		assert_eq!(cfg.resolve(), EffectConfig::default().resolve());
	}

	#[test]
	fn out_of_range_values_are_clamped() {
		let cfg = EffectConfig {
			opacity: Some(3.0),
			speed: Some(-1.0),
			cell_size: Some(0.0),
			node_count: Some(100_000),
			block_count: Some(1_000),
			..Default::default()
		};
		let s = cfg.resolve();
		let p = s.particles.unwrap();
		assert_eq!(p.opacity, 1.0);
		assert_eq!(p.speed, 0.0);
		assert_eq!(p.node_count, MAX_NODES);
		assert_eq!(s.grid.unwrap().cell_size, 8.0);
		assert_eq!(s.blocks.unwrap().count, MAX_BLOCKS);
	}

	#[test]
	fn huge_counts_from_json_are_capped() {
		let cfg = EffectConfig::from_json(
			r#"{"preset": "light", "nodeCount": 1000000, "showTransactions": true, "blockCount": 500}"#,
		)
		.unwrap();
		let s = cfg.resolve();
		assert_eq!(s.particles.unwrap().node_count, MAX_NODES);
		assert_eq!(s.blocks.unwrap().count, MAX_BLOCKS);

		let small = EffectConfig {
			node_count: Some(3),
			block_count: Some(2),
			..Default::default()
		}
		.resolve();
		assert_eq!(small.particles.unwrap().node_count, 3);
		assert_eq!(small.blocks.unwrap().count, 2);
	}

	#[test]
	fn sub_effects_can_be_toggled() {
		let cfg = EffectConfig {
			show_particles: Some(false),
			show_grid: Some(true),
			..EffectPreset::Minimal.into()
		};
		let s = cfg.resolve();
		assert!(s.particles.is_none());
		assert!(s.grid.is_some());
		assert!(!s.is_disabled());
	}

	#[test]
	fn bad_json_is_an_error() {
		assert!(EffectConfig::from_json(r#"{"preset": "sparkly"}"#).is_err());
	}
}
