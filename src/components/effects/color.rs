//! Colour model for the background effects.
//!
//! Resolves a [`Palette`] from a sampled background colour and a theme hint.
//! Everything here is pure: identical inputs always produce identical palettes.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with explicit alpha. Not clamped; use [`Color::with_alpha`] for
	/// computed values.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same colour at alpha `a`, clamped to `[0, 1]`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Whether the colour is invisible when painted.
	pub fn is_transparent(self) -> bool {
		self.a <= 0.001
	}

	/// CSS form of the colour. Only drawing surfaces should need this.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Theme requested by the host page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeHint {
	/// Always use the light-background palette.
	Light,
	/// Always use the dark-background palette.
	Dark,
	/// Dark-background colours at half the usual opacity.
	Subtle,
	/// Pick light or dark from the sampled background luminance.
	#[default]
	Auto,
}

/// Theme after `Auto` has been resolved against a background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedTheme {
	/// Background at or below [`LUMINANCE_THRESHOLD`], or unknown.
	Dark,
	/// Background above [`LUMINANCE_THRESHOLD`].
	Light,
}

/// Backgrounds brighter than this are treated as light.
pub const LUMINANCE_THRESHOLD: f64 = 0.5;

/// Resolved colours, opacities and stroke width for one effect instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	/// Main stroke colour; even grid lines and the first node swatch.
	pub primary: Color,
	/// Odd grid lines and the second node swatch.
	pub secondary: Color,
	/// Pointer cell border and the third node swatch.
	pub accent: Color,
	/// Floor for interactive opacity.
	pub base_opacity: f64,
	/// Ceiling for interactive opacity (lines right under the pointer).
	pub max_opacity: f64,
	/// Peak opacity of the cell highlight around the pointer.
	pub highlight_opacity: f64,
	/// Base stroke width in pixels.
	pub line_width: f64,
	/// Translucent overlay a standalone particle field paints each frame to
	/// leave motion trails.
	pub trail: Color,
	/// Which background the palette was built for.
	pub theme: ResolvedTheme,
}

impl Palette {
	/// Bright foreground for dark backgrounds.
	pub fn dark_background() -> Self {
		Self {
			primary: Color::rgb(56, 189, 248),   // Sky
			secondary: Color::rgb(167, 139, 250), // Violet
			accent: Color::rgb(52, 211, 153),    // Emerald
			base_opacity: 0.08,
			max_opacity: 0.5,
			highlight_opacity: 0.12,
			line_width: 1.0,
			trail: Color::rgba(8, 12, 24, 0.12),
			theme: ResolvedTheme::Dark,
		}
	}

	/// Darker foreground for light backgrounds. Strokes are wider and more
	/// opaque than the dark variant so they stay visible on pale surfaces.
	pub fn light_background() -> Self {
		Self {
			primary: Color::rgb(3, 105, 161),   // Deep sky
			secondary: Color::rgb(91, 33, 182), // Deep violet
			accent: Color::rgb(4, 120, 87),     // Deep emerald
			base_opacity: 0.136,
			max_opacity: 0.6,
			highlight_opacity: 0.16,
			line_width: 1.7,
			trail: Color::rgba(8, 12, 24, 0.12),
			theme: ResolvedTheme::Light,
		}
	}

	/// The three node/block colours, indexed modulo 3.
	pub fn swatch(&self, index: usize) -> Color {
		match index % 3 {
			0 => self.primary,
			1 => self.secondary,
			_ => self.accent,
		}
	}

	fn subdued(self) -> Self {
		Self {
			base_opacity: self.base_opacity * 0.5,
			max_opacity: self.max_opacity * 0.5,
			highlight_opacity: self.highlight_opacity * 0.5,
			..self
		}
	}
}

/// Perceptual luminance in `[0, 1]` (ITU-R BT.601 weights).
pub fn luminance(color: Color) -> f64 {
	(0.299 * color.r as f64 + 0.587 * color.g as f64 + 0.114 * color.b as f64) / 255.0
}

/// Classifies a background. Missing colours count as dark.
pub fn classify_background(background: Option<Color>) -> ResolvedTheme {
	match background {
		Some(c) if luminance(c) > LUMINANCE_THRESHOLD => ResolvedTheme::Light,
		_ => ResolvedTheme::Dark,
	}
}

/// Resolves the palette for a background colour and theme hint.
pub fn resolve_palette(background: Option<Color>, hint: ThemeHint) -> Palette {
	match hint {
		ThemeHint::Dark => Palette::dark_background(),
		ThemeHint::Light => Palette::light_background(),
		ThemeHint::Subtle => Palette::dark_background().subdued(),
		ThemeHint::Auto => match classify_background(background) {
			ResolvedTheme::Light => Palette::light_background(),
			ResolvedTheme::Dark => Palette::dark_background(),
		},
	}
}

/// First sample that is not fully transparent, walking from the element
/// outwards through its ancestors.
pub fn effective_background<I>(samples: I) -> Option<Color>
where
	I: IntoIterator<Item = Option<Color>>,
{
	samples
		.into_iter()
		.flatten()
		.find(|c| !c.is_transparent())
}

/// Parses a computed-style colour string into a [`Color`].
/// Supports `#rgb`, `#rrggbb`, `rgb()`/`rgba()` and `transparent`.
pub fn parse_css_color(color_str: &str) -> Option<Color> {
	let s = color_str.trim();
	if s.eq_ignore_ascii_case("transparent") {
		return Some(Color::rgba(0, 0, 0, 0.0));
	}
	if let Some(hex) = s.strip_prefix('#') {
		if !hex.is_ascii() {
			return None;
		}
		return match hex.len() {
			6 => Some(Color::rgb(
				u8::from_str_radix(&hex[0..2], 16).ok()?,
				u8::from_str_radix(&hex[2..4], 16).ok()?,
				u8::from_str_radix(&hex[4..6], 16).ok()?,
			)),
			3 => {
				let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
				Some(Color::rgb(nibble(0).ok()?, nibble(1).ok()?, nibble(2).ok()?))
			}
			_ => None,
		};
	}

	let inner = s
		.strip_prefix("rgba(")
		.or_else(|| s.strip_prefix("rgb("))?
		.strip_suffix(')')?;
	let nums: Vec<&str> = inner.split(',').map(str::trim).collect();
	if nums.len() < 3 {
		return None;
	}
	let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
	let a = match nums.get(3) {
		Some(s) => s.parse::<f64>().ok()?.clamp(0.0, 1.0),
		None => 1.0,
	};
	Some(Color::rgba(
		channel(nums[0])?,
		channel(nums[1])?,
		channel(nums[2])?,
		a,
	))
}
