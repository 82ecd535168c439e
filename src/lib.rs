//! lab-effects: canvas background effects for the CI2P Lab site.
//!
//! This crate provides WASM-based decorative effects (a moving node network,
//! an interactive ledger grid and streaming transaction blocks) that sit
//! behind page sections and react to the pointer and the page background.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::effects::{
	DrawLog, EffectCanvas, EffectConfig, EffectPreset, EffectState, FrameScheduler, RenderLoop,
	Surface,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("lab-effects: logging initialized");
}

/// Load the effect configuration from a script element with id="effect-config".
/// Expected format: JSON with the camelCase options of [`EffectConfig`].
fn load_effect_config() -> Option<EffectConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("effect-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match EffectConfig::from_json(&json_text) {
		Ok(config) => {
			info!("lab-effects: loaded {:?} preset config", config.preset);
			Some(config)
		}
		Err(e) => {
			warn!("lab-effects: failed to parse effect config: {}", e);
			None
		}
	}
}

/// Main application component.
/// A hero section using the page's effect config, followed by a light
/// section with the grid-only preset.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let hero = load_effect_config().unwrap_or_default();
	let section = EffectConfig {
		show_particles: Some(false),
		..EffectPreset::Light.into()
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="CI2P Lab" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<section class="hero" style="position: relative; min-height: 100vh; background: #0b1120;">
			<EffectCanvas config=hero />
			<div class="hero-content" style="position: relative;">
				<h1>"CI2P Lab"</h1>
				<p class="subtitle">"Research, publications and projects"</p>
			</div>
		</section>
		<section class="about" style="position: relative; min-height: 60vh; background: #f8fafc;">
			<EffectCanvas config=section />
			<div style="position: relative;">
				<h2>"About"</h2>
			</div>
		</section>
	}
}
