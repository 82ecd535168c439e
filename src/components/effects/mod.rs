//! Decorative canvas background effects.
//!
//! Three independent visualizations share one colour model and one drawing
//! boundary:
//! - a node network that drifts, bounces off the walls and links nearby nodes
//! - a ledger grid whose lines and cells light up around the pointer
//! - labelled "transaction" blocks that stream across the canvas
//!
//! [`EffectState`] composes them per frame and [`RenderLoop`] drives it from
//! any [`FrameScheduler`]. [`EffectCanvas`] wires all of that to a real canvas
//! with `requestAnimationFrame`.
//!
//! # Example
//!
//! ```ignore
//! use lab_effects::{EffectCanvas, EffectConfig, EffectPreset};
//!
//! view! {
//!     <section class="hero" style="position: relative">
//!         <EffectCanvas config=EffectPreset::Hero />
//!         <h1>"CI2P Lab"</h1>
//!     </section>
//! }
//! ```

pub mod blocks;
pub mod color;
mod component;
pub mod config;
pub mod grid;
pub mod orchestrator;
pub mod particles;
pub mod surface;

pub use component::EffectCanvas;
pub use config::{EffectConfig, EffectPreset, EffectSettings};
pub use orchestrator::{EffectState, FrameScheduler, LoopPhase, RenderLoop};
pub use surface::{DrawLog, DrawOp, Surface};
