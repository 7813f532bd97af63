//! Diagram renderer seam for Charta.
//!
//! The pipeline never interprets diagram source itself; it hands
//! `(render id, source text)` to a [`DiagramRenderer`] and receives either
//! markup or an opaque [`RenderError`]. Two implementations ship here:
//!
//! - [`KrokiRenderer`]: renders via a Kroki server over HTTP
//! - the engine's tests provide their own scripted double
//!
//! [`diagnostics`] maps the renderer's human-unfriendly failure strings to
//! presentable summaries.

pub mod diagnostics;
mod kroki;
mod renderer;

pub use kroki::KrokiRenderer;
pub use renderer::{DiagramRenderer, RenderError};
