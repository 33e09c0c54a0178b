// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame renderers.
//!
//! Two disjoint strategies: [`RasterizingRenderer`] draws synthetic content
//! into pooled buffers, [`PassthroughRenderer`] forwards buffers that a decode
//! layer already produced without touching their pixels.

mod canvas;
mod glyphs;
mod passthrough;
mod rasterizer;

pub use canvas::{Canvas, Color, Rect};
pub use passthrough::PassthroughRenderer;
pub use rasterizer::{MAX_PIXEL_DIMENSION, RasterizingRenderer};
