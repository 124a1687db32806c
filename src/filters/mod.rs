//! Filter modules.
//!
//! ## Supported Formats
//!
//! All filters accept images with any number of channels:
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) or (H, W) | u8 | Single luminance channel, 0-255 |
//! | Grayscale float | (H, W, 1) or (H, W) | f32 | Single luminance channel, 0.0-1.0 |
//! | Multi-channel 8-bit | (H, W, C) | u8 | Every channel filtered independently |
//! | Multi-channel float | (H, W, C) | f32 | Every channel filtered independently |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Fresh output** - The input view is never written to
//! - **Same shape** - Output has the input's shape and sample type
//! - **Fail fast** - Parameters are validated before any work starts
//! - **Stateless** - Nothing is shared between calls
//!
//! ## Filters
//!
//! - **Blur**: gaussian_filter (zero-padded convolution)
//! - **Noise**: median_filter (interior-only rank filter)
//! - **Bilateral**: bilateral_filter (edge-preserving, parallel workers)

pub mod core;
pub mod blur;
pub mod noise;
pub mod bilateral;
