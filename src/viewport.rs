//! Pixel geometry shared by the views.
//!
//! A [`Viewport`] is the plot area plus its margins, in CSS pixels, and the
//! device pixel ratio used to size backing stores. Views do not inherit
//! geometry handling; they hold a `Viewport` and call the free functions here.

use crate::error::RollError;
use serde::{Deserialize, Serialize};

/// Gap between the detail lanes and the overview strip
pub const OVERVIEW_GAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Plot width, margins excluded
    pub width: f64,
    /// Plot height, margins excluded
    pub height: f64,
    pub margin: Margin,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Derive the plot area from the outer (container) size.
    pub fn from_outer(
        outer_width: f64,
        outer_height: f64,
        margin: Margin,
        device_pixel_ratio: f64,
    ) -> Result<Self, RollError> {
        let width = outer_width - margin.left - margin.right;
        let height = outer_height - margin.top - margin.bottom;
        if !(width > 0.0 && height > 0.0) {
            return Err(RollError::InvalidArgument(format!(
                "viewport {}x{} leaves no room inside its margins",
                outer_width, outer_height
            )));
        }
        if !(device_pixel_ratio > 0.0 && device_pixel_ratio.is_finite()) {
            return Err(RollError::InvalidArgument(format!(
                "device pixel ratio must be > 0, got {}",
                device_pixel_ratio
            )));
        }
        Ok(Self {
            width,
            height,
            margin,
            device_pixel_ratio,
        })
    }

    pub fn outer_width(&self) -> f64 {
        self.width + self.margin.left + self.margin.right
    }

    pub fn outer_height(&self) -> f64 {
        self.height + self.margin.top + self.margin.bottom
    }

    /// Backing-store size in device pixels, re-derived on every initialisation
    pub fn backing_size(&self) -> (u32, u32) {
        backing_size(self.outer_width(), self.outer_height(), self.device_pixel_ratio)
    }
}

/// Something that re-lays itself out when its container changes size
pub trait Resizable {
    fn resize(&mut self, viewport: Viewport);
    fn viewport(&self) -> &Viewport;
}

/// Something that can repaint its surfaces
pub trait Drawable {
    /// Full repaint: static layers and time-varying layers.
    fn draw(&mut self);
    /// Repaint only what changes with playback time.
    fn redraw_frame(&mut self, current_time: f64);
}

/// Device-pixel size for a CSS-pixel area
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let w = (css_width * device_pixel_ratio).ceil().max(1.0);
    let h = (css_height * device_pixel_ratio).ceil().max(1.0);
    (w as u32, h as u32)
}

/// Horizontal split of a roll: detail lanes on the left, overview strip on the right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollLayout {
    pub detail_x: (f64, f64),
    pub overview_x: (f64, f64),
    /// Inverted: time origin at the bottom
    pub y: (f64, f64),
    pub overview_width: f64,
}

impl RollLayout {
    pub fn new(viewport: &Viewport, overview_width: f64) -> Self {
        let overview_x1 = viewport.margin.left + viewport.width - overview_width;
        Self {
            detail_x: (viewport.margin.left, overview_x1 - OVERVIEW_GAP),
            overview_x: (overview_x1, overview_x1 + overview_width),
            y: (viewport.height, 0.0),
            overview_width,
        }
    }
}
