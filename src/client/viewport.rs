//! Viewport and scroll helpers

use std::fmt;
use serde::{Deserialize, Serialize};

/// Widest viewport still treated as mobile, in CSS pixels
pub const MOBILE_MAX_WIDTH: u32 = 988;

/// Width and height of a viewport or screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Formats as `WIDTHxHEIGHT`, e.g. `1280x720`
impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub fn is_mobile(width: u32) -> bool {
    width <= MOBILE_MAX_WIDTH
}

/// Whether the page is scrolled to its top or bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub is_top: bool,
    pub is_bottom: bool,
}

impl ScrollPosition {
    pub fn from_metrics(scroll_y: u32, inner_height: u32, body_height: u32) -> Self {
        Self {
            is_top: scroll_y == 0,
            is_bottom: u64::from(inner_height) + u64::from(scroll_y) >= u64::from(body_height),
        }
    }
}

impl Default for ScrollPosition {
    /// An unscrolled page: at the top, not at the bottom
    fn default() -> Self {
        Self {
            is_top: true,
            is_bottom: false,
        }
    }
}
