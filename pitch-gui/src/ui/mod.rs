//! # UI Module
//!
//! This module contains all UI components for the pitchscope window.

pub mod main_display;
pub mod spectrum_bars;
