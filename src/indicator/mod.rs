//! # Indicator Module
//!
//! Drives the controller lightbar and player lights to show the active
//! profile.
//!
//! This module handles:
//! - Building byte-exact DS4 and DS5 output reports
//! - Tracking a dirty flag until a send succeeds
//! - Bounded retry at attach and paced retry from the poll loop

pub mod encoder;
pub mod protocol;

pub use encoder::IndicatorState;
pub use protocol::{Brightness, IndicatorSettings, Rgb};
