//! # Controller Module
//!
//! DualShock 4 and DualSense input handling.
//!
//! This module handles:
//! - Resolving the controller family from the USB product id
//! - Decoding raw input reports
//! - Filtering out reports that carry no meaningful change
//! - Profile switching by select+start hold
//! - Mute, turbo and anti-recoil macros
//! - Mapping to the canonical gamepad state

pub mod change_filter;
pub mod family;
pub mod macros;
pub mod mapper;
pub mod profile;
pub mod report;

pub use family::ControllerFamily;
pub use mapper::CanonicalGamepadState;
pub use profile::Profile;
