//! # Dualpad Host Library
//!
//! Profile remapping, macros and lightbar control for DualShock 4 and
//! DualSense controllers.
//!
//! Raw USB input reports go in, a canonical gamepad state comes out. In
//! between sit a change filter, a select+start profile toggle, timed macros
//! (mute pulse, turbo, anti-recoil) and a per-profile remap table. The
//! controller's lightbar shows the active profile.

pub mod config;
pub mod controller;
pub mod error;
pub mod hid;
pub mod indicator;
pub mod listener;
pub mod state_log;
pub mod transport;
