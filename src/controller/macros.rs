//! # Macro Engine
//!
//! Time-boxed button injections evaluated once per propagated report:
//!
//! - **Mute pulse** (ProfileA): a rising edge on PS holds ○ and □ for a fixed
//!   pulse, then clears itself. Presses during the pulse are ignored.
//! - **Turbo** (ProfileB): while L1 is held, an injected ✕ flips every half
//!   period. Releasing L1 clears it at once.
//! - **Anti-recoil** (ProfileB): with both triggers past a threshold, the
//!   right stick Y is biased downward. Stateless, see [`anti_recoil`].

use std::time::{Duration, Instant};
use tracing::debug;

use super::profile::Profile;
use super::report::DecodedReport;
use crate::config::MacroConfig;

/// Injections the mapper ORs into the canonical button mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MacroOutput {
    /// Hold ○ and □
    pub mute: bool,
    /// Press ✕
    pub turbo: bool,
}

/// Timers and flags for the mute and turbo macros.
#[derive(Debug, Clone)]
pub struct MacroEngine {
    mute_pulse: Duration,
    turbo_half_period: Duration,

    mute_active: bool,
    mute_started: Option<Instant>,
    home_was_pressed: bool,

    /// Turbo trigger held; the square wave is running
    turbo_engaged: bool,
    /// Current phase of the square wave
    turbo_on: bool,
    turbo_last_toggle: Option<Instant>,
}

impl MacroEngine {
    #[must_use]
    pub fn new(config: &MacroConfig) -> Self {
        Self {
            mute_pulse: config.mute_pulse(),
            turbo_half_period: config.turbo_half_period(),
            mute_active: false,
            mute_started: None,
            home_was_pressed: false,
            turbo_engaged: false,
            turbo_on: false,
            turbo_last_toggle: None,
        }
    }

    /// True while a macro needs ticks even without fresh input.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.mute_active || self.turbo_engaged
    }

    /// Advance both macros for one propagated report.
    pub fn tick(&mut self, report: &DecodedReport, profile: Profile, now: Instant) -> MacroOutput {
        MacroOutput {
            mute: self.tick_mute(report.buttons.home, profile, now),
            turbo: self.tick_turbo(report.buttons.l1, profile, now),
        }
    }

    fn tick_mute(&mut self, home: bool, profile: Profile, now: Instant) -> bool {
        let rising_edge = home && !self.home_was_pressed;
        self.home_was_pressed = home;

        if profile == Profile::ProfileA && rising_edge && !self.mute_active {
            debug!("Mute pulse started");
            self.mute_active = true;
            self.mute_started = Some(now);
        }

        if self.mute_active {
            let elapsed = self
                .mute_started
                .map_or(Duration::MAX, |started| now.saturating_duration_since(started));
            if elapsed >= self.mute_pulse {
                debug!("Mute pulse finished");
                self.mute_active = false;
                self.mute_started = None;
            }
        }

        self.mute_active
    }

    fn tick_turbo(&mut self, trigger: bool, profile: Profile, now: Instant) -> bool {
        if profile != Profile::ProfileB || !trigger {
            self.turbo_engaged = false;
            self.turbo_on = false;
            return false;
        }

        self.turbo_engaged = true;
        let due = self
            .turbo_last_toggle
            .map_or(true, |last| now.saturating_duration_since(last) > self.turbo_half_period);
        if due {
            self.turbo_on = !self.turbo_on;
            self.turbo_last_toggle = Some(now);
        }

        self.turbo_on
    }

    /// Clear every macro.
    pub fn reset(&mut self) {
        self.mute_active = false;
        self.mute_started = None;
        self.home_was_pressed = false;
        self.turbo_engaged = false;
        self.turbo_on = false;
        self.turbo_last_toggle = None;
    }
}

/// Bias a canonical right-stick Y value when both triggers are past the
/// threshold.
///
/// # Examples
///
/// ```
/// use dualpad_host::controller::macros::anti_recoil;
///
/// assert_eq!(anti_recoil(32767, 255, 255, 200, 4000), 36767);
/// assert_eq!(anti_recoil(65000, 255, 255, 200, 4000), 65535);
/// assert_eq!(anti_recoil(32767, 255, 100, 200, 4000), 32767);
/// ```
#[must_use]
pub fn anti_recoil(ry: u16, left_trigger: u8, right_trigger: u8, threshold: u8, strength: u16) -> u16 {
    if left_trigger > threshold && right_trigger > threshold {
        ry.saturating_add(strength)
    } else {
        ry
    }
}
