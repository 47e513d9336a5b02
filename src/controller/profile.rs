//! # Profile Switching
//!
//! Two remap profiles, switched by holding select and start together past a
//! threshold. A cooldown follows each toggle, and one continuous hold can
//! toggle at most once.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ProfileConfig;

/// Active remap profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Profile {
    /// Trigger remaps and the mute pulse
    #[default]
    ProfileA,
    /// Turbo, anti-recoil and analog triggers
    ProfileB,
}

impl Profile {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::ProfileA => Self::ProfileB,
            Self::ProfileB => Self::ProfileA,
        }
    }
}

/// Gesture-hold state machine for the select+start profile toggle.
#[derive(Debug, Clone)]
pub struct ProfileSwitch {
    hold_threshold: Duration,
    cooldown: Duration,

    active: Profile,
    held: bool,
    hold_start: Option<Instant>,
    cooldown_until: Option<Instant>,
    /// Set once the current hold has toggled; cleared on release.
    latched: bool,
}

impl ProfileSwitch {
    #[must_use]
    pub fn new(config: &ProfileConfig) -> Self {
        Self {
            hold_threshold: config.hold_threshold(),
            cooldown: config.cooldown(),
            active: Profile::default(),
            held: false,
            hold_start: None,
            cooldown_until: None,
            latched: false,
        }
    }

    /// Currently active profile.
    #[must_use]
    pub fn active(&self) -> Profile {
        self.active
    }

    /// True while select+start are held and the gesture has not fired yet.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.held && !self.latched
    }

    /// Evaluate one propagated report.
    ///
    /// Returns `true` when this call toggled the profile.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    /// use dualpad_host::config::ProfileConfig;
    /// use dualpad_host::controller::profile::{Profile, ProfileSwitch};
    ///
    /// let mut switch = ProfileSwitch::new(&ProfileConfig::default());
    /// let t0 = Instant::now();
    ///
    /// assert!(!switch.update(true, true, t0));
    /// assert!(switch.update(true, true, t0 + Duration::from_millis(2001)));
    /// assert_eq!(switch.active(), Profile::ProfileB);
    /// ```
    pub fn update(&mut self, select: bool, start: bool, now: Instant) -> bool {
        if !(select && start) {
            if self.held {
                debug!("Profile gesture released");
            }
            self.held = false;
            self.latched = false;
            return false;
        }

        let Some(hold_start) = self.hold_start.filter(|_| self.held) else {
            self.held = true;
            self.hold_start = Some(now);
            return false;
        };

        if self.latched {
            return false;
        }

        let held_long_enough = now.saturating_duration_since(hold_start) > self.hold_threshold;
        let cooled_down = self.cooldown_until.map_or(true, |until| now >= until);

        if held_long_enough && cooled_down {
            self.active = self.active.toggled();
            self.cooldown_until = Some(now + self.cooldown);
            self.latched = true;
            info!("Switched to {:?}", self.active);
            return true;
        }

        false
    }

    /// Back to the default profile with no gesture in progress.
    pub fn reset(&mut self) {
        self.active = Profile::default();
        self.held = false;
        self.hold_start = None;
        self.cooldown_until = None;
        self.latched = false;
    }
}
