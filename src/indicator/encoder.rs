//! # Indicator State
//!
//! Holds the desired lightbar look and a dirty flag. Two send paths:
//!
//! - [`IndicatorState::send_blocking`]: bounded retry loop, only at attach.
//! - [`IndicatorState::poll`]: one non-blocking attempt per poll tick while
//!   dirty, spaced by a minimum retry interval.
//!
//! The dirty flag clears only when a send succeeds.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::protocol::{encode_output_report, Brightness, IndicatorSettings};
use crate::config::IndicatorConfig;
use crate::controller::{ControllerFamily, Profile};
use crate::transport::ReportTransport;

/// Desired indicator look plus delivery bookkeeping.
#[derive(Debug, Clone)]
pub struct IndicatorState {
    settings: IndicatorSettings,
    brightness: Brightness,
    dirty: bool,
    retry_not_before: Option<Instant>,

    max_attempts: u32,
    retry_interval: Duration,
}

impl IndicatorState {
    /// Starts dirty with the default profile's look.
    #[must_use]
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            settings: IndicatorSettings::for_profile(Profile::default(), config.brightness),
            brightness: config.brightness,
            dirty: true,
            retry_not_before: None,
            max_attempts: config.attach_max_attempts,
            retry_interval: config.retry_interval(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switch to `profile`'s look and schedule a send on the next poll.
    pub fn mark_dirty(&mut self, profile: Profile) {
        self.settings = IndicatorSettings::for_profile(profile, self.brightness);
        self.dirty = true;
        self.retry_not_before = None;
    }

    /// Best-effort send at attach: up to `attach_max_attempts` tries,
    /// yielding the thread between them.
    ///
    /// Returns `true` when the indicator was set.
    pub fn send_blocking<T>(&mut self, family: ControllerFamily, transport: &mut T) -> bool
    where
        T: ReportTransport + ?Sized,
    {
        let Some(report) = encode_output_report(family, &self.settings) else {
            self.dirty = false;
            return false;
        };

        for attempt in 1..=self.max_attempts {
            match transport.send_output_report(&report) {
                Ok(()) => {
                    debug!("Indicator set on attempt {}", attempt);
                    self.dirty = false;
                    self.retry_not_before = None;
                    return true;
                }
                Err(e) => {
                    debug!("Indicator send attempt {} failed: {}", attempt, e);
                    std::thread::yield_now();
                }
            }
        }

        warn!(
            "Indicator not set after {} attempts, retrying from the poll loop",
            self.max_attempts
        );
        false
    }

    /// One non-blocking attempt if dirty and the retry interval has passed.
    ///
    /// Returns `true` when a report was delivered on this call.
    pub fn poll<T>(&mut self, family: ControllerFamily, transport: &mut T, now: Instant) -> bool
    where
        T: ReportTransport + ?Sized,
    {
        if !self.dirty {
            return false;
        }
        if self.retry_not_before.is_some_and(|not_before| now < not_before) {
            return false;
        }
        let Some(report) = encode_output_report(family, &self.settings) else {
            self.dirty = false;
            return false;
        };

        match transport.send_output_report(&report) {
            Ok(()) => {
                info!("Indicator updated to {:?}", self.settings.color);
                self.dirty = false;
                self.retry_not_before = None;
                true
            }
            Err(e) => {
                debug!("Indicator send failed, retrying: {}", e);
                self.retry_not_before = Some(now + self.retry_interval);
                false
            }
        }
    }

    /// Back to the default profile's look, dirty.
    pub fn reset(&mut self) {
        self.mark_dirty(Profile::default());
    }
}
