//! # Change Filter
//!
//! Decides whether a freshly decoded report is worth pushing through the
//! profile, macro and mapping pipeline.
//!
//! - **DS4-class** reports carry no usable sequence counter, so the analog
//!   bytes are compared with a small noise tolerance and the button bytes
//!   exactly.
//! - **DS5-class** reports embed a sequence counter; any change in it
//!   propagates.
//!
//! Either way a running macro (or a select+start hold in progress) forces
//! propagation so timers keep ticking without fresh stick movement.

use super::report::ChangeToken;

/// Two analog samples within this distance are considered equal.
pub const AXIS_NOISE_TOLERANCE: u8 = 2;

/// Tracks the previous report's change token across calls.
#[derive(Debug, Default, Clone)]
pub struct ChangeFilter {
    previous: Option<ChangeToken>,
}

impl ChangeFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the update should propagate.
    ///
    /// The snapshot is replaced with `token` whether or not the update
    /// propagates.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualpad_host::controller::change_filter::ChangeFilter;
    /// use dualpad_host::controller::report::ChangeToken;
    ///
    /// let mut filter = ChangeFilter::new();
    /// assert!(filter.should_propagate(ChangeToken::Ds5 { counter: 1 }, false));
    /// assert!(!filter.should_propagate(ChangeToken::Ds5 { counter: 1 }, false));
    /// assert!(filter.should_propagate(ChangeToken::Ds5 { counter: 1 }, true));
    /// ```
    pub fn should_propagate(&mut self, token: ChangeToken, force: bool) -> bool {
        let changed = match self.previous {
            Some(previous) => differs(&previous, &token),
            None => true,
        };
        self.previous = Some(token);
        changed || force
    }

    /// Forget the previous snapshot.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

fn differs(previous: &ChangeToken, current: &ChangeToken) -> bool {
    match (previous, current) {
        (
            ChangeToken::Ds4 { axes: a, buttons: ab },
            ChangeToken::Ds4 { axes: b, buttons: bb },
        ) => {
            let axes_moved = a
                .iter()
                .zip(b.iter())
                .any(|(x, y)| x.abs_diff(*y) > AXIS_NOISE_TOLERANCE);
            axes_moved || ab != bb
        }
        (ChangeToken::Ds5 { counter: a }, ChangeToken::Ds5 { counter: b }) => a != b,
        _ => true,
    }
}
