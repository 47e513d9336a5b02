//! # Button/Axis Mapper
//!
//! Maps a [`DecodedReport`] to the canonical gamepad state consumed by the
//! downstream emulated gamepad.
//!
//! ## Profile Assignments
//!
//! | Input | ProfileA | ProfileB |
//! |-------|----------|----------|
//! | R1 | Right trigger 255 | R1 |
//! | L1 | L1 | Turbo ✕ (L1 suppressed) |
//! | R2 (click or axis > 10) | Left trigger 255 | Analog right trigger |
//! | L2 (click or axis > 10) | R1 | Analog left trigger |
//! | Share | S1 | L1 (unless Options held) |
//! | Options | S2 | S2 |
//! | PS | Mute pulse (○ + □) | A1 |
//! | Right stick Y | Direct | Anti-recoil bias |
//!
//! Face buttons, stick clicks, touchpad (A2) and the d-pad map the same in
//! both profiles. The state is rebuilt from scratch on every update.

use serde::Serialize;

use super::macros::{anti_recoil, MacroOutput};
use super::profile::Profile;
use super::report::{DecodedReport, Hat};
use crate::config::MacroConfig;

/// Canonical joystick range.
pub const JOYSTICK_MIN: u16 = 0;
/// Canonical joystick range.
pub const JOYSTICK_MAX: u16 = 0xffff;
/// Canonical joystick center.
pub const JOYSTICK_MID: u16 = 0x7fff;

/// Trigger value for a digitally forced trigger.
pub const TRIGGER_FULL: u8 = 255;

/// Raw trigger axis above which ProfileA treats the trigger as pressed.
pub const TRIGGER_PRESS_THRESHOLD: u8 = 10;

/// Canonical button bits.
pub mod buttons {
    /// ✕
    pub const B1: u32 = 1 << 0;
    /// ○
    pub const B2: u32 = 1 << 1;
    /// □
    pub const B3: u32 = 1 << 2;
    /// △
    pub const B4: u32 = 1 << 3;
    pub const L1: u32 = 1 << 4;
    pub const R1: u32 = 1 << 5;
    pub const L2: u32 = 1 << 6;
    pub const R2: u32 = 1 << 7;
    /// Select
    pub const S1: u32 = 1 << 8;
    /// Start
    pub const S2: u32 = 1 << 9;
    pub const L3: u32 = 1 << 10;
    pub const R3: u32 = 1 << 11;
    /// Home
    pub const A1: u32 = 1 << 12;
    /// Touchpad
    pub const A2: u32 = 1 << 13;
}

/// Canonical d-pad bits.
pub mod dpad {
    pub const UP: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const LEFT: u8 = 1 << 2;
    pub const RIGHT: u8 = 1 << 3;
}

/// State handed to the downstream emulated gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanonicalGamepadState {
    pub lx: u16,
    pub ly: u16,
    pub rx: u16,
    pub ry: u16,
    pub lt: u8,
    pub rt: u8,
    pub buttons: u32,
    pub dpad: u8,
    /// Sticks and triggers carry analog data
    pub analog: bool,
}

impl Default for CanonicalGamepadState {
    /// Sticks centered, nothing pressed, no analog data yet.
    fn default() -> Self {
        Self {
            lx: JOYSTICK_MID,
            ly: JOYSTICK_MID,
            rx: JOYSTICK_MID,
            ry: JOYSTICK_MID,
            lt: 0,
            rt: 0,
            buttons: 0,
            dpad: 0,
            analog: false,
        }
    }
}

impl CanonicalGamepadState {
    #[must_use]
    pub fn pressed(&self, mask: u32) -> bool {
        self.buttons & mask == mask
    }
}

impl Hat {
    /// Independent direction bits; diagonals set both neighbours.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualpad_host::controller::mapper::dpad;
    /// use dualpad_host::controller::report::Hat;
    ///
    /// assert_eq!(Hat::UpLeft.dpad_mask(), dpad::UP | dpad::LEFT);
    /// assert_eq!(Hat::Centered.dpad_mask(), 0);
    /// ```
    #[must_use]
    pub fn dpad_mask(self) -> u8 {
        match self {
            Hat::Up => dpad::UP,
            Hat::UpRight => dpad::UP | dpad::RIGHT,
            Hat::Right => dpad::RIGHT,
            Hat::DownRight => dpad::DOWN | dpad::RIGHT,
            Hat::Down => dpad::DOWN,
            Hat::DownLeft => dpad::DOWN | dpad::LEFT,
            Hat::Left => dpad::LEFT,
            Hat::UpLeft => dpad::UP | dpad::LEFT,
            Hat::Centered => 0,
        }
    }
}

/// Applies the active profile's remap table.
#[derive(Debug, Clone)]
pub struct GamepadMapper {
    anti_recoil_threshold: u8,
    anti_recoil_strength: u16,
}

impl GamepadMapper {
    #[must_use]
    pub fn new(config: &MacroConfig) -> Self {
        Self {
            anti_recoil_threshold: config.anti_recoil_trigger_threshold,
            anti_recoil_strength: config.anti_recoil_strength,
        }
    }

    /// Build the canonical state for one propagated report.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualpad_host::config::MacroConfig;
    /// use dualpad_host::controller::macros::MacroOutput;
    /// use dualpad_host::controller::mapper::{buttons, GamepadMapper};
    /// use dualpad_host::controller::profile::Profile;
    /// use dualpad_host::controller::report::DecodedReport;
    ///
    /// let mapper = GamepadMapper::new(&MacroConfig::default());
    /// let mut report = DecodedReport::default();
    /// report.buttons.r1 = true;
    ///
    /// let state = mapper.map(&report, Profile::ProfileA, MacroOutput::default());
    /// assert_eq!(state.rt, 255);
    ///
    /// let state = mapper.map(&report, Profile::ProfileB, MacroOutput::default());
    /// assert!(state.pressed(buttons::R1));
    /// ```
    #[must_use]
    pub fn map(&self, report: &DecodedReport, profile: Profile, macros: MacroOutput) -> CanonicalGamepadState {
        let b = &report.buttons;
        let mut state = CanonicalGamepadState {
            lx: scale_axis(report.left_stick_x),
            ly: scale_axis(report.left_stick_y),
            rx: scale_axis(report.right_stick_x),
            ry: scale_axis(report.right_stick_y),
            lt: 0,
            rt: 0,
            buttons: 0,
            dpad: report.hat.dpad_mask(),
            analog: true,
        };

        match profile {
            Profile::ProfileA => {
                if b.r1 {
                    state.rt = TRIGGER_FULL;
                }
                if b.l1 {
                    state.buttons |= buttons::L1;
                }
                if b.r2 || report.right_trigger > TRIGGER_PRESS_THRESHOLD {
                    state.lt = TRIGGER_FULL;
                }
                if b.l2 || report.left_trigger > TRIGGER_PRESS_THRESHOLD {
                    state.buttons |= buttons::R1;
                }
                if b.select {
                    state.buttons |= buttons::S1;
                }
                if b.start {
                    state.buttons |= buttons::S2;
                }
            }
            Profile::ProfileB => {
                if macros.turbo {
                    state.buttons |= buttons::B1;
                }
                if b.select && !b.start {
                    state.buttons |= buttons::L1;
                }
                if b.r1 {
                    state.buttons |= buttons::R1;
                }
                if b.start {
                    state.buttons |= buttons::S2;
                }
                if b.home {
                    state.buttons |= buttons::A1;
                }
                state.lt = report.left_trigger;
                state.rt = report.right_trigger;
                state.ry = anti_recoil(
                    state.ry,
                    report.left_trigger,
                    report.right_trigger,
                    self.anti_recoil_threshold,
                    self.anti_recoil_strength,
                );
            }
        }

        // Profile-independent buttons
        let common = [
            (b.l3, buttons::L3),
            (b.r3, buttons::R3),
            (b.touchpad, buttons::A2),
            (b.north, buttons::B4),
            (b.east, buttons::B2),
            (b.south, buttons::B1),
            (b.west, buttons::B3),
        ];
        for (pressed, mask) in common {
            if pressed {
                state.buttons |= mask;
            }
        }

        // A pulse started in ProfileA runs out even after a switch
        if macros.mute {
            state.buttons |= buttons::B3 | buttons::B2;
        }

        state
    }
}

/// Rescales a raw 0-255 axis to the canonical joystick range.
#[inline]
#[must_use]
pub fn scale_axis(value: u8) -> u16 {
    (u32::from(value) * u32::from(JOYSTICK_MAX - JOYSTICK_MIN) / 255) as u16 + JOYSTICK_MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> GamepadMapper {
        GamepadMapper::new(&MacroConfig::default())
    }

    fn map(report: &DecodedReport, profile: Profile) -> CanonicalGamepadState {
        mapper().map(report, profile, MacroOutput::default())
    }

    // ==================== Scaling Tests ====================

    #[test]
    fn test_scale_axis_endpoints() {
        assert_eq!(scale_axis(0), JOYSTICK_MIN);
        assert_eq!(scale_axis(255), JOYSTICK_MAX);
        assert_eq!(scale_axis(128), 128 * 257);
    }

    #[test]
    fn test_scale_axis_monotonic() {
        for v in 0..255u8 {
            assert!(scale_axis(v) < scale_axis(v + 1));
        }
    }

    #[test]
    fn test_sticks_mapped_in_both_profiles() {
        let mut r = DecodedReport::default();
        r.left_stick_x = 0;
        r.left_stick_y = 255;
        r.right_stick_x = 64;
        r.right_stick_y = 192;

        for profile in [Profile::ProfileA, Profile::ProfileB] {
            let s = map(&r, profile);
            assert_eq!(s.lx, 0);
            assert_eq!(s.ly, 65535);
            assert_eq!(s.rx, scale_axis(64));
            assert_eq!(s.ry, scale_axis(192));
            assert!(s.analog);
        }
    }

    // ==================== D-Pad Tests ====================

    #[test]
    fn test_dpad_masks() {
        let cases = [
            (Hat::Centered, 0),
            (Hat::Up, dpad::UP),
            (Hat::Right, dpad::RIGHT),
            (Hat::Down, dpad::DOWN),
            (Hat::Left, dpad::LEFT),
            (Hat::UpRight, dpad::UP | dpad::RIGHT),
            (Hat::DownRight, dpad::DOWN | dpad::RIGHT),
            (Hat::DownLeft, dpad::DOWN | dpad::LEFT),
            (Hat::UpLeft, dpad::UP | dpad::LEFT),
        ];
        for (hat, mask) in cases {
            assert_eq!(hat.dpad_mask(), mask, "{:?}", hat);
        }
    }

    #[test]
    fn test_diagonals_set_exactly_two_bits() {
        for hat in [Hat::UpRight, Hat::DownRight, Hat::DownLeft, Hat::UpLeft] {
            assert_eq!(hat.dpad_mask().count_ones(), 2);
        }
    }

    #[test]
    fn test_dpad_not_accumulated() {
        let mut r = DecodedReport::default();
        r.hat = Hat::Up;
        assert_eq!(map(&r, Profile::ProfileA).dpad, dpad::UP);
        r.hat = Hat::Centered;
        assert_eq!(map(&r, Profile::ProfileA).dpad, 0);
    }

    // ==================== Profile A Tests ====================

    #[test]
    fn test_profile_a_shoulders_and_triggers() {
        let mut r = DecodedReport::default();
        r.buttons.r1 = true;
        r.buttons.l1 = true;
        let s = map(&r, Profile::ProfileA);
        assert_eq!(s.rt, TRIGGER_FULL);
        assert!(s.pressed(buttons::L1));
        assert!(!s.pressed(buttons::R1));

        let mut r = DecodedReport::default();
        r.right_trigger = 11;
        r.left_trigger = 11;
        let s = map(&r, Profile::ProfileA);
        assert_eq!(s.lt, TRIGGER_FULL);
        assert!(s.pressed(buttons::R1));
        assert_eq!(s.rt, 0);
    }

    #[test]
    fn test_profile_a_trigger_threshold() {
        let mut r = DecodedReport::default();
        r.right_trigger = 10;
        r.left_trigger = 10;
        let s = map(&r, Profile::ProfileA);
        assert_eq!(s.lt, 0);
        assert_eq!(s.buttons, 0);
    }

    #[test]
    fn test_profile_a_digital_trigger_clicks() {
        let mut r = DecodedReport::default();
        r.buttons.r2 = true;
        r.buttons.l2 = true;
        let s = map(&r, Profile::ProfileA);
        assert_eq!(s.lt, TRIGGER_FULL);
        assert!(s.pressed(buttons::R1));
    }

    #[test]
    fn test_profile_a_system_buttons() {
        let mut r = DecodedReport::default();
        r.buttons.select = true;
        r.buttons.start = true;
        r.buttons.home = true;
        let s = map(&r, Profile::ProfileA);
        assert!(s.pressed(buttons::S1 | buttons::S2));
        assert!(!s.pressed(buttons::A1), "PS drives the mute macro in ProfileA");
    }

    #[test]
    fn test_profile_a_mute_injection() {
        let s = mapper().map(
            &DecodedReport::default(),
            Profile::ProfileA,
            MacroOutput { mute: true, turbo: false },
        );
        assert_eq!(s.buttons, buttons::B2 | buttons::B3);
    }

    // ==================== Profile B Tests ====================

    #[test]
    fn test_profile_b_l1_suppressed() {
        let mut r = DecodedReport::default();
        r.buttons.l1 = true;
        let s = map(&r, Profile::ProfileB);
        assert!(!s.pressed(buttons::L1));
    }

    #[test]
    fn test_profile_b_turbo_injection() {
        let mut r = DecodedReport::default();
        r.buttons.l1 = true;
        let s = mapper().map(&r, Profile::ProfileB, MacroOutput { mute: false, turbo: true });
        assert_eq!(s.buttons, buttons::B1);
    }

    #[test]
    fn test_profile_b_select_is_l1() {
        let mut r = DecodedReport::default();
        r.buttons.select = true;
        assert!(map(&r, Profile::ProfileB).pressed(buttons::L1));

        r.buttons.start = true;
        let s = map(&r, Profile::ProfileB);
        assert!(!s.pressed(buttons::L1));
        assert!(s.pressed(buttons::S2));
    }

    #[test]
    fn test_profile_b_standard_buttons() {
        let mut r = DecodedReport::default();
        r.buttons.r1 = true;
        r.buttons.home = true;
        let s = map(&r, Profile::ProfileB);
        assert!(s.pressed(buttons::R1 | buttons::A1));
        assert_eq!(s.rt, 0);
    }

    #[test]
    fn test_profile_b_analog_triggers() {
        let mut r = DecodedReport::default();
        r.left_trigger = 77;
        r.right_trigger = 140;
        let s = map(&r, Profile::ProfileB);
        assert_eq!(s.lt, 77);
        assert_eq!(s.rt, 140);
    }

    #[test]
    fn test_profile_b_anti_recoil() {
        let mut r = DecodedReport::default();
        r.right_stick_y = 128;
        r.left_trigger = 201;
        r.right_trigger = 255;
        let s = map(&r, Profile::ProfileB);
        assert_eq!(s.ry, scale_axis(128) + 4000);

        r.right_stick_y = 250;
        assert_eq!(map(&r, Profile::ProfileB).ry, JOYSTICK_MAX);

        r.right_stick_y = 128;
        r.left_trigger = 200;
        assert_eq!(map(&r, Profile::ProfileB).ry, scale_axis(128));
    }

    #[test]
    fn test_profile_a_no_anti_recoil() {
        let mut r = DecodedReport::default();
        r.left_trigger = 255;
        r.right_trigger = 255;
        assert_eq!(map(&r, Profile::ProfileA).ry, scale_axis(128));
    }

    #[test]
    fn test_mute_carried_into_profile_b() {
        let s = mapper().map(
            &DecodedReport::default(),
            Profile::ProfileB,
            MacroOutput { mute: true, turbo: false },
        );
        assert!(s.pressed(buttons::B2 | buttons::B3));
    }

    // ==================== Common Tests ====================

    #[test]
    fn test_common_buttons_both_profiles() {
        let mut r = DecodedReport::default();
        r.buttons.south = true;
        r.buttons.east = true;
        r.buttons.west = true;
        r.buttons.north = true;
        r.buttons.l3 = true;
        r.buttons.r3 = true;
        r.buttons.touchpad = true;

        let expected = buttons::B1
            | buttons::B2
            | buttons::B3
            | buttons::B4
            | buttons::L3
            | buttons::R3
            | buttons::A2;
        assert_eq!(map(&r, Profile::ProfileA).buttons, expected);
        assert_eq!(map(&r, Profile::ProfileB).buttons, expected);
    }

    #[test]
    fn test_released_buttons_clear() {
        let mut r = DecodedReport::default();
        r.buttons.south = true;
        assert_eq!(map(&r, Profile::ProfileA).buttons, buttons::B1);
        r.buttons.south = false;
        assert_eq!(map(&r, Profile::ProfileA).buttons, 0);
    }

    #[test]
    fn test_default_state() {
        let s = CanonicalGamepadState::default();
        assert_eq!(s.lx, JOYSTICK_MID);
        assert_eq!(s.buttons, 0);
        assert!(!s.analog);
    }
}
