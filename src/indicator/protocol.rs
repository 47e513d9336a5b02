//! # Indicator Output Reports
//!
//! Byte-exact output reports that set the lightbar colour and the player
//! lights.
//!
//! ## DS4-class (report 0x05, 32 bytes)
//!
//! | Byte | Contents |
//! |------|----------|
//! | 0 | Report ID (0x05) |
//! | 1 | Valid flags: 0x01 rumble, 0x02 LED, 0x04 blink |
//! | 4 | Rumble right (weak) |
//! | 5 | Rumble left (strong) |
//! | 6-8 | Red, green, blue |
//! | 9 | Blink on time |
//! | 10 | Blink off time |
//!
//! ## DS5-class (report 0x02, USB, 63 bytes)
//!
//! | Byte | Contents |
//! |------|----------|
//! | 0 | Report ID (0x02) |
//! | 1 | Valid flag 0 (motors, left clear) |
//! | 2 | Valid flag 1: 0x04 lightbar, 0x10 player LEDs |
//! | 3-4 | Motor right, left |
//! | 39 | Valid flag 2: 0x02 lightbar setup |
//! | 42 | Lightbar setup: 0x01 on |
//! | 43 | Player LED brightness |
//! | 44 | Player LED pattern |
//! | 45-47 | Red, green, blue |

use serde::Deserialize;

use crate::controller::{ControllerFamily, Profile};

/// DS4 output report id
pub const DS4_OUTPUT_REPORT_ID: u8 = 0x05;
/// DS4 output report size including the id
pub const DS4_OUTPUT_REPORT_SIZE: usize = 32;

pub const DS4_FLAG_RUMBLE: u8 = 0x01;
pub const DS4_FLAG_LED: u8 = 0x02;
pub const DS4_FLAG_BLINK: u8 = 0x04;

pub const DS4_OFFSET_FLAGS: usize = 1;
pub const DS4_OFFSET_RUMBLE_RIGHT: usize = 4;
pub const DS4_OFFSET_RUMBLE_LEFT: usize = 5;
pub const DS4_OFFSET_RGB: usize = 6;
pub const DS4_OFFSET_BLINK_ON: usize = 9;
pub const DS4_OFFSET_BLINK_OFF: usize = 10;

/// DS5 USB output report id
pub const DS5_OUTPUT_REPORT_ID: u8 = 0x02;
/// DS5 USB output report size including the id
pub const DS5_OUTPUT_REPORT_SIZE: usize = 63;

pub const DS5_FLAG1_LIGHTBAR: u8 = 0x04;
pub const DS5_FLAG1_PLAYER_LEDS: u8 = 0x10;
pub const DS5_FLAG2_LIGHTBAR_SETUP: u8 = 0x02;
pub const DS5_LIGHTBAR_SETUP_ON: u8 = 0x01;

pub const DS5_OFFSET_VALID_FLAG0: usize = 1;
pub const DS5_OFFSET_VALID_FLAG1: usize = 2;
pub const DS5_OFFSET_MOTOR_RIGHT: usize = 3;
pub const DS5_OFFSET_MOTOR_LEFT: usize = 4;
pub const DS5_OFFSET_VALID_FLAG2: usize = 39;
pub const DS5_OFFSET_LIGHTBAR_SETUP: usize = 42;
pub const DS5_OFFSET_BRIGHTNESS: usize = 43;
pub const DS5_OFFSET_PLAYER_LEDS: usize = 44;
pub const DS5_OFFSET_RGB: usize = 45;

/// Centre player LED
pub const PLAYER_LIGHTS_PROFILE_A: u8 = 0x04;
/// Two inner player LEDs
pub const PLAYER_LIGHTS_PROFILE_B: u8 = 0x0a;

/// An RGB lightbar colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb::new(0x00, 0x00, 0xff);
    pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// DualSense player LED brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brightness {
    #[default]
    Bright,
    Mid,
    Dim,
}

impl Brightness {
    /// Wire value (0 brightest).
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Bright => 0,
            Self::Mid => 1,
            Self::Dim => 2,
        }
    }
}

/// Everything the indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSettings {
    pub color: Rgb,
    pub brightness: Brightness,
    pub player_lights: u8,
}

impl IndicatorSettings {
    /// Indicator look for a profile. Pure function of the profile.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualpad_host::controller::Profile;
    /// use dualpad_host::indicator::protocol::{Brightness, IndicatorSettings, Rgb};
    ///
    /// let settings = IndicatorSettings::for_profile(Profile::ProfileB, Brightness::Bright);
    /// assert_eq!(settings.color, Rgb::RED);
    /// ```
    #[must_use]
    pub fn for_profile(profile: Profile, brightness: Brightness) -> Self {
        let (color, player_lights) = match profile {
            Profile::ProfileA => (Rgb::BLUE, PLAYER_LIGHTS_PROFILE_A),
            Profile::ProfileB => (Rgb::RED, PLAYER_LIGHTS_PROFILE_B),
        };
        Self {
            color,
            brightness,
            player_lights,
        }
    }
}

/// Build the output report for a family.
///
/// Returns `None` for [`ControllerFamily::Unsupported`].
#[must_use]
pub fn encode_output_report(family: ControllerFamily, settings: &IndicatorSettings) -> Option<Vec<u8>> {
    match family {
        ControllerFamily::Ds4 => Some(encode_ds4(settings).to_vec()),
        ControllerFamily::Ds5 => Some(encode_ds5(settings).to_vec()),
        ControllerFamily::Unsupported => None,
    }
}

/// DS4 lightbar report. Rumble is zeroed, blink 0/0 keeps the colour solid.
///
/// The DS4 has no player lights; brightness is baked into the colour.
pub fn encode_ds4(settings: &IndicatorSettings) -> [u8; DS4_OUTPUT_REPORT_SIZE] {
    let mut report = [0u8; DS4_OUTPUT_REPORT_SIZE];
    report[0] = DS4_OUTPUT_REPORT_ID;
    report[DS4_OFFSET_FLAGS] = DS4_FLAG_LED | DS4_FLAG_BLINK;
    report[DS4_OFFSET_RUMBLE_RIGHT] = 0;
    report[DS4_OFFSET_RUMBLE_LEFT] = 0;
    report[DS4_OFFSET_RGB..DS4_OFFSET_RGB + 3].copy_from_slice(&settings.color.to_bytes());
    report[DS4_OFFSET_BLINK_ON] = 0;
    report[DS4_OFFSET_BLINK_OFF] = 0;
    report
}

/// DS5 lightbar and player LED report. Motor flags stay clear so rumble is
/// left untouched.
pub fn encode_ds5(settings: &IndicatorSettings) -> [u8; DS5_OUTPUT_REPORT_SIZE] {
    let mut report = [0u8; DS5_OUTPUT_REPORT_SIZE];
    report[0] = DS5_OUTPUT_REPORT_ID;
    report[DS5_OFFSET_VALID_FLAG0] = 0;
    report[DS5_OFFSET_VALID_FLAG1] = DS5_FLAG1_LIGHTBAR | DS5_FLAG1_PLAYER_LEDS;
    report[DS5_OFFSET_MOTOR_RIGHT] = 0;
    report[DS5_OFFSET_MOTOR_LEFT] = 0;
    report[DS5_OFFSET_VALID_FLAG2] = DS5_FLAG2_LIGHTBAR_SETUP;
    report[DS5_OFFSET_LIGHTBAR_SETUP] = DS5_LIGHTBAR_SETUP_ON;
    report[DS5_OFFSET_BRIGHTNESS] = settings.brightness.as_byte();
    report[DS5_OFFSET_PLAYER_LEDS] = settings.player_lights;
    report[DS5_OFFSET_RGB..DS5_OFFSET_RGB + 3].copy_from_slice(&settings.color.to_bytes());
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_a() -> IndicatorSettings {
        IndicatorSettings::for_profile(Profile::ProfileA, Brightness::Bright)
    }

    fn profile_b() -> IndicatorSettings {
        IndicatorSettings::for_profile(Profile::ProfileB, Brightness::Bright)
    }

    #[test]
    fn test_profile_colors() {
        assert_eq!(profile_a().color, Rgb::new(0, 0, 255));
        assert_eq!(profile_a().player_lights, 0x04);
        assert_eq!(profile_b().color, Rgb::new(255, 0, 0));
        assert_eq!(profile_b().player_lights, 0x0a);
    }

    #[test]
    fn test_brightness_bytes() {
        assert_eq!(Brightness::Bright.as_byte(), 0);
        assert_eq!(Brightness::Mid.as_byte(), 1);
        assert_eq!(Brightness::Dim.as_byte(), 2);
        assert_eq!(Brightness::default(), Brightness::Bright);
    }

    // ==================== DS4 Tests ====================

    #[test]
    fn test_ds4_report_layout() {
        let report = encode_ds4(&profile_a());

        let mut expected = [0u8; 32];
        expected[0] = 0x05;
        expected[1] = 0x06;
        expected[8] = 0xff;
        assert_eq!(report, expected);
    }

    #[test]
    fn test_ds4_report_profile_b() {
        let report = encode_ds4(&profile_b());
        assert_eq!(&report[6..=8], &[0xff, 0x00, 0x00]);
        assert_eq!(report[9], 0);
        assert_eq!(report[10], 0);
    }

    #[test]
    fn test_ds4_ignores_brightness() {
        let dim = IndicatorSettings::for_profile(Profile::ProfileA, Brightness::Dim);
        assert_eq!(encode_ds4(&dim), encode_ds4(&profile_a()));
    }

    // ==================== DS5 Tests ====================

    #[test]
    fn test_ds5_report_layout() {
        let report = encode_ds5(&profile_b());

        let mut expected = [0u8; 63];
        expected[0] = 0x02;
        expected[2] = 0x14;
        expected[39] = 0x02;
        expected[42] = 0x01;
        expected[43] = 0x00;
        expected[44] = 0x0a;
        expected[45] = 0xff;
        assert_eq!(report, expected);
    }

    #[test]
    fn test_ds5_brightness() {
        let mid = IndicatorSettings::for_profile(Profile::ProfileA, Brightness::Mid);
        let report = encode_ds5(&mid);
        assert_eq!(report[43], 1);
        assert_eq!(report[44], 0x04);
        assert_eq!(&report[45..=47], &[0x00, 0x00, 0xff]);
    }

    #[test]
    fn test_ds5_motors_untouched() {
        let report = encode_ds5(&profile_a());
        assert_eq!(report[1], 0);
        assert_eq!(report[3], 0);
        assert_eq!(report[4], 0);
    }

    #[test]
    fn test_encode_by_family() {
        let settings = profile_a();
        assert_eq!(
            encode_output_report(ControllerFamily::Ds4, &settings).map(|r| r.len()),
            Some(DS4_OUTPUT_REPORT_SIZE)
        );
        assert_eq!(
            encode_output_report(ControllerFamily::Ds5, &settings).map(|r| r.len()),
            Some(DS5_OUTPUT_REPORT_SIZE)
        );
        assert!(encode_output_report(ControllerFamily::Unsupported, &settings).is_none());
    }
}
