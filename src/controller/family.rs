//! # Controller Family
//!
//! Resolves a USB product id to the controller family once at attach time.
//!
//! ## Supported Devices
//!
//! | Family | Product IDs | Input report | Output report |
//! |--------|-------------|--------------|---------------|
//! | DS4-class | 0x05C4, 0x09CC, 0x0BA0, 0x00EE, 0xB67B | 0x01 | 0x05 |
//! | DS5-class | 0x0CE6, 0x0DF2 | 0x01 | 0x02 (USB) |
//!
//! Everything else is [`ControllerFamily::Unsupported`]: its reports pass
//! through undecoded and the indicator path is skipped. The licensed pads
//! (0x00EE, 0xB67B) are treated the same way until their report descriptor
//! declares the DS4 definition report 0x03.

use serde::Serialize;

/// Sony vendor ID
pub const SONY_VENDOR_ID: u16 = 0x054c;

/// DualShock 4 (first revision)
pub const DS4_V1_PRODUCT_ID: u16 = 0x05c4;
/// DualShock 4 (second revision)
pub const DS4_V2_PRODUCT_ID: u16 = 0x09cc;
/// Sony wireless adapter presenting a DualShock 4
pub const DS4_DONGLE_PRODUCT_ID: u16 = 0x0ba0;
/// Licensed DS4-compatible pads that speak the same report layout
pub const DS4_COMPAT_PRODUCT_IDS: &[u16] = &[0x00ee, 0xb67b];

/// DualSense
pub const DUALSENSE_PRODUCT_ID: u16 = 0x0ce6;
/// DualSense Edge
pub const DUALSENSE_EDGE_PRODUCT_ID: u16 = 0x0df2;

/// The only input report id this module decodes (both families, USB)
pub const INPUT_REPORT_ID: u8 = 0x01;

/// DS4 controller definition feature report. Licensed pads must declare it
/// in their report descriptor before they are decoded.
pub const DS4_DEFINITION_REPORT_ID: u8 = 0x03;

/// Returns true for licensed DS4-compatible pads, which are only decoded
/// once their report descriptor identifies them as DS4-class.
#[must_use]
pub fn needs_identification(product_id: u16) -> bool {
    DS4_COMPAT_PRODUCT_IDS.contains(&product_id)
}

/// Controller family, carrying the decode and encode strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerFamily {
    /// DualShock 4 generation
    Ds4,
    /// DualSense generation
    Ds5,
    /// Not a PlayStation controller we drive
    Unsupported,
}

impl ControllerFamily {
    /// Resolve the family from a USB product id.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualpad_host::controller::family::ControllerFamily;
    ///
    /// assert_eq!(ControllerFamily::from_product_id(0x0ce6), ControllerFamily::Ds5);
    /// assert_eq!(ControllerFamily::from_product_id(0x1234), ControllerFamily::Unsupported);
    /// ```
    #[must_use]
    pub fn from_product_id(product_id: u16) -> Self {
        match product_id {
            DS4_V1_PRODUCT_ID | DS4_V2_PRODUCT_ID | DS4_DONGLE_PRODUCT_ID => Self::Ds4,
            DUALSENSE_PRODUCT_ID | DUALSENSE_EDGE_PRODUCT_ID => Self::Ds5,
            id if DS4_COMPAT_PRODUCT_IDS.contains(&id) => Self::Ds4,
            _ => Self::Unsupported,
        }
    }

    /// Returns true when reports from this family are decoded.
    #[must_use]
    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }

    /// Minimum input report length holding every field the decoder reads.
    #[must_use]
    pub fn min_input_len(self) -> usize {
        match self {
            Self::Ds4 => 10,
            Self::Ds5 => 11,
            Self::Unsupported => usize::MAX,
        }
    }

    /// Human-readable family name for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ds4 => "DualShock 4",
            Self::Ds5 => "DualSense",
            Self::Unsupported => "unsupported",
        }
    }
}
