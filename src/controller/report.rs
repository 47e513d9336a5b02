//! # Input Report Decoder
//!
//! Turns a raw USB input report into a typed [`DecodedReport`] by fixed-offset
//! extraction. Both families share report id `0x01`; anything else on the
//! endpoint (feature replies, Bluetooth framing, vendor reports) is dropped
//! silently by returning `None`.
//!
//! ## DS4-class layout
//!
//! | Byte | Contents |
//! |------|----------|
//! | 0 | Report ID (0x01) |
//! | 1-4 | LX, LY, RX, RY |
//! | 5 | Hat (bits 0-3), □ ✕ ○ △ (bits 4-7) |
//! | 6 | L1 R1 L2 R2 Share Options L3 R3 |
//! | 7 | PS, Touchpad, frame counter (bits 2-7) |
//! | 8-9 | L2, R2 axis |
//!
//! ## DS5-class layout
//!
//! | Byte | Contents |
//! |------|----------|
//! | 0 | Report ID (0x01) |
//! | 1-4 | LX, LY, RX, RY |
//! | 5-6 | L2, R2 axis |
//! | 7 | Sequence counter |
//! | 8 | Hat (bits 0-3), □ ✕ ○ △ (bits 4-7) |
//! | 9 | L1 R1 L2 R2 Create Options L3 R3 |
//! | 10 | PS, Touchpad, Mute |

use super::family::{ControllerFamily, INPUT_REPORT_ID};

/// Raw axis center value.
pub const AXIS_CENTER: u8 = 128;

/// Bits of the DS4 byte 7 holding the free-running frame counter.
const DS4_COUNTER_MASK: u8 = 0xfc;

/// A raw input report as delivered by the host stack.
#[derive(Debug, Clone, Copy)]
pub struct RawReport<'a> {
    /// Family resolved at attach time
    pub family: ControllerFamily,
    /// Full report bytes, report id first
    pub bytes: &'a [u8],
}

impl<'a> RawReport<'a> {
    /// Wrap `bytes` as received from the host, tagged with the attached family.
    pub fn new(family: ControllerFamily, bytes: &'a [u8]) -> Self {
        Self { family, bytes }
    }

    /// Report identifier byte, if any.
    #[must_use]
    pub fn report_id(&self) -> Option<u8> {
        self.bytes.first().copied()
    }
}

/// Directional pad hat switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hat {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Centered,
}

impl Hat {
    /// Decodes the low nibble of a hat byte. Undefined values are centered.
    #[must_use]
    pub fn from_nibble(value: u8) -> Self {
        match value & 0x0f {
            0 => Self::Up,
            1 => Self::UpRight,
            2 => Self::Right,
            3 => Self::DownRight,
            4 => Self::Down,
            5 => Self::DownLeft,
            6 => Self::Left,
            7 => Self::UpLeft,
            _ => Self::Centered,
        }
    }
}

/// Digital button states of a decoded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    /// Cross (✕)
    pub south: bool,
    /// Circle (○)
    pub east: bool,
    /// Square (□)
    pub west: bool,
    /// Triangle (△)
    pub north: bool,

    /// Left shoulder
    pub l1: bool,
    /// Right shoulder
    pub r1: bool,
    /// L2 digital click
    pub l2: bool,
    /// R2 digital click
    pub r2: bool,

    /// Left stick click
    pub l3: bool,
    /// Right stick click
    pub r3: bool,

    /// Share / Create
    pub select: bool,
    /// Options
    pub start: bool,
    /// PS button
    pub home: bool,
    /// Touchpad click
    pub touchpad: bool,
}

impl Buttons {
    /// Face buttons from the high nibble of the hat byte.
    fn with_face_bits(mut self, byte: u8) -> Self {
        self.west = byte & 0x10 != 0;
        self.south = byte & 0x20 != 0;
        self.east = byte & 0x40 != 0;
        self.north = byte & 0x80 != 0;
        self
    }

    /// Shoulders, triggers, system buttons and stick clicks.
    fn with_shoulder_bits(mut self, byte: u8) -> Self {
        self.l1 = byte & 0x01 != 0;
        self.r1 = byte & 0x02 != 0;
        self.l2 = byte & 0x04 != 0;
        self.r2 = byte & 0x08 != 0;
        self.select = byte & 0x10 != 0;
        self.start = byte & 0x20 != 0;
        self.l3 = byte & 0x40 != 0;
        self.r3 = byte & 0x80 != 0;
        self
    }

    fn with_system_bits(mut self, byte: u8) -> Self {
        self.home = byte & 0x01 != 0;
        self.touchpad = byte & 0x02 != 0;
        self
    }
}

/// Change-detection data carried alongside a decoded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeToken {
    /// DS4-class: analog bytes (LX LY RX RY L2 R2) and button bytes with the
    /// frame counter masked out.
    Ds4 { axes: [u8; 6], buttons: [u8; 3] },
    /// DS5-class: the embedded sequence counter.
    Ds5 { counter: u8 },
}

/// A typed, family-independent view of one input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedReport {
    pub left_stick_x: u8,
    pub left_stick_y: u8,
    pub right_stick_x: u8,
    pub right_stick_y: u8,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub buttons: Buttons,
    pub hat: Hat,
    pub token: ChangeToken,
}

impl Default for DecodedReport {
    /// Sticks centered, triggers and buttons released.
    fn default() -> Self {
        Self {
            left_stick_x: AXIS_CENTER,
            left_stick_y: AXIS_CENTER,
            right_stick_x: AXIS_CENTER,
            right_stick_y: AXIS_CENTER,
            left_trigger: 0,
            right_trigger: 0,
            buttons: Buttons::default(),
            hat: Hat::Centered,
            token: ChangeToken::Ds5 { counter: 0 },
        }
    }
}

/// Decode a raw input report.
///
/// Returns `None` for unsupported families, foreign report ids and reports
/// too short to hold every field.
///
/// # Examples
///
/// ```
/// use dualpad_host::controller::family::ControllerFamily;
/// use dualpad_host::controller::report::{decode, Hat, RawReport};
///
/// let mut bytes = [0u8; 64];
/// bytes[0] = 0x01;
/// bytes[1] = 200; // LX
/// bytes[5] = 0x08 | 0x20; // hat centered, cross held
///
/// let report = decode(&RawReport::new(ControllerFamily::Ds4, &bytes)).unwrap();
/// assert_eq!(report.left_stick_x, 200);
/// assert_eq!(report.hat, Hat::Centered);
/// assert!(report.buttons.south);
///
/// bytes[0] = 0x11;
/// assert!(decode(&RawReport::new(ControllerFamily::Ds4, &bytes)).is_none());
/// ```
#[must_use]
pub fn decode(raw: &RawReport<'_>) -> Option<DecodedReport> {
    if raw.report_id() != Some(INPUT_REPORT_ID) || raw.bytes.len() < raw.family.min_input_len() {
        return None;
    }

    match raw.family {
        ControllerFamily::Ds4 => Some(decode_ds4(raw.bytes)),
        ControllerFamily::Ds5 => Some(decode_ds5(raw.bytes)),
        ControllerFamily::Unsupported => None,
    }
}

fn decode_ds4(b: &[u8]) -> DecodedReport {
    let buttons = Buttons::default()
        .with_face_bits(b[5])
        .with_shoulder_bits(b[6])
        .with_system_bits(b[7]);

    DecodedReport {
        left_stick_x: b[1],
        left_stick_y: b[2],
        right_stick_x: b[3],
        right_stick_y: b[4],
        left_trigger: b[8],
        right_trigger: b[9],
        buttons,
        hat: Hat::from_nibble(b[5]),
        token: ChangeToken::Ds4 {
            axes: [b[1], b[2], b[3], b[4], b[8], b[9]],
            buttons: [b[5], b[6], b[7] & !DS4_COUNTER_MASK],
        },
    }
}

fn decode_ds5(b: &[u8]) -> DecodedReport {
    let buttons = Buttons::default()
        .with_face_bits(b[8])
        .with_shoulder_bits(b[9])
        .with_system_bits(b[10]);

    DecodedReport {
        left_stick_x: b[1],
        left_stick_y: b[2],
        right_stick_x: b[3],
        right_stick_y: b[4],
        left_trigger: b[5],
        right_trigger: b[6],
        buttons,
        hat: Hat::from_nibble(b[8]),
        token: ChangeToken::Ds5 { counter: b[7] },
    }
}

#[cfg(test)]
pub(crate) mod test_reports {
    //! Report builders shared by the controller and listener tests.

    /// A neutral DS4 input report (64 bytes).
    pub fn ds4() -> [u8; 64] {
        let mut b = [0u8; 64];
        b[0] = 0x01;
        b[1..=4].copy_from_slice(&[128; 4]);
        b[5] = 0x08;
        b
    }

    /// A neutral DS5 input report (64 bytes).
    pub fn ds5() -> [u8; 64] {
        let mut b = [0u8; 64];
        b[0] = 0x01;
        b[1..=4].copy_from_slice(&[128; 4]);
        b[8] = 0x08;
        b
    }
}
