//! # HID Host Adapter
//!
//! Host side of the listener, built on `hidapi`: finds a supported controller
//! connected over USB, reads its report descriptor and provides a reader for
//! input reports plus a [`ReportTransport`] for output reports.
//!
//! ## Selection
//!
//! | Check | Source |
//! |-------|--------|
//! | Vendor is Sony, product id maps to a family | `DeviceInfo::vendor_id`/`product_id` |
//! | Bus is USB | `DeviceInfo::bus_type` |
//! | Lowest path wins when several match | `DeviceInfo::path` |
//!
//! Bluetooth controllers are skipped: they send input report 0x11 and take
//! output report 0x31, neither of which the decoder or encoder speaks.

use hidapi::{BusType, HidApi, HidDevice};
use std::ffi::CString;
use std::io;
use tracing::{debug, info, warn};

use crate::controller::family::SONY_VENDOR_ID;
use crate::controller::ControllerFamily;
use crate::error::{DualpadError, Result};
use crate::listener::DeviceInfo;
use crate::transport::ReportTransport;

/// Largest input report either family sends over USB
pub const MAX_REPORT_SIZE: usize = 64;

/// Largest report descriptor the HID class allows
pub const MAX_DESCRIPTOR_SIZE: usize = 4096;

/// One enumerated HID device, reduced to what selection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerCandidate {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Connected over USB (as opposed to Bluetooth, I2C, ...)
    pub usb: bool,
    /// USB interface number, -1 when the backend does not know it
    pub interface: i32,
}

impl ControllerCandidate {
    fn from_device_info(info: &hidapi::DeviceInfo) -> Self {
        Self {
            path: info.path().to_string_lossy().into_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            usb: matches!(info.bus_type(), BusType::Usb),
            interface: info.interface_number(),
        }
    }

    /// Family of this device; anything not made by Sony is unsupported.
    #[must_use]
    pub fn family(&self) -> ControllerFamily {
        if self.vendor_id != SONY_VENDOR_ID {
            return ControllerFamily::Unsupported;
        }
        ControllerFamily::from_product_id(self.product_id)
    }

    /// Node number of a `/dev/hidrawN` path, 0 for other path formats.
    #[must_use]
    pub fn node_number(&self) -> u8 {
        self.path
            .rsplit_once("hidraw")
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            address: self.node_number(),
            instance: u8::try_from(self.interface).unwrap_or(0),
            vendor_id: self.vendor_id,
            product_id: self.product_id,
        }
    }
}

/// Pick the controller to drive from an enumeration.
///
/// Supported Sony controllers on a bus other than USB are skipped with a
/// debug message. Among the remaining ones the lowest path wins, so the
/// pick does not depend on enumeration order.
///
/// # Errors
///
/// `DeviceNotFound` listing the skipped controllers, if any.
///
/// # Examples
///
/// ```
/// use dualpad_host::hid::{select_controller, ControllerCandidate};
///
/// let candidates = vec![ControllerCandidate {
///     path: "/dev/hidraw2".to_string(),
///     vendor_id: 0x054c,
///     product_id: 0x0ce6,
///     usb: true,
///     interface: 3,
/// }];
/// assert_eq!(select_controller(&candidates).unwrap().path, "/dev/hidraw2");
/// ```
pub fn select_controller(candidates: &[ControllerCandidate]) -> Result<&ControllerCandidate> {
    let mut skipped = Vec::new();
    let mut selected: Option<&ControllerCandidate> = None;

    for candidate in candidates.iter().filter(|c| c.family().is_supported()) {
        if !candidate.usb {
            debug!(
                "Skipping {} ({:04x}:{:04x}): not connected over USB",
                candidate.path, candidate.vendor_id, candidate.product_id
            );
            skipped.push(format!("{} (not USB)", candidate.path));
            continue;
        }
        if selected.map_or(true, |s| candidate.path < s.path) {
            selected = Some(candidate);
        }
    }

    selected.ok_or_else(|| {
        DualpadError::DeviceNotFound(if skipped.is_empty() {
            "no DualShock 4 or DualSense enumerated".to_string()
        } else {
            skipped.join(", ")
        })
    })
}

/// An opened controller: a reader handle, a writer handle and the
/// identity handed to the attach hook.
pub struct HidController {
    reader: HidDevice,
    writer: HidDevice,
    path: String,
    info: DeviceInfo,
    descriptor: Vec<u8>,
}

impl std::fmt::Debug for HidController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidController")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("descriptor_len", &self.descriptor.len())
            .finish_non_exhaustive()
    }
}

impl HidController {
    /// Open `path`, or enumerate for a supported USB controller when `path`
    /// is empty.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: nothing suitable enumerated, or `path` is not a
    ///   USB device
    /// - `Hid`: the HID library or the device could not be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dualpad_host::hid::HidController;
    ///
    /// let controller = HidController::open("")?;
    /// println!("Using {}", controller.path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        let api = HidApi::new()?;
        if !path.is_empty() {
            return Self::open_path(&api, path);
        }

        let candidates: Vec<ControllerCandidate> = api
            .device_list()
            .map(ControllerCandidate::from_device_info)
            .collect();
        debug!("Enumerated {} HID devices", candidates.len());

        let selected = select_controller(&candidates)?;
        Self::open_path(&api, &selected.path)
    }

    fn open_path(api: &HidApi, path: &str) -> Result<Self> {
        let c_path = CString::new(path).map_err(|_| DualpadError::DeviceNotFound(path.to_string()))?;
        let reader = api.open_path(&c_path)?;

        let candidate = ControllerCandidate::from_device_info(&reader.get_device_info()?);
        if !candidate.usb {
            return Err(DualpadError::DeviceNotFound(format!("{} (not USB)", path)));
        }

        let writer = api.open_path(&c_path)?;

        let mut descriptor = vec![0u8; MAX_DESCRIPTOR_SIZE];
        match reader.get_report_descriptor(&mut descriptor) {
            Ok(len) => descriptor.truncate(len),
            Err(e) => {
                warn!("No report descriptor for {}: {}", path, e);
                descriptor.clear();
            }
        }

        info!(
            "Opened {} at {} ({:04x}:{:04x}, interface {})",
            candidate.family().name(),
            path,
            candidate.vendor_id,
            candidate.product_id,
            candidate.interface
        );

        Ok(Self {
            reader,
            writer,
            path: path.to_string(),
            info: candidate.device_info(),
            descriptor,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn info(&self) -> DeviceInfo {
        self.info
    }

    #[must_use]
    pub fn descriptor(&self) -> &[u8] {
        &self.descriptor
    }

    /// Split into the input side (moved to a reader thread) and the output
    /// side (kept by the listener).
    #[must_use]
    pub fn into_split(self) -> (HidReader, HidWriter) {
        (
            HidReader {
                device: self.reader,
                path: self.path,
            },
            HidWriter { device: self.writer },
        )
    }
}

/// Input side of an opened controller.
pub struct HidReader {
    device: HidDevice,
    path: String,
}

impl HidReader {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read one input report into `buf`. Blocks until a report arrives.
    pub fn read_report(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.device.read(buf)?)
    }
}

/// Output report sink on an opened controller.
pub struct HidWriter {
    device: HidDevice,
}

impl ReportTransport for HidWriter {
    fn send_output_report(&mut self, report: &[u8]) -> io::Result<()> {
        let written = self
            .device
            .write(report)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        if written != report.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, report.len()),
            ));
        }
        Ok(())
    }
}
