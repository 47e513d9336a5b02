//! Seam to the host HID stack for sending output reports

use std::io;

/// Sends output reports (lightbar, player LEDs) to the attached controller.
///
/// A send either queues the whole report or fails; there is no partial
/// write. Implementations must not block for longer than one write call.
#[cfg_attr(test, mockall::automock)]
pub trait ReportTransport: Send {
    /// Submit one complete output report, report id first.
    fn send_output_report(&mut self, report: &[u8]) -> io::Result<()>;
}

impl<T: ReportTransport + ?Sized> ReportTransport for Box<T> {
    fn send_output_report(&mut self, report: &[u8]) -> io::Result<()> {
        (**self).send_output_report(report)
    }
}
