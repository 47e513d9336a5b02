//! # Controller Listener
//!
//! Owned per-controller context tying the pipeline together. The host calls
//! four hooks, all from one logical thread of control:
//!
//! | Hook | Work |
//! |------|------|
//! | [`Listener::attach`] | Resolve the family, identify licensed pads, reset state, set the lightbar (bounded retry) |
//! | [`Listener::on_report`] | Decode → change filter → profile → macros → mapper |
//! | [`Listener::poll`] | Retry a dirty indicator, push the canonical state |
//! | [`Listener::detach`] | Reset everything |
//!
//! Nothing in here is fatal: a bad report is dropped, a failed indicator send
//! is retried on a later poll.

use std::time::Instant;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::controller::change_filter::ChangeFilter;
use crate::controller::family::{needs_identification, DS4_DEFINITION_REPORT_ID};
use crate::controller::macros::MacroEngine;
use crate::controller::mapper::GamepadMapper;
use crate::controller::profile::ProfileSwitch;
use crate::controller::report::{decode, RawReport};
use crate::controller::{CanonicalGamepadState, ControllerFamily, Profile};
use crate::indicator::IndicatorState;
use crate::transport::ReportTransport;

/// HID short item prefix for a global Report ID item with one data byte.
const HID_ITEM_REPORT_ID: u8 = 0x85;
/// HID long item prefix.
const HID_LONG_ITEM: u8 = 0xfe;

/// Identity of an attached device as reported by the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    /// Host-side device number (the `N` of `/dev/hidrawN`)
    pub address: u8,
    /// USB interface number
    pub instance: u8,
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Per-controller state machine context.
#[derive(Debug)]
pub struct Listener {
    device: Option<DeviceInfo>,
    family: ControllerFamily,
    /// Cleared for a licensed pad whose descriptor lacks the DS4 definition
    identified: bool,

    filter: ChangeFilter,
    switch: ProfileSwitch,
    macros: MacroEngine,
    mapper: GamepadMapper,
    indicator: IndicatorState,

    state: CanonicalGamepadState,
}

impl Listener {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            device: None,
            family: ControllerFamily::Unsupported,
            identified: false,
            filter: ChangeFilter::new(),
            switch: ProfileSwitch::new(&config.profile),
            macros: MacroEngine::new(&config.macros),
            mapper: GamepadMapper::new(&config.macros),
            indicator: IndicatorState::new(&config.indicator),
            state: CanonicalGamepadState::default(),
        }
    }

    /// Attach hook.
    ///
    /// Resets all state, resolves the family from the product id and, for a
    /// supported controller, sets the lightbar to the default profile's
    /// colour. Returns whether that initial indicator send succeeded.
    ///
    /// Licensed DS4-compatible pads are identified from `descriptor`: one
    /// that does not declare the DS4 definition feature report stays
    /// undecoded, and its lightbar is never driven.
    pub fn attach<T>(&mut self, device: DeviceInfo, descriptor: &[u8], transport: &mut T) -> bool
    where
        T: ReportTransport + ?Sized,
    {
        self.reset();
        self.device = Some(device);
        self.family = ControllerFamily::from_product_id(device.product_id);

        info!(
            "Controller attached: {:04x}:{:04x} at {}/{} ({})",
            device.vendor_id,
            device.product_id,
            device.address,
            device.instance,
            self.family.name()
        );

        if !self.family.is_supported() {
            info!("Unsupported controller, passing reports through");
            return false;
        }

        self.identified = !needs_identification(device.product_id)
            || descriptor_report_ids(descriptor).contains(&DS4_DEFINITION_REPORT_ID);
        if !self.identified {
            info!(
                "Descriptor ({} bytes) declares no DS4 definition report, passing reports through",
                descriptor.len()
            );
            return false;
        }
        debug!("Report descriptor: {} bytes", descriptor.len());

        self.indicator.send_blocking(self.family, transport)
    }

    /// Detach hook. Resets every piece of state.
    pub fn detach(&mut self) {
        if let Some(device) = self.device {
            info!(
                "Controller detached: {:04x}:{:04x}",
                device.vendor_id, device.product_id
            );
        }
        self.reset();
    }

    /// Report-arrival hook.
    ///
    /// Returns `true` when the report propagated into a new canonical state.
    pub fn on_report(&mut self, bytes: &[u8], now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }

        let Some(report) = decode(&RawReport::new(self.family, bytes)) else {
            trace!("Dropped report: id {:02x?}, {} bytes", bytes.first(), bytes.len());
            return false;
        };

        let force = self.macros.is_running() || self.switch.is_holding();
        if !self.filter.should_propagate(report.token, force) {
            return false;
        }

        if self
            .switch
            .update(report.buttons.select, report.buttons.start, now)
        {
            self.indicator.mark_dirty(self.switch.active());
        }

        let profile = self.switch.active();
        let macros = self.macros.tick(&report, profile, now);
        self.state = self.mapper.map(&report, profile, macros);
        true
    }

    /// Poll hook.
    ///
    /// Makes one non-blocking indicator attempt if dirty, then overwrites
    /// `out` with the current canonical state.
    pub fn poll<T>(&mut self, now: Instant, transport: &mut T, out: &mut CanonicalGamepadState)
    where
        T: ReportTransport + ?Sized,
    {
        if self.is_active() {
            self.indicator.poll(self.family, transport, now);
        }
        *out = self.state;
    }

    #[must_use]
    pub fn profile(&self) -> Profile {
        self.switch.active()
    }

    #[must_use]
    pub fn family(&self) -> ControllerFamily {
        self.family
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    #[must_use]
    pub fn state(&self) -> &CanonicalGamepadState {
        &self.state
    }

    #[must_use]
    pub fn indicator(&self) -> &IndicatorState {
        &self.indicator
    }

    /// Attached, supported and identified.
    fn is_active(&self) -> bool {
        self.device.is_some() && self.family.is_supported() && self.identified
    }

    fn reset(&mut self) {
        self.device = None;
        self.family = ControllerFamily::Unsupported;
        self.identified = false;
        self.filter.reset();
        self.switch.reset();
        self.macros.reset();
        self.indicator.reset();
        self.state = CanonicalGamepadState::default();
    }
}

/// Report ids declared by a HID report descriptor, in order of appearance.
///
/// Walks the item stream without interpreting collections.
#[must_use]
pub fn descriptor_report_ids(descriptor: &[u8]) -> Vec<u8> {
    let mut ids = Vec::new();
    let mut i = 0;

    while i < descriptor.len() {
        let prefix = descriptor[i];
        if prefix == HID_LONG_ITEM {
            // bDataSize follows, then bLongItemTag
            let size = descriptor.get(i + 1).copied().unwrap_or(0) as usize;
            i += 3 + size;
            continue;
        }

        let size = match prefix & 0x03 {
            3 => 4,
            n => n as usize,
        };
        if prefix == HID_ITEM_REPORT_ID {
            if let Some(&id) = descriptor.get(i + 1) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        i += 1 + size;
    }

    ids
}
