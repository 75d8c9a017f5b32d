use libwifi_macros::AddressHeader;

use crate::frame::components::*;

/// The capability information field of beacons, probe responses and associations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilityInfo(pub u16);

impl CapabilityInfo {
    pub fn ess(&self) -> bool {
        self.0 & 0x0001 != 0
    }

    pub fn ibss(&self) -> bool {
        self.0 & 0x0002 != 0
    }

    pub fn privacy(&self) -> bool {
        self.0 & 0x0010 != 0
    }

    pub fn short_preamble(&self) -> bool {
        self.0 & 0x0020 != 0
    }

    pub fn spectrum_management(&self) -> bool {
        self.0 & 0x0100 != 0
    }

    pub fn short_slot_time(&self) -> bool {
        self.0 & 0x0400 != 0
    }

    pub fn radio_measurement(&self) -> bool {
        self.0 & 0x1000 != 0
    }

    /// An IBSS-only network, i.e. an ad-hoc station beaconing.
    pub fn is_adhoc(&self) -> bool {
        !self.ess() && self.ibss()
    }
}

/// Fixed parameters of a beacon.
///
/// - 8 byte timestamp (TSF)
/// - 2 byte beacon interval in time units
/// - 2 byte capability information
#[derive(Clone, Debug, AddressHeader)]
pub struct Beacon {
    pub header: MacHeader,
    pub timestamp: u64,
    pub beacon_interval: u16,
    pub capability_info: CapabilityInfo,
}

impl Beacon {
    /// Beacon interval in microseconds (1 TU = 1024us).
    pub fn interval_us(&self) -> u64 {
        self.beacon_interval as u64 * 1024
    }

    /// Beacons per second the interval advertises.
    pub fn rate(&self) -> f64 {
        if self.beacon_interval == 0 {
            0.0
        } else {
            1_000_000.0 / self.interval_us() as f64
        }
    }
}

/// ATIM frames have no body.
#[derive(Clone, Debug, AddressHeader)]
pub struct Atim {
    pub header: MacHeader,
}
