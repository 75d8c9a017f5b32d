use libwifi_macros::AddressHeader;

use crate::frame::components::*;

use super::CapabilityInfo;

/// Probe requests carry their tags right after the header.
#[derive(Clone, Debug, AddressHeader)]
pub struct ProbeRequest {
    pub header: MacHeader,
}

/// Same fixed parameters as a beacon.
#[derive(Clone, Debug, AddressHeader)]
pub struct ProbeResponse {
    pub header: MacHeader,
    pub timestamp: u64,
    pub beacon_interval: u16,
    pub capability_info: CapabilityInfo,
}
