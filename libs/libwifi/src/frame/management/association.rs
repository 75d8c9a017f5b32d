use libwifi_macros::AddressHeader;

use crate::frame::components::*;

use super::{CapabilityInfo, ReasonCode};

#[derive(Clone, Debug, AddressHeader)]
pub struct AssociationRequest {
    pub header: MacHeader,
    pub capability_info: CapabilityInfo,
    pub listen_interval: u16,
}

#[derive(Clone, Debug, AddressHeader)]
pub struct AssociationResponse {
    pub header: MacHeader,
    pub capability_info: CapabilityInfo,
    pub status_code: u16,
    pub association_id: u16,
}

#[derive(Clone, Debug, AddressHeader)]
pub struct ReassociationRequest {
    pub header: MacHeader,
    pub capability_info: CapabilityInfo,
    pub listen_interval: u16,
    /// The AP the station is moving away from.
    pub current_ap: MacAddress,
}

#[derive(Clone, Debug, AddressHeader)]
pub struct ReassociationResponse {
    pub header: MacHeader,
    pub capability_info: CapabilityInfo,
    pub status_code: u16,
    pub association_id: u16,
}

#[derive(Clone, Debug, AddressHeader)]
pub struct Disassociation {
    pub header: MacHeader,
    pub reason_code: ReasonCode,
}
