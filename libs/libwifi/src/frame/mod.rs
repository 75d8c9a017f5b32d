use enum_dispatch::enum_dispatch;

/// Contains structs representing recurring sets of structured data.
/// For instance, MAC addresses and the MAC header.
pub mod components;

/// 802.1X, EAP and EAPOL-Key structs found in data frames.
pub mod eapol;
/// Management frame structs
mod management;

pub use eapol::*;
pub use management::*;

#[enum_dispatch(Addresses)]
#[derive(Clone, Debug)]
/// The fixed parameters of every management subtype.
///
/// Each variant is represented by its own struct. Tags following the fixed parameters
/// are decoded separately into [crate::ie::TaggedParameters].
pub enum ManagementFrame {
    Beacon(Beacon),
    ProbeRequest(ProbeRequest),
    ProbeResponse(ProbeResponse),
    AssociationRequest(AssociationRequest),
    AssociationResponse(AssociationResponse),
    ReassociationRequest(ReassociationRequest),
    ReassociationResponse(ReassociationResponse),
    Atim(Atim),
    Disassociation(Disassociation),
    Authentication(Authentication),
    Deauthentication(Deauthentication),
    Action(Action),
}

impl ManagementFrame {
    /// Capability information, for the subtypes that carry it.
    pub fn capability_info(&self) -> Option<CapabilityInfo> {
        match self {
            ManagementFrame::Beacon(frame) => Some(frame.capability_info),
            ManagementFrame::ProbeResponse(frame) => Some(frame.capability_info),
            ManagementFrame::AssociationRequest(frame) => Some(frame.capability_info),
            ManagementFrame::AssociationResponse(frame) => Some(frame.capability_info),
            ManagementFrame::ReassociationRequest(frame) => Some(frame.capability_info),
            ManagementFrame::ReassociationResponse(frame) => Some(frame.capability_info),
            _ => None,
        }
    }

    /// Reason code of deauthentication and disassociation frames.
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            ManagementFrame::Deauthentication(frame) => Some(frame.reason_code),
            ManagementFrame::Disassociation(frame) => Some(frame.reason_code),
            _ => None,
        }
    }

    pub fn beacon_interval(&self) -> Option<u16> {
        match self {
            ManagementFrame::Beacon(frame) => Some(frame.beacon_interval),
            ManagementFrame::ProbeResponse(frame) => Some(frame.beacon_interval),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<u64> {
        match self {
            ManagementFrame::Beacon(frame) => Some(frame.timestamp),
            ManagementFrame::ProbeResponse(frame) => Some(frame.timestamp),
            _ => None,
        }
    }
}
