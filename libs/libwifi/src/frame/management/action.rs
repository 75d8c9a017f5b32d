use libwifi_macros::AddressHeader;

use crate::frame::components::*;

#[derive(Clone, Debug, AddressHeader)]
pub struct Action {
    pub header: MacHeader,
    pub category: ActionCategory,
    pub action: u8,
    pub body: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionCategory {
    SpectrumManagement,
    Qos,
    BlockAck,
    Public,
    RadioMeasurement,
    FastBssTransition,
    HighThroughput,
    SaQuery,
    ProtectedDualOfPublicAction,
    Wnm,
    UnprotectedWnm,
    Tdls,
    Mesh,
    Multihop,
    SelfProtected,
    Vht,
    VendorSpecificProtected,
    VendorSpecific,
    Other(u8),
}

impl From<u8> for ActionCategory {
    fn from(value: u8) -> Self {
        match value {
            0 => ActionCategory::SpectrumManagement,
            1 => ActionCategory::Qos,
            3 => ActionCategory::BlockAck,
            4 => ActionCategory::Public,
            5 => ActionCategory::RadioMeasurement,
            6 => ActionCategory::FastBssTransition,
            7 => ActionCategory::HighThroughput,
            8 => ActionCategory::SaQuery,
            9 => ActionCategory::ProtectedDualOfPublicAction,
            10 => ActionCategory::Wnm,
            11 => ActionCategory::UnprotectedWnm,
            12 => ActionCategory::Tdls,
            13 => ActionCategory::Mesh,
            14 => ActionCategory::Multihop,
            15 => ActionCategory::SelfProtected,
            21 => ActionCategory::Vht,
            126 => ActionCategory::VendorSpecificProtected,
            127 => ActionCategory::VendorSpecific,
            other => ActionCategory::Other(other),
        }
    }
}
