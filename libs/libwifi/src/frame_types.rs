use strum_macros::Display;

/// Enum with all frame types.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Default)]
pub enum FrameType {
    Management,
    Control,
    Data,
    #[default]
    Unknown,
}

/// Enum with all frame subtypes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Default)]
pub enum FrameSubType {
    // Management subtypes
    AssociationRequest,
    AssociationResponse,
    ReassociationRequest,
    ReassociationResponse,
    ProbeRequest,
    ProbeResponse,
    TimingAdvertisement,
    Beacon,
    Atim,
    Disassociation,
    Authentication,
    Deauthentication,
    Action,
    ActionNoAck,

    // Control subtypes
    Trigger,
    Tack,
    BeamformingReportPoll,
    NdpAnnouncement,
    ControlFrameExtension,
    ControlWrapper,
    BlockAckRequest,
    BlockAck,
    PsPoll,
    Rts,
    Cts,
    Ack,
    CfEnd,
    CfEndCfAck,

    // Data subtypes
    Data,
    DataCfAck,
    DataCfPoll,
    DataCfAckCfPoll,
    NullData,
    CfAck,
    CfPoll,
    CfAckCfPoll,
    QosData,
    QosDataCfAck,
    QosDataCfPoll,
    QosDataCfAckCfPoll,
    QosNull,
    QosCfPoll,
    QosCfAckCfPoll,

    // Special subtypes
    Reserved,
    #[default]
    Unhandled,
}

impl FrameSubType {
    /// QoS data subtypes carry a 2 byte QoS control field after the address block.
    pub fn is_qos(&self) -> bool {
        matches!(
            self,
            FrameSubType::QosData
                | FrameSubType::QosDataCfAck
                | FrameSubType::QosDataCfPoll
                | FrameSubType::QosDataCfAckCfPoll
                | FrameSubType::QosNull
                | FrameSubType::QosCfPoll
                | FrameSubType::QosCfAckCfPoll,
        )
    }

    /// Subtypes whose body carries a tagged parameter stream we decode.
    pub fn carries_ie_tags(&self) -> bool {
        matches!(
            self,
            FrameSubType::Beacon
                | FrameSubType::ProbeRequest
                | FrameSubType::ProbeResponse
                | FrameSubType::AssociationRequest
                | FrameSubType::ReassociationRequest
        )
    }

    /// Data subtypes that can carry an LLC payload.
    pub fn carries_payload(&self) -> bool {
        matches!(
            self,
            FrameSubType::Data
                | FrameSubType::DataCfAck
                | FrameSubType::DataCfPoll
                | FrameSubType::DataCfAckCfPoll
                | FrameSubType::QosData
                | FrameSubType::QosDataCfAck
                | FrameSubType::QosDataCfPoll
                | FrameSubType::QosDataCfAckCfPoll
        )
    }
}

/// Direction of a frame relative to the distribution system.
///
/// Derived from the `to_ds`/`from_ds` bits of the frame control field.
/// The mode decides which of the header addresses is the BSSID, the source and the
/// destination.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Default)]
pub enum DistributionMode {
    /// to_ds=0, from_ds=0. Station to station, or management traffic.
    Adhoc,
    /// to_ds=0, from_ds=1. Leaving the access point towards a station.
    FromAp,
    /// to_ds=1, from_ds=0. A station sending towards the access point.
    ToAp,
    /// to_ds=1, from_ds=1. WDS / mesh traffic with four addresses.
    InterAp,
    #[default]
    Unknown,
}

impl DistributionMode {
    pub fn from_flags(to_ds: bool, from_ds: bool) -> Self {
        match (to_ds, from_ds) {
            (false, false) => DistributionMode::Adhoc,
            (false, true) => DistributionMode::FromAp,
            (true, false) => DistributionMode::ToAp,
            (true, true) => DistributionMode::InterAp,
        }
    }

    /// Inter-AP frames, and anything we can't place, need the 4th address.
    pub fn needs_fourth_address(&self) -> bool {
        matches!(self, DistributionMode::InterAp | DistributionMode::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_from_flags() {
        assert_eq!(
            DistributionMode::from_flags(false, false),
            DistributionMode::Adhoc
        );
        assert_eq!(
            DistributionMode::from_flags(false, true),
            DistributionMode::FromAp
        );
        assert_eq!(
            DistributionMode::from_flags(true, false),
            DistributionMode::ToAp
        );
        assert_eq!(
            DistributionMode::from_flags(true, true),
            DistributionMode::InterAp
        );
        assert!(DistributionMode::InterAp.needs_fourth_address());
        assert!(!DistributionMode::ToAp.needs_fourth_address());
    }
}
