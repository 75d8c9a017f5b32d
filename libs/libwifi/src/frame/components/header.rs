use super::{FrameControl, MacAddress, SequenceControl};
use crate::frame_types::{DistributionMode, FrameSubType, FrameType};
use crate::traits::Addresses;

/// The 802.11 MAC header, for every frame type.
///
/// Structure:
///
/// **Bytes 0-1** \
/// Frame control. Take a look at the [FrameControl] struct for more information.
///
/// **Bytes 2-3** \
/// Duration, little endian. Always present.
///
/// **Bytes 4-29** \
/// byte 4-9: Address 1. Always present!
/// byte 10-15: Address 2. Missing on CTS and ACK.
/// byte 16-21: Address 3. Missing on all control frames.
/// byte 22-23: Sequence Control. Missing on all control frames.
/// byte 24-29: Address 4. Only on data frames with both `to_ds` and `from_ds` set.
///
/// Control frames are the only ones allowed to be shorter than 24 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacHeader {
    pub frame_control: FrameControl,
    pub duration: u16,
    pub address_1: MacAddress,
    pub address_2: Option<MacAddress>,
    pub address_3: Option<MacAddress>,
    pub sequence_control: Option<SequenceControl>,
    pub address_4: Option<MacAddress>,
}

impl MacHeader {
    /// Length of the header on the wire, without QoS control.
    pub fn len(&self) -> usize {
        if self.address_4.is_some() {
            30
        } else if self.address_3.is_some() {
            24
        } else if self.address_2.is_some() {
            16
        } else {
            10
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn distribution(&self) -> DistributionMode {
        self.frame_control.distribution()
    }

    /// The station this frame is sent to over the air.
    pub fn receiver(&self) -> &MacAddress {
        &self.address_1
    }

    /// The station that put this frame on the air.
    pub fn transmitter(&self) -> Option<&MacAddress> {
        self.address_2.as_ref()
    }

    fn is_data(&self) -> bool {
        self.frame_control.frame_type == FrameType::Data
    }

    fn is_control(&self) -> bool {
        self.frame_control.frame_type == FrameType::Control
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.frame_control.encode());
        bytes.extend_from_slice(&self.duration.to_le_bytes());
        bytes.extend_from_slice(&self.address_1.encode());
        if let Some(address) = &self.address_2 {
            bytes.extend_from_slice(&address.encode());
        }
        if let Some(address) = &self.address_3 {
            bytes.extend_from_slice(&address.encode());
        }
        if let Some(sequence) = &self.sequence_control {
            bytes.extend_from_slice(&sequence.encode());
        }
        if let Some(address) = &self.address_4 {
            bytes.extend_from_slice(&address.encode());
        }
        bytes
    }
}

/// Which address is used in which way, depends on the frame type and on the
/// `to_ds`/`from_ds` flags.
///
/// Management frames always use: dest = Address 1, source = Address 2, BSSID = Address 3.
///
/// Data frames:
///
/// | mode     | dest | source | bssid |
/// |----------|------|--------|-------|
/// | adhoc    | A1   | A2     | A3, or the source if A3 is zeroed |
/// | from AP  | A1   | A3     | A2    |
/// | to AP    | A3   | A2     | A1    |
/// | inter AP | A1   | A4     | A1    |
///
/// Control frames only carry receiver and transmitter. PS-Poll names the BSSID in
/// Address 1, CF-End in Address 2.
impl Addresses for MacHeader {
    fn src(&self) -> Option<&MacAddress> {
        if self.is_data() {
            match self.distribution() {
                DistributionMode::FromAp => self.address_3.as_ref(),
                DistributionMode::InterAp | DistributionMode::Unknown => self.address_4.as_ref(),
                _ => self.address_2.as_ref(),
            }
        } else if self.is_control() {
            match self.frame_control.frame_subtype {
                FrameSubType::CfEnd | FrameSubType::CfEndCfAck => None,
                _ => self.address_2.as_ref(),
            }
        } else {
            self.address_2.as_ref()
        }
    }

    fn dest(&self) -> &MacAddress {
        if self.is_data() && self.distribution() == DistributionMode::ToAp {
            self.address_3.as_ref().unwrap_or(&self.address_1)
        } else {
            &self.address_1
        }
    }

    fn bssid(&self) -> Option<&MacAddress> {
        if self.is_data() {
            match self.distribution() {
                DistributionMode::Adhoc => match &self.address_3 {
                    Some(bssid) if !bssid.is_zero() => Some(bssid),
                    _ => self.src(),
                },
                DistributionMode::FromAp => self.address_2.as_ref(),
                _ => Some(&self.address_1),
            }
        } else if self.is_control() {
            match self.frame_control.frame_subtype {
                FrameSubType::PsPoll => Some(&self.address_1),
                FrameSubType::CfEnd | FrameSubType::CfEndCfAck => self.address_2.as_ref(),
                _ => None,
            }
        } else {
            self.address_3.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_mac_header;

    const A1: MacAddress = MacAddress([1, 1, 1, 1, 1, 1]);
    const A2: MacAddress = MacAddress([2, 2, 2, 2, 2, 2]);
    const A3: MacAddress = MacAddress([3, 3, 3, 3, 3, 3]);
    const A4: MacAddress = MacAddress([4, 4, 4, 4, 4, 4]);

    fn data_header(flags: u8, address_3: MacAddress) -> MacHeader {
        let mut bytes = vec![0x08, flags, 0, 0];
        bytes.extend_from_slice(&A1.0);
        bytes.extend_from_slice(&A2.0);
        bytes.extend_from_slice(&address_3.0);
        bytes.extend_from_slice(&[0x10, 0x00]);
        bytes.extend_from_slice(&A4.0);
        parse_mac_header(&bytes).unwrap().1
    }

    #[test]
    fn test_data_address_roles() {
        let adhoc = data_header(0b00, A3);
        assert_eq!(adhoc.dest(), &A1);
        assert_eq!(adhoc.src(), Some(&A2));
        assert_eq!(adhoc.bssid(), Some(&A3));

        let from_ap = data_header(0b10, A3);
        assert_eq!(from_ap.dest(), &A1);
        assert_eq!(from_ap.bssid(), Some(&A2));
        assert_eq!(from_ap.src(), Some(&A3));

        let to_ap = data_header(0b01, A3);
        assert_eq!(to_ap.bssid(), Some(&A1));
        assert_eq!(to_ap.src(), Some(&A2));
        assert_eq!(to_ap.dest(), &A3);

        let inter = data_header(0b11, A3);
        assert_eq!(inter.bssid(), Some(&A1));
        assert_eq!(inter.src(), Some(&A4));
        assert_eq!(inter.dest(), &A1);
        assert_eq!(inter.len(), 30);
    }

    #[test]
    fn test_adhoc_zero_bssid_falls_back_to_source() {
        let adhoc = data_header(0b00, MacAddress::zeroed());
        assert_eq!(adhoc.bssid(), Some(&A2));
    }

    #[test]
    fn test_encode_matches_wire() {
        let header = data_header(0b11, A3);
        let encoded = header.encode();
        assert_eq!(encoded.len(), 30);
        assert_eq!(parse_mac_header(&encoded).unwrap().1, header);
    }
}
