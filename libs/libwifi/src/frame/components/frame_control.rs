use crate::frame_types::*;

#[inline]
/// Mini helper to check, whether a bit is set or not.
fn flag_is_set(data: u8, bit: u8) -> bool {
    (data & (1 << bit)) > 0
}

/// The first two bytes of every frame.
///
/// First byte:
///
/// - **bit_0-1**: Protocol version. Always 0 so far.
/// - **bit_2-3**: [FrameType]
/// - **bit_4-7**: [FrameSubType]
///
/// Second byte (flags):
/// - **bit_0** `to_ds`
/// - **bit_1** `from_ds`
/// - **bit_2** `more_frag`: More fragments of this MSDU follow.
/// - **bit_3** `retry`: Retransmission of an earlier frame.
/// - **bit_4** `pwr_mgmt`
/// - **bit_5** `more_data`
/// - **bit_6** `protected`: The body is encrypted (WEP, TKIP or CCMP).
/// - **bit_7** `order`
///
/// Immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameControl {
    pub protocol_version: u8,
    pub frame_type: FrameType,
    pub frame_subtype: FrameSubType,
    /// The raw 4 bit subtype number, kept for reserved subtypes.
    pub subtype: u8,
    pub flags: u8,
}

impl FrameControl {
    pub fn to_ds(&self) -> bool {
        flag_is_set(self.flags, 0)
    }

    pub fn from_ds(&self) -> bool {
        flag_is_set(self.flags, 1)
    }

    pub fn more_frag(&self) -> bool {
        flag_is_set(self.flags, 2)
    }

    pub fn retry(&self) -> bool {
        flag_is_set(self.flags, 3)
    }

    pub fn pwr_mgmt(&self) -> bool {
        flag_is_set(self.flags, 4)
    }

    pub fn more_data(&self) -> bool {
        flag_is_set(self.flags, 5)
    }

    pub fn protected(&self) -> bool {
        flag_is_set(self.flags, 6)
    }

    pub fn order(&self) -> bool {
        flag_is_set(self.flags, 7)
    }

    pub fn distribution(&self) -> DistributionMode {
        DistributionMode::from_flags(self.to_ds(), self.from_ds())
    }

    pub fn encode(&self) -> [u8; 2] {
        let protocol_version_bits = self.protocol_version & 0b11;
        let frame_type_bits = match self.frame_type {
            FrameType::Management => 0,
            FrameType::Control => 1,
            FrameType::Data => 2,
            FrameType::Unknown => 3,
        } << 2;
        let frame_subtype_bits = (self.subtype & 0b1111) << 4;

        [
            frame_subtype_bits | frame_type_bits | protocol_version_bits,
            self.flags,
        ]
    }
}
