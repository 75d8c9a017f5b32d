use nom::number::complete::le_u16;
use nom::sequence::tuple;

use super::{parse_frame_control, parse_mac, parse_sequence_control};
use crate::error::DissectError;
use crate::frame::components::{FrameControl, MacHeader};
use crate::frame_types::{FrameSubType, FrameType};

/// Frame control, duration and the first address.
pub const MIN_FRAME_LEN: usize = 10;
/// The address block every management and data frame carries.
pub const FULL_HEADER_LEN: usize = 24;
/// Inter-AP data frames carry a 4th address.
pub const WDS_HEADER_LEN: usize = 30;

/// Control frames which only name a receiver.
fn control_has_transmitter(frame_control: &FrameControl) -> bool {
    !matches!(
        frame_control.frame_subtype,
        FrameSubType::Cts | FrameSubType::Ack | FrameSubType::Reserved
    )
}

/// Parse and return the [MacHeader] of a raw frame.
///
/// The length requirements depend on the frame type:
/// - Everything needs at least frame control, duration and address 1 (10 bytes).
/// - Control frames add address 2, unless they're CTS or ACK (16 bytes).
/// - Management and data frames need the full 24 byte block.
/// - Data frames with `to_ds` and `from_ds` set need the 4th address (30 bytes).
///
/// The returned slice starts right after the address block. The QoS control field of
/// QoS data frames is not consumed.
pub fn parse_mac_header(input: &[u8]) -> Result<(&[u8], MacHeader), DissectError> {
    DissectError::require(input, MIN_FRAME_LEN)?;

    let (remaining, (frame_control, duration, address_1)) =
        tuple((parse_frame_control, le_u16, parse_mac))(input)?;

    match frame_control.frame_type {
        FrameType::Control => {
            let mut header = MacHeader {
                frame_control,
                duration,
                address_1,
                address_2: None,
                address_3: None,
                sequence_control: None,
                address_4: None,
            };
            if !control_has_transmitter(&header.frame_control) {
                return Ok((remaining, header));
            }
            DissectError::require(input, 16)?;
            let (remaining, address_2) = parse_mac(remaining)?;
            header.address_2 = Some(address_2);
            Ok((remaining, header))
        }
        FrameType::Management | FrameType::Data => {
            DissectError::require(input, FULL_HEADER_LEN)?;
            let (mut remaining, (address_2, address_3, sequence_control)) =
                tuple((parse_mac, parse_mac, parse_sequence_control))(remaining)?;

            let mut address_4 = None;
            if frame_control.frame_type == FrameType::Data
                && frame_control.distribution().needs_fourth_address()
            {
                DissectError::require(input, WDS_HEADER_LEN)?;
                let (rest, address) = parse_mac(remaining)?;
                remaining = rest;
                address_4 = Some(address);
            }

            Ok((
                remaining,
                MacHeader {
                    frame_control,
                    duration,
                    address_1,
                    address_2: Some(address_2),
                    address_3: Some(address_3),
                    sequence_control: Some(sequence_control),
                    address_4,
                },
            ))
        }
        FrameType::Unknown => Err(DissectError::UnhandledProtocol(format!(
            "frame type 3, subtype {}",
            frame_control.subtype
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::components::MacAddress;

    #[test]
    fn test_too_short() {
        assert_eq!(
            parse_mac_header(&[0x80, 0x00, 0x00]).unwrap_err(),
            DissectError::Truncated {
                needed: 10,
                available: 3
            }
        );
    }

    #[test]
    fn test_cts_needs_ten_bytes() {
        let cts = [0xc4, 0x00, 0x2c, 0x00, 1, 2, 3, 4, 5, 6];
        let (remaining, header) = parse_mac_header(&cts).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(header.address_1, MacAddress([1, 2, 3, 4, 5, 6]));
        assert!(header.address_2.is_none());
    }

    #[test]
    fn test_rts_needs_transmitter() {
        let rts = [0xb4, 0x00, 0x2c, 0x00, 1, 2, 3, 4, 5, 6, 7, 8];
        assert!(matches!(
            parse_mac_header(&rts),
            Err(DissectError::Truncated { needed: 16, .. })
        ));
    }

    #[test]
    fn test_management_needs_full_block() {
        let mut beacon = vec![0x80, 0x00, 0x00, 0x00];
        beacon.extend_from_slice(&[0xff; 6]);
        beacon.extend_from_slice(&[0x00; 10]);
        assert!(matches!(
            parse_mac_header(&beacon),
            Err(DissectError::Truncated { needed: 24, .. })
        ));
    }

    #[test]
    fn test_wds_needs_fourth_address() {
        let mut data = vec![0x08, 0x03, 0x00, 0x00];
        data.extend_from_slice(&[0x11; 20]);
        assert!(matches!(
            parse_mac_header(&data),
            Err(DissectError::Truncated { needed: 30, .. })
        ));
        data.extend_from_slice(&[0x22; 6]);
        let (remaining, header) = parse_mac_header(&data).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(header.address_4, Some(MacAddress([0x22; 6])));
    }
}
