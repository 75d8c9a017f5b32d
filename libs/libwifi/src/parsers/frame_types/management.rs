use nom::number::complete::{le_u16, le_u64, u8 as byte};
use nom::sequence::tuple;
use nom::IResult;

use crate::error::DissectError;
use crate::frame::components::MacHeader;
use crate::frame::*;
use crate::frame_types::FrameSubType;
use crate::parsers::{parse_mac, FULL_HEADER_LEN};

/// Size of the fixed parameter block each management subtype puts in front of its tags.
pub fn fixed_parameters_len(subtype: FrameSubType) -> usize {
    match subtype {
        // timestamp, interval, capabilities
        FrameSubType::Beacon | FrameSubType::ProbeResponse => 12,
        // capabilities, listen interval
        FrameSubType::AssociationRequest => 4,
        // capabilities, listen interval, current AP
        FrameSubType::ReassociationRequest => 10,
        // capabilities, status, association id
        FrameSubType::AssociationResponse | FrameSubType::ReassociationResponse => 6,
        // algorithm, sequence, status
        FrameSubType::Authentication => 6,
        // reason code
        FrameSubType::Deauthentication | FrameSubType::Disassociation => 2,
        // category, action
        FrameSubType::Action | FrameSubType::ActionNoAck => 2,
        _ => 0,
    }
}

/// Offset of the first tag (or the frame body) for a management subtype.
pub fn management_header_offset(subtype: FrameSubType) -> usize {
    FULL_HEADER_LEN + fixed_parameters_len(subtype)
}

fn u16_le(input: &[u8]) -> IResult<&[u8], u16> {
    le_u16(input)
}

fn octet(input: &[u8]) -> IResult<&[u8], u8> {
    byte(input)
}

fn capability(input: &[u8]) -> IResult<&[u8], CapabilityInfo> {
    let (input, raw) = le_u16(input)?;
    Ok((input, CapabilityInfo(raw)))
}

fn reason(input: &[u8]) -> IResult<&[u8], ReasonCode> {
    let (input, raw) = le_u16(input)?;
    Ok((input, ReasonCode(raw)))
}

/// Parse the fixed parameters of a management frame.
///
/// `body` starts right after the 24 byte header. A body shorter than the subtype's
/// fixed parameter block is truncated.
pub fn parse_management_frame(
    header: MacHeader,
    body: &[u8],
) -> Result<ManagementFrame, DissectError> {
    let subtype = header.frame_control.frame_subtype;
    DissectError::require(body, fixed_parameters_len(subtype)).map_err(|_| {
        DissectError::Truncated {
            needed: management_header_offset(subtype),
            available: FULL_HEADER_LEN + body.len(),
        }
    })?;

    let frame = match subtype {
        FrameSubType::Beacon => {
            let (_, (timestamp, beacon_interval, capability_info)) =
                tuple((le_u64, u16_le, capability))(body)?;
            ManagementFrame::Beacon(Beacon {
                header,
                timestamp,
                beacon_interval,
                capability_info,
            })
        }
        FrameSubType::ProbeResponse => {
            let (_, (timestamp, beacon_interval, capability_info)) =
                tuple((le_u64, u16_le, capability))(body)?;
            ManagementFrame::ProbeResponse(ProbeResponse {
                header,
                timestamp,
                beacon_interval,
                capability_info,
            })
        }
        FrameSubType::ProbeRequest => ManagementFrame::ProbeRequest(ProbeRequest { header }),
        FrameSubType::AssociationRequest => {
            let (_, (capability_info, listen_interval)) = tuple((capability, u16_le))(body)?;
            ManagementFrame::AssociationRequest(AssociationRequest {
                header,
                capability_info,
                listen_interval,
            })
        }
        FrameSubType::ReassociationRequest => {
            let (_, (capability_info, listen_interval, current_ap)) =
                tuple((capability, u16_le, parse_mac))(body)?;
            ManagementFrame::ReassociationRequest(ReassociationRequest {
                header,
                capability_info,
                listen_interval,
                current_ap,
            })
        }
        FrameSubType::AssociationResponse => {
            let (_, (capability_info, status_code, association_id)) =
                tuple((capability, u16_le, u16_le))(body)?;
            ManagementFrame::AssociationResponse(AssociationResponse {
                header,
                capability_info,
                status_code,
                association_id: association_id & 0x3fff,
            })
        }
        FrameSubType::ReassociationResponse => {
            let (_, (capability_info, status_code, association_id)) =
                tuple((capability, u16_le, u16_le))(body)?;
            ManagementFrame::ReassociationResponse(ReassociationResponse {
                header,
                capability_info,
                status_code,
                association_id: association_id & 0x3fff,
            })
        }
        FrameSubType::Authentication => {
            let (_, (auth_algorithm, auth_seq, status_code)) =
                tuple((u16_le, u16_le, u16_le))(body)?;
            ManagementFrame::Authentication(Authentication {
                header,
                auth_algorithm,
                auth_seq,
                status_code,
            })
        }
        FrameSubType::Deauthentication => {
            let (_, reason_code) = reason(body)?;
            ManagementFrame::Deauthentication(Deauthentication {
                header,
                reason_code,
            })
        }
        FrameSubType::Disassociation => {
            let (_, reason_code) = reason(body)?;
            ManagementFrame::Disassociation(Disassociation {
                header,
                reason_code,
            })
        }
        FrameSubType::Action | FrameSubType::ActionNoAck => {
            let (rest, (category, action)) = tuple((octet, octet))(body)?;
            ManagementFrame::Action(Action {
                header,
                category: ActionCategory::from(category),
                action,
                body: rest.to_vec(),
            })
        }
        FrameSubType::Atim => ManagementFrame::Atim(Atim { header }),
        other => {
            return Err(DissectError::UnhandledProtocol(format!(
                "management subtype {other}"
            )))
        }
    };

    Ok(frame)
}
