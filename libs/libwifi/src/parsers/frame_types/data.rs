use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u64, u8 as byte};
use nom::sequence::tuple;
use nom::IResult;

use crate::error::DissectError;
use crate::frame::*;
use crate::ie::wps;
use crate::parsers::clone_slice;

/// LLC header of an unnumbered information frame.
pub const LLC_UI_SIGNATURE: [u8; 3] = [0xaa, 0xaa, 0x03];
pub const LLC_UI_OFFSET: usize = 3;
/// SNAP OUI Netstumbler and the Lucent link test probes are sent with.
pub const PROBE_LLC_SIGNATURE: [u8; 3] = [0x00, 0x60, 0x1d];

pub const NETSTUMBLER_OFFSET: usize = 12;
pub const NETSTUMBLER_322_SIGNATURE: &[u8] = b"All your 802.11b";
pub const NETSTUMBLER_323_SIGNATURE: &[u8] = b"Flurble gronk bloopit, bnip Frundletrune";
pub const NETSTUMBLER_330_SIGNATURE: &[u8] = b"               ";

pub const LUCENT_OFFSET: usize = 12;
pub const LUCENT_TEST_SIGNATURE: [u8; 8] = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// 802.1X header offset in the payload, after the LLC/SNAP block.
pub const DOT1X_OFFSET: usize = 8;
/// EAP and EAPOL-Key bodies start after the 4 byte 802.1X header.
pub const EAP_OFFSET: usize = DOT1X_OFFSET + 4;
/// Code, identifier, length and type.
pub const EAP_PACKET_SIZE: usize = 5;

/// WFA vendor id, vendor type 1 (simple config) and the WSC_MSG opcode.
const WFA_WPS_EXPANDED: [u8; 8] = [0x00, 0x37, 0x2a, 0x00, 0x00, 0x00, 0x01, 0x04];

/// A known scanner probe recognized in an LLC payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeSignature {
    Netstumbler322,
    Netstumbler323,
    Netstumbler330,
    LucentTest,
    /// The LLC matched, the payload didn't match any known version.
    UnknownNetstumbler,
}

fn matches_at(payload: &[u8], offset: usize, signature: &[u8]) -> bool {
    // The signature must be followed by at least one more byte.
    offset + signature.len() < payload.len()
        && &payload[offset..offset + signature.len()] == signature
}

/// Look for scanner probes in an unencrypted data payload.
pub fn probe_signatures(payload: &[u8]) -> Vec<ProbeSignature> {
    let mut found = Vec::new();
    if payload.len() <= LLC_UI_OFFSET + PROBE_LLC_SIGNATURE.len()
        || !payload.starts_with(&LLC_UI_SIGNATURE)
        || payload[LLC_UI_OFFSET..LLC_UI_OFFSET + 3] != PROBE_LLC_SIGNATURE
    {
        return found;
    }

    for (signature, kind) in [
        (NETSTUMBLER_322_SIGNATURE, ProbeSignature::Netstumbler322),
        (NETSTUMBLER_323_SIGNATURE, ProbeSignature::Netstumbler323),
        (NETSTUMBLER_330_SIGNATURE, ProbeSignature::Netstumbler330),
    ] {
        if matches_at(payload, NETSTUMBLER_OFFSET, signature) {
            found.push(kind);
        }
    }
    if matches_at(payload, LUCENT_OFFSET, &LUCENT_TEST_SIGNATURE) {
        found.push(ProbeSignature::LucentTest);
    }
    if found.is_empty() {
        found.push(ProbeSignature::UnknownNetstumbler);
    }
    found
}

fn u16_be(input: &[u8]) -> IResult<&[u8], u16> {
    be_u16(input)
}

fn octet(input: &[u8]) -> IResult<&[u8], u8> {
    byte(input)
}

/// Parse the 802.1X header of a payload starting with the LLC/SNAP block.
///
/// Returns `None` if the payload isn't 802.1X at all.
pub fn parse_dot1x(payload: &[u8]) -> Option<(Dot1xHeader, &[u8])> {
    if payload.len() < EAP_OFFSET || payload[..DOT1X_OFFSET] != DOT1X_LLC {
        return None;
    }
    let (rest, (version, packet_type, length)) =
        tuple((octet, octet, u16_be))(&payload[DOT1X_OFFSET..]).ok()?;
    Some((
        Dot1xHeader {
            version,
            packet_type,
            length,
        },
        rest,
    ))
}

/// Parse an EAP packet. The length field must fit the buffer.
pub fn parse_eap(input: &[u8]) -> Result<EapPacket, DissectError> {
    DissectError::require(input, 4)?;
    let (rest, (code, identifier, length)) = tuple((octet, octet, u16_be))(input)?;
    DissectError::require(input, length as usize)?;

    let code = EapCode::from(code);
    let (eap_type, data) = match code {
        EapCode::Request | EapCode::Response if length as usize >= EAP_PACKET_SIZE => {
            let body = &rest[..length as usize - 4];
            (Some(body[0]), body[1..].to_vec())
        }
        _ => (None, Vec::new()),
    };

    Ok(EapPacket {
        code,
        identifier,
        length,
        eap_type,
        data,
    })
}

/// True for a WPS M3 carried in an EAP expanded type request.
pub fn is_wps_m3(eap: &EapPacket) -> bool {
    eap.code == EapCode::Request
        && eap.eap_type == Some(EAP_TYPE_EXPANDED)
        && eap.data.starts_with(&WFA_WPS_EXPANDED)
        // skip the flags byte
        && eap
            .data
            .get(WFA_WPS_EXPANDED.len() + 1..)
            .and_then(wps::message_type)
            == Some(wps::MESSAGE_M3)
}

/// Parse an EAPOL-Key body, following the 802.1X header.
pub fn parse_eapol_key(header: &Dot1xHeader, input: &[u8]) -> Result<EapolKey, DissectError> {
    if header.packet_type != DOT1X_TYPE_KEY {
        return Err(DissectError::UnhandledProtocol(format!(
            "802.1X packet type {}",
            header.packet_type
        )));
    }

    let (input, (descriptor_type, key_information, key_length, replay_counter)) =
        tuple((octet, u16_be, u16_be, be_u64))(input)?;
    let (input, (key_nonce, key_iv, key_rsc, key_id, key_mic, key_data_length)) = tuple((
        take(32usize),
        take(16usize),
        be_u64,
        be_u64,
        take(16usize),
        u16_be,
    ))(input)?;
    DissectError::require(input, key_data_length as usize)?;
    let key_data = &input[..key_data_length as usize];

    Ok(EapolKey {
        protocol_version: header.version,
        packet_length: header.length,
        descriptor_type,
        key_information: KeyInformation(key_information),
        key_length,
        replay_counter,
        key_nonce: clone_slice::<32>(key_nonce),
        key_iv: clone_slice::<16>(key_iv),
        key_rsc,
        key_id,
        key_mic: clone_slice::<16>(key_mic),
        key_data_length,
        key_data: key_data.to_vec(),
    })
}
