use log::{debug, trace};

use crate::alert::{Alert, AlertKind};
use crate::config::DissectorConfig;
use crate::crypt::{protected_data_cipher, Cryptset};
use crate::error::DissectError;
use crate::frame::components::{MacAddress, MacHeader};
use crate::frame::*;
use crate::frame_types::{DistributionMode, FrameSubType, FrameType};
use crate::ie::{tag_checksum, TaggedParameters};
use crate::packinfo::PacketInfo;
use crate::parsers::*;
use crate::Addresses;

/// Source address of the Metasploit Broadcom SSID overflow beacon.
pub const MSF_BCOM_SOURCE: MacAddress = MacAddress([0x90, 0xe9, 0x75, 0x00, 0x00, 0x00]);
/// The Metasploit Netgear beacon puts its payload this far into an over-sized frame.
pub const MSF_NETGEAR_OFFSET: usize = 1180;
pub const MSF_NETGEAR_SIGNATURE: [u8; 4] = [0x6a, 0x39, 0x58, 0x01];

/// Raw data subtypes with no defined meaning.
const INVALID_DATA_SUBTYPES: [u8; 2] = [7, 13];

/// Dissect one raw 802.11 frame.
///
/// This is a pure function of the frame bytes and `config`. Hard errors don't
/// propagate: the packet comes back marked corrupt, with the error attached and
/// whatever was decoded before the failure still filled in. Alerts raised along the
/// way carry the packet's addresses.
pub fn dissect_frame(data: &[u8], config: &DissectorConfig) -> PacketInfo {
    let mut info = PacketInfo::default();

    if let Err(error) = dissect_into(data, config, &mut info) {
        debug!("Corrupt {} {} frame: {error}", info.frame_type, info.subtype);
        info.set_corrupt(error);
    }

    info.address_alerts();
    info
}

fn dissect_into(
    data: &[u8],
    config: &DissectorConfig,
    info: &mut PacketInfo,
) -> Result<(), DissectError> {
    let (body, header) = parse_mac_header(data)?;
    resolve_header(&header, info);
    info.header_offset = header.len();
    info.datasize = body.len();

    match info.frame_type {
        FrameType::Control => {
            if data.len() > config.max_phy_len {
                return Err(DissectError::corrupt(format!(
                    "control frame of {} bytes",
                    data.len()
                )));
            }
            Ok(())
        }
        FrameType::Management => dissect_management(data, header, body, config, info),
        FrameType::Data => dissect_data(data, &header, info),
        FrameType::Unknown => Err(DissectError::UnhandledProtocol("unknown frame type".into())),
    }
}

/// Copy type, addressing and sequence information from the header.
fn resolve_header(header: &MacHeader, info: &mut PacketInfo) {
    let frame_control = &header.frame_control;
    info.frame_type = frame_control.frame_type;
    info.subtype = frame_control.frame_subtype;
    info.distribution = header.distribution();
    info.retry = frame_control.retry();

    info.bssid = header.bssid().copied();
    info.source = header.src().copied();
    info.dest = Some(*header.dest());
    info.transmitter = header.transmitter().copied();
    info.receiver = Some(*header.receiver());

    if let Some(sequence) = header.sequence_control {
        info.sequence_number = sequence.sequence_number;
        info.fragment_number = sequence.fragment_number;
    }
    info.fragmented = frame_control.more_frag() || info.fragment_number != 0;
    info.frame_control = Some(frame_control.clone());
}

fn dissect_management(
    data: &[u8],
    header: MacHeader,
    body: &[u8],
    config: &DissectorConfig,
    info: &mut PacketInfo,
) -> Result<(), DissectError> {
    let subtype = header.frame_control.frame_subtype;

    // Management addressing is fixed, the DS bits don't say anything about direction.
    info.distribution = match subtype {
        FrameSubType::ProbeRequest => DistributionMode::ToAp,
        _ => DistributionMode::Unknown,
    };

    // The Netgear payload is larger than any legal management frame, look for it
    // before the size cap throws the frame away.
    if subtype == FrameSubType::Beacon
        && data.len() >= MSF_NETGEAR_OFFSET + MSF_NETGEAR_SIGNATURE.len()
        && data[MSF_NETGEAR_OFFSET..MSF_NETGEAR_OFFSET + MSF_NETGEAR_SIGNATURE.len()]
            == MSF_NETGEAR_SIGNATURE
    {
        info.raise(Alert::new(
            AlertKind::MsfNetgearBeacon,
            "MSF-style over-sized beacon, exploit attempt against Netgear drivers",
        ));
    }

    if data.len() > config.max_mgmt_len {
        return Err(DissectError::corrupt(format!(
            "management frame of {} bytes",
            data.len()
        )));
    }

    if subtype == FrameSubType::Beacon {
        if info.source == Some(MSF_BCOM_SOURCE) {
            info.raise(Alert::new(
                AlertKind::MsfBcomSsid,
                "MSF-style beacon with a poisoned SSID, exploit attempt against Broadcom \
                 drivers",
            ));
        }
        if !header.address_1.is_broadcast() {
            info.set_corrupt(DissectError::corrupt("beacon not sent to broadcast"));
        }
    }

    info.header_offset = management_header_offset(subtype);
    let frame = parse_management_frame(header, body)?;

    if let Some(reason) = frame.reason_code() {
        if !reason.is_valid() {
            let (kind, name) = match &frame {
                ManagementFrame::Deauthentication(_) => {
                    (AlertKind::DeauthCodeInvalid, "Deauthentication")
                }
                _ => (AlertKind::DisconCodeInvalid, "Disassociation"),
            };
            info.raise(Alert::new(
                kind,
                format!("{name} with unknown reason code {}", reason.0),
            ));
        }
    }

    let capability = frame.capability_info();
    if subtype == FrameSubType::Beacon && capability.is_some_and(|cap| cap.is_adhoc()) {
        info.distribution = DistributionMode::Adhoc;
    }
    info.management = Some(frame);

    if !subtype.carries_ie_tags() {
        return Ok(());
    }

    let tag_data = data.get(info.header_offset..).unwrap_or_default();
    if !tag_data.is_empty() {
        info.ietag_csum = tag_checksum(tag_data);
    }

    let mut tags = TaggedParameters::default();
    let result = tags.decode(tag_data, config, &mut info.alerts);

    let advertises = matches!(subtype, FrameSubType::Beacon | FrameSubType::ProbeResponse);
    info.channel = tags.channel;
    info.cryptset |= tags.cryptset;
    if advertises && capability.is_some_and(|cap| cap.privacy()) && !tags.has_wpa() {
        info.cryptset |= Cryptset::WEP;
    }
    let needs_basics = advertises || subtype == FrameSubType::ProbeRequest;
    let incomplete = needs_basics && (tags.ssid.is_none() || !tags.saw_rates);
    info.tags = Some(tags);
    result?;

    if incomplete {
        info.set_corrupt(DissectError::corrupt("missing SSID or rates"));
    }
    Ok(())
}

fn dissect_data(data: &[u8], header: &MacHeader, info: &mut PacketInfo) -> Result<(), DissectError> {
    let frame_control = &header.frame_control;
    if INVALID_DATA_SUBTYPES.contains(&frame_control.subtype) {
        return Err(DissectError::corrupt(format!(
            "unknown data subtype {}",
            frame_control.subtype
        )));
    }

    let mut offset = header.len();
    if frame_control.frame_subtype.is_qos() {
        offset += 2;
    }
    DissectError::require(data, offset)?;
    info.header_offset = offset;

    let payload = &data[offset..];
    info.datasize = payload.len();
    if !frame_control.frame_subtype.carries_payload() || payload.is_empty() {
        return Ok(());
    }

    if frame_control.protected() {
        info.cryptset = protected_data_cipher(payload);
        trace!("Protected data frame, looks like {}", info.cryptset);
        return Ok(());
    }

    for signature in probe_signatures(payload) {
        let (kind, text) = match signature {
            ProbeSignature::Netstumbler322 => {
                (AlertKind::Netstumbler, "Detected Netstumbler 3.22 probe")
            }
            ProbeSignature::Netstumbler323 => {
                (AlertKind::Netstumbler, "Detected Netstumbler 3.23 probe")
            }
            ProbeSignature::Netstumbler330 => {
                (AlertKind::Netstumbler, "Detected Netstumbler 3.30 probe")
            }
            ProbeSignature::UnknownNetstumbler => (
                AlertKind::Netstumbler,
                "Detected Netstumbler probe, unknown version",
            ),
            ProbeSignature::LucentTest => (AlertKind::LucentTest, "Detected Lucent link test"),
        };
        info.raise(Alert::new(kind, text));
    }

    let Some((dot1x, rest)) = parse_dot1x(payload) else {
        return Ok(());
    };

    match dot1x.packet_type {
        DOT1X_TYPE_EAP if dot1x.version == 1 => match parse_eap(rest) {
            Ok(eap) => {
                info.cryptset |= eap_cryptset(&eap);
                info.wps_m3 = is_wps_m3(&eap);
                if let Some(identity) = eap.identity() {
                    debug!("EAP identity response: {identity}");
                }
                info.eap = Some(eap);
            }
            // The frame itself is still good, only the EAP body is skipped.
            Err(error) => trace!("Ignoring EAP body: {error}"),
        },
        DOT1X_TYPE_KEY => {
            let key = parse_eapol_key(&dot1x, rest)?;
            trace!(
                "EAPOL {} replay counter {}",
                key.message_type(),
                key.replay_counter
            );
            info.eapol = Some(key);
        }
        _ => {}
    }
    Ok(())
}

/// Cryptset bits for the EAP method of a packet.
fn eap_cryptset(eap: &EapPacket) -> Cryptset {
    let method = match eap.eap_type {
        Some(EAP_TYPE_LEAP) => Cryptset::LEAP,
        Some(EAP_TYPE_TLS) => Cryptset::TLS,
        Some(EAP_TYPE_TTLS) => Cryptset::TTLS,
        Some(EAP_TYPE_PEAP) => Cryptset::PEAP,
        _ => Cryptset::empty(),
    };
    Cryptset::EAP | method
}
