use crate::alert::Alert;
use crate::crypt::Cryptset;
use crate::error::DissectError;
use crate::frame::components::{FrameControl, MacAddress};
use crate::frame::{EapPacket, EapolKey, ManagementFrame};
use crate::frame_types::{DistributionMode, FrameSubType, FrameType};
use crate::ie::TaggedParameters;

/// Everything the dissector learned about one frame.
///
/// Created fresh for every packet and owned by whoever called [crate::dissect_frame].
/// Nothing in here borrows the packet buffer, so the record can be moved into a
/// device list or dropped once the pipeline is done with it.
#[derive(Clone, Debug, Default)]
pub struct PacketInfo {
    pub frame_control: Option<FrameControl>,
    pub frame_type: FrameType,
    pub subtype: FrameSubType,
    pub distribution: DistributionMode,

    pub bssid: Option<MacAddress>,
    pub source: Option<MacAddress>,
    pub dest: Option<MacAddress>,
    pub transmitter: Option<MacAddress>,
    pub receiver: Option<MacAddress>,

    pub sequence_number: u16,
    pub fragment_number: u8,

    /// Offset of the IE tags (management) or the payload (data).
    pub header_offset: usize,
    /// CRC-32 over the raw IE tag range, 0 if there were no tags.
    pub ietag_csum: u32,
    pub cryptset: Cryptset,

    pub corrupt: bool,
    pub fragmented: bool,
    pub retry: bool,

    pub management: Option<ManagementFrame>,
    pub tags: Option<TaggedParameters>,
    /// Channel from the DS parameter tag.
    pub channel: Option<u8>,

    pub eapol: Option<EapolKey>,
    pub eap: Option<EapPacket>,
    pub wps_m3: bool,

    pub alerts: Vec<Alert>,
    /// Size of the frame body following the header.
    pub datasize: usize,
    /// The hard error that made this packet corrupt, if any.
    pub error: Option<DissectError>,
}

impl PacketInfo {
    pub fn is_management(&self) -> bool {
        self.frame_type == FrameType::Management
    }

    pub fn is_data(&self) -> bool {
        self.frame_type == FrameType::Data
    }

    pub fn is_beacon(&self) -> bool {
        self.subtype == FrameSubType::Beacon
    }

    pub fn ssid(&self) -> Option<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.ssid.as_ref())
            .map(|ssid| ssid.printable.as_str())
    }

    /// Mark the packet corrupt, keeping the first error seen.
    pub fn set_corrupt(&mut self, error: DissectError) {
        self.corrupt = true;
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(crate) fn raise(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// Stamp the resolved addresses and channel onto every collected alert.
    pub(crate) fn address_alerts(&mut self) {
        let (bssid, source, dest, channel) = (self.bssid, self.source, self.dest, self.channel);
        for alert in self.alerts.iter_mut() {
            *alert = alert.clone().with_addresses(bssid, source, dest);
            alert.channel = alert.channel.or(channel);
        }
    }
}
