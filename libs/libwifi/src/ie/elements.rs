use byteorder::{ByteOrder, LittleEndian};

use crate::error::DissectError;

/// Turn attacker controlled bytes into something safe to print.
///
/// Stops at the first NUL, control characters are escaped as `\xNN`.
pub fn munge_to_printable(data: &[u8]) -> String {
    let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let text = String::from_utf8_lossy(&data[..end]);

    let mut munged = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            munged.push_str(&format!("\\x{:02x}", c as u32));
        } else {
            munged.push(c);
        }
    }
    munged
}

/// Tag 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ssid {
    pub raw: Vec<u8>,
    pub printable: String,
    /// Zero length, or only NUL bytes.
    pub cloaked: bool,
}

impl Ssid {
    pub fn parse(value: &[u8]) -> Self {
        let cloaked = value.iter().all(|b| *b == 0);
        Ssid {
            raw: value.to_vec(),
            printable: if cloaked {
                String::new()
            } else {
                munge_to_printable(value)
            },
            cloaked,
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// One entry of tag 1 or tag 50.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportedRate {
    pub mandatory: bool,
    /// Mbit/s
    pub rate: f32,
}

pub fn parse_rates(input: &[u8]) -> impl Iterator<Item = SupportedRate> + '_ {
    input.iter().map(|&data| SupportedRate {
        mandatory: (data & 0x80) != 0,
        rate: (data & 0x7f) as f32 * 0.5,
    })
}

/// Tag 7, 802.11d country information.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Country {
    pub code: String,
    pub ranges: Vec<CountryRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountryRange {
    pub first_channel: u8,
    pub num_channels: u8,
    pub max_power: u8,
}

impl Country {
    /// Only called for tags longer than 6 bytes, shorter ones are common garbage.
    pub fn parse(value: &[u8]) -> Self {
        let code = munge_to_printable(&value[..3.min(value.len())]);
        let ranges = value
            .get(3..)
            .unwrap_or_default()
            .chunks_exact(3)
            .map(|range| CountryRange {
                first_channel: range[0],
                num_channels: range[1],
                max_power: range[2],
            })
            .collect();
        Country { code, ranges }
    }
}

/// Tag 11, QBSS load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QbssLoad {
    pub station_count: u16,
    pub channel_utilization: u8,
    pub available_capacity: u16,
}

impl QbssLoad {
    pub fn parse(value: &[u8]) -> Result<Self, DissectError> {
        if value.len() != 5 {
            return Err(DissectError::corrupt(format!(
                "QBSS tag length {}, expected 5",
                value.len()
            )));
        }
        Ok(QbssLoad {
            station_count: LittleEndian::read_u16(&value[0..2]),
            channel_utilization: value[2],
            available_capacity: LittleEndian::read_u16(&value[3..5]),
        })
    }
}

/// Tag 45, HT capabilities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HtCapabilities {
    pub info: u16,
    pub ampdu_parameters: u8,
    pub mcs_set: [u8; 16],
    pub extended_capabilities: u16,
    pub txbf_capabilities: u32,
    pub asel_capabilities: u8,
}

impl HtCapabilities {
    pub const LENGTH: usize = 26;

    pub fn parse(value: &[u8]) -> Result<Self, DissectError> {
        if value.len() != Self::LENGTH {
            return Err(DissectError::corrupt(format!(
                "HT capabilities length {}, expected {}",
                value.len(),
                Self::LENGTH
            )));
        }
        let mut mcs_set = [0u8; 16];
        mcs_set.copy_from_slice(&value[3..19]);
        Ok(HtCapabilities {
            info: LittleEndian::read_u16(&value[0..2]),
            ampdu_parameters: value[2],
            mcs_set,
            extended_capabilities: LittleEndian::read_u16(&value[19..21]),
            txbf_capabilities: LittleEndian::read_u32(&value[21..25]),
            asel_capabilities: value[25],
        })
    }

    pub fn channel_width_40(&self) -> bool {
        self.info & 0x0002 != 0
    }

    pub fn greenfield(&self) -> bool {
        self.info & 0x0010 != 0
    }

    pub fn short_gi_20(&self) -> bool {
        self.info & 0x0020 != 0
    }

    pub fn short_gi_40(&self) -> bool {
        self.info & 0x0040 != 0
    }

    /// Number of spatial streams the RX MCS bitmap advertises.
    pub fn spatial_streams(&self) -> usize {
        self.mcs_set[..4].iter().filter(|b| **b != 0).count()
    }
}

/// Tag 61, HT operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HtOperation {
    pub primary_channel: u8,
    /// 0 none, 1 above, 3 below.
    pub secondary_channel_offset: u8,
    pub any_channel_width: bool,
}

impl HtOperation {
    pub fn parse(value: &[u8]) -> Option<Self> {
        let primary_channel = *value.first()?;
        let info = value.get(1).copied().unwrap_or(0);
        Some(HtOperation {
            primary_channel,
            secondary_channel_offset: info & 0x03,
            any_channel_width: info & 0x04 != 0,
        })
    }
}

/// Tag 54, fast BSS transition mobility domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobilityDomain {
    pub mdid: u16,
    pub ft_over_ds: bool,
    pub resource_request: bool,
}

impl MobilityDomain {
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < 3 {
            return None;
        }
        Some(MobilityDomain {
            mdid: LittleEndian::read_u16(&value[0..2]),
            ft_over_ds: value[2] & 0x01 != 0,
            resource_request: value[2] & 0x02 != 0,
        })
    }
}

/// Tag 113, mesh configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshConfiguration {
    pub path_selection_protocol: u8,
    pub path_selection_metric: u8,
    pub congestion_control: u8,
    pub synchronization: u8,
    pub authentication: u8,
    pub connected_to_gate: bool,
    pub peerings: u8,
    pub accepting_peerings: bool,
}

impl MeshConfiguration {
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < 7 {
            return None;
        }
        Some(MeshConfiguration {
            path_selection_protocol: value[0],
            path_selection_metric: value[1],
            congestion_control: value[2],
            synchronization: value[3],
            authentication: value[4],
            connected_to_gate: value[5] & 0x01 != 0,
            peerings: (value[5] >> 1) & 0x3f,
            accepting_peerings: value[6] & 0x01 != 0,
        })
    }
}

/// Tag 127, extended capabilities. Up to 16 octets of flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedCapabilities {
    pub octets: Vec<u8>,
}

impl ExtendedCapabilities {
    pub const MAX_LENGTH: usize = 16;

    pub fn parse(value: &[u8]) -> Result<Self, DissectError> {
        if value.is_empty() || value.len() > Self::MAX_LENGTH {
            return Err(DissectError::corrupt(format!(
                "Extended capabilities length {}",
                value.len()
            )));
        }
        Ok(ExtendedCapabilities {
            octets: value.to_vec(),
        })
    }

    fn bit(&self, octet: usize, mask: u8) -> bool {
        self.octets.get(octet).is_some_and(|b| b & mask != 0)
    }

    pub fn wnm_sleep_mode(&self) -> bool {
        self.bit(2, 0x02)
    }

    pub fn bss_transition(&self) -> bool {
        self.bit(2, 0x08)
    }

    pub fn interworking(&self) -> bool {
        self.bit(3, 0x80)
    }

    pub fn tdls_supported(&self) -> bool {
        self.bit(4, 0x20)
    }

    pub fn tdls_prohibited(&self) -> bool {
        self.bit(4, 0x40)
    }
}

/// Tag 133, the Cisco CCX1 element. The AP name starts at offset 10.
pub fn parse_ccx1_name(value: &[u8]) -> Option<String> {
    if value.len() < 11 {
        return None;
    }
    let name = munge_to_printable(&value[10..]);
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Tag 191, VHT capabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VhtCapabilities {
    pub info: u32,
    pub rx_mcs_map: u16,
    pub rx_highest_rate: u16,
    pub tx_mcs_map: u16,
    pub tx_highest_rate: u16,
}

impl VhtCapabilities {
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < 12 {
            return None;
        }
        Some(VhtCapabilities {
            info: LittleEndian::read_u32(&value[0..4]),
            rx_mcs_map: LittleEndian::read_u16(&value[4..6]),
            rx_highest_rate: LittleEndian::read_u16(&value[6..8]) & 0x1fff,
            tx_mcs_map: LittleEndian::read_u16(&value[8..10]),
            tx_highest_rate: LittleEndian::read_u16(&value[10..12]) & 0x1fff,
        })
    }

    /// 0: 80MHz only, 1: 160MHz, 2: 160 and 80+80MHz.
    pub fn supported_channel_width(&self) -> u8 {
        ((self.info >> 2) & 0x03) as u8
    }

    pub fn short_gi_80(&self) -> bool {
        self.info & 0x20 != 0
    }

    pub fn short_gi_160(&self) -> bool {
        self.info & 0x40 != 0
    }

    /// Every stream uses 2 bits of the MCS map, 3 means unsupported.
    pub fn spatial_streams(&self) -> usize {
        (0..8)
            .filter(|stream| (self.rx_mcs_map >> (stream * 2)) & 0x03 != 0x03)
            .count()
    }
}

/// Tag 192, VHT operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VhtOperation {
    pub channel_width: u8,
    pub center_segment_0: u8,
    pub center_segment_1: u8,
}

impl VhtOperation {
    pub fn parse(value: &[u8]) -> Option<Self> {
        if value.len() < 3 {
            return None;
        }
        Some(VhtOperation {
            channel_width: value[0],
            center_segment_0: value[1],
            center_segment_1: value[2],
        })
    }

    /// Operating width in MHz. Width 0 defers to the HT operation element.
    pub fn width_mhz(&self) -> Option<u16> {
        match self.channel_width {
            1 if self.center_segment_1 != 0 => Some(160),
            1 => Some(80),
            2 => Some(160),
            3 => Some(160),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_munge() {
        assert_eq!(munge_to_printable(b"Test\x01Net\0junk"), "Test\\x01Net");
        assert_eq!(munge_to_printable(b"caf\xc3\xa9"), "caf\u{e9}");
    }

    #[test]
    fn test_cloaked_ssid() {
        assert!(Ssid::parse(&[]).cloaked);
        let blank = Ssid::parse(&[0, 0, 0, 0]);
        assert!(blank.cloaked);
        assert_eq!(blank.len(), 4);
        assert!(!Ssid::parse(b"TestNet").cloaked);
    }

    #[test]
    fn test_rates() {
        let rates: Vec<SupportedRate> = parse_rates(&[0x82, 0x84, 0x0b, 0x6c]).collect();
        assert_eq!(rates[0].rate, 1.0);
        assert!(rates[0].mandatory);
        assert_eq!(rates[2].rate, 5.5);
        assert_eq!(rates[3].rate, 54.0);
    }

    #[test]
    fn test_country() {
        let country = Country::parse(b"US \x01\x0b\x1e\x24\x04\x11");
        assert_eq!(country.code, "US ");
        assert_eq!(country.ranges.len(), 2);
        assert_eq!(
            country.ranges[0],
            CountryRange {
                first_channel: 1,
                num_channels: 11,
                max_power: 30
            }
        );
    }

    #[test]
    fn test_qbss() {
        let qbss = QbssLoad::parse(&[0x05, 0x00, 0x2a, 0x10, 0x27]).unwrap();
        assert_eq!(qbss.station_count, 5);
        assert_eq!(qbss.channel_utilization, 42);
        assert_eq!(qbss.available_capacity, 10000);
        assert!(QbssLoad::parse(&[0x05, 0x00, 0x2a]).is_err());
    }

    #[test]
    fn test_ht_capabilities_length() {
        assert!(HtCapabilities::parse(&[0u8; 25]).is_err());
        let mut value = [0u8; 26];
        value[0] = 0x62;
        value[3] = 0xff;
        value[4] = 0xff;
        let caps = HtCapabilities::parse(&value).unwrap();
        assert!(caps.channel_width_40());
        assert!(caps.short_gi_20());
        assert!(caps.short_gi_40());
        assert_eq!(caps.spatial_streams(), 2);
    }

    #[test]
    fn test_extended_capabilities_bounds() {
        assert!(ExtendedCapabilities::parse(&[]).is_err());
        assert!(ExtendedCapabilities::parse(&[0u8; 17]).is_err());
        let caps = ExtendedCapabilities::parse(&[0x04, 0x00, 0x08, 0x80]).unwrap();
        assert!(caps.bss_transition());
        assert!(caps.interworking());
        assert!(!caps.tdls_supported());
    }

    #[test]
    fn test_ccx1_name() {
        let mut value = vec![0u8; 10];
        value.extend_from_slice(b"lobby-ap\0\0");
        assert_eq!(parse_ccx1_name(&value), Some("lobby-ap".to_string()));
        assert_eq!(parse_ccx1_name(&[0u8; 10]), None);
    }

    #[test]
    fn test_vht() {
        let caps = VhtCapabilities::parse(&[
            0x60, 0x00, 0x00, 0x00, 0xfa, 0xff, 0x00, 0x00, 0xfa, 0xff, 0x00, 0x00,
        ])
        .unwrap();
        assert!(caps.short_gi_80());
        assert_eq!(caps.spatial_streams(), 2);

        let op = VhtOperation::parse(&[0x01, 42, 0]).unwrap();
        assert_eq!(op.width_mhz(), Some(80));
    }
}
