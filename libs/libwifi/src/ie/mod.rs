//! Information element (IE) tag decoding.
//!
//! Management frame bodies end in a stream of `(number: u8, length: u8, value)` records.
//! [TaggedParameters::decode] walks that stream once, hands every known tag number to
//! its sub decoder and keeps a checksum per tag identity.
//!
//! Tags whose malformation makes the whole frame untrustworthy (SSID, channel, QBSS,
//! HT capabilities, RSN, extended capabilities, WPA) stop the walk with a
//! [DissectError]. Everything else is cosmetic: a failure only leaves the field unset.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crc::{Crc, Digest, CRC_32_ISO_HDLC};
use log::trace;

use crate::alert::{Alert, AlertKind};
use crate::config::DissectorConfig;
use crate::crypt::{self, Cryptset};
use crate::error::DissectError;

pub mod droneid;
pub mod elements;
pub mod rsn;
pub mod vendor;
pub mod wps;

pub use elements::*;
pub use rsn::{RsnInformation, WpaInformation};
pub use vendor::VendorElement;

/// Longest legal SSID.
pub const MAX_SSID_LEN: usize = 32;

/// One raw `(number, length, value)` record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawTag<'a> {
    pub number: u8,
    pub value: &'a [u8],
    /// The record including its two header bytes.
    pub raw: &'a [u8],
}

impl<'a> RawTag<'a> {
    /// Vendor tags carry a 3 byte OUI and a 1 byte type in front of their payload.
    pub fn is_vendor(&self) -> bool {
        matches!(self.number, 150 | 221)
    }

    pub fn key(&self) -> TagKey {
        if self.is_vendor() {
            TagKey {
                number: self.number,
                oui: self.value.get(..3).map(|oui| [oui[0], oui[1], oui[2]]),
                subtype: self.value.get(3).copied(),
            }
        } else {
            TagKey::number(self.number)
        }
    }
}

/// Single pass iterator over a tag stream.
///
/// A record running past the end of the buffer yields one `Err` and ends the walk.
pub struct TagWalker<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> TagWalker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        TagWalker { data, done: false }
    }
}

impl<'a> Iterator for TagWalker<'a> {
    type Item = Result<RawTag<'a>, DissectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.data.is_empty() {
            return None;
        }

        if self.data.len() < 2 {
            self.done = true;
            return Some(Err(DissectError::Truncated {
                needed: 2,
                available: self.data.len(),
            }));
        }

        let number = self.data[0];
        let length = self.data[1] as usize;
        if self.data.len() < 2 + length {
            self.done = true;
            return Some(Err(DissectError::Truncated {
                needed: 2 + length,
                available: self.data.len(),
            }));
        }

        let (raw, rest) = self.data.split_at(2 + length);
        self.data = rest;
        Some(Ok(RawTag {
            number,
            value: &raw[2..],
            raw,
        }))
    }
}

/// Identity of a tag for checksums and fingerprints.
///
/// Plain tags are identified by their number, vendor tags additionally by OUI and
/// OUI type. Written as `48` or `221-0050f2-4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagKey {
    pub number: u8,
    pub oui: Option<[u8; 3]>,
    pub subtype: Option<u8>,
}

impl TagKey {
    pub fn number(number: u8) -> Self {
        TagKey {
            number,
            oui: None,
            subtype: None,
        }
    }

    pub fn vendor(number: u8, oui: [u8; 3], subtype: u8) -> Self {
        TagKey {
            number,
            oui: Some(oui),
            subtype: Some(subtype),
        }
    }

    /// Bytes fed into the fingerprint hash.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.number];
        if let Some(oui) = self.oui {
            bytes.extend_from_slice(&oui);
        }
        if let Some(subtype) = self.subtype {
            bytes.push(subtype);
        }
        bytes
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        if let Some(oui) = self.oui {
            write!(f, "-{:02x}{:02x}{:02x}", oui[0], oui[1], oui[2])?;
        }
        if let Some(subtype) = self.subtype {
            write!(f, "-{subtype}")?;
        }
        Ok(())
    }
}

impl FromStr for TagKey {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.trim().split('-');
        let number = parts
            .next()
            .unwrap_or_default()
            .parse::<u8>()
            .map_err(|e| format!("Invalid tag number in '{input}': {e}"))?;

        let oui = match parts.next() {
            Some(oui) => {
                let value = u32::from_str_radix(oui, 16)
                    .ok()
                    .filter(|_| oui.len() == 6)
                    .ok_or_else(|| format!("Invalid OUI in '{input}'"))?;
                let bytes = value.to_be_bytes();
                Some([bytes[1], bytes[2], bytes[3]])
            }
            None => None,
        };

        let subtype = match parts.next() {
            Some(subtype) => Some(
                subtype
                    .parse::<u8>()
                    .map_err(|e| format!("Invalid OUI type in '{input}': {e}"))?,
            ),
            None => None,
        };

        if parts.next().is_some() {
            return Err(format!("Too many fields in tag key '{input}'"));
        }

        Ok(TagKey {
            number,
            oui,
            subtype,
        })
    }
}

static TAG_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32 over a tag range.
pub fn tag_checksum(data: &[u8]) -> u32 {
    TAG_CRC.checksum(data)
}

/// Everything we learned from one IE tag stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaggedParameters {
    pub ssid: Option<Ssid>,
    /// Rates from tags 1 and 50, in Mbit/s.
    pub rates: Vec<SupportedRate>,
    pub max_rate: f32,
    pub channel: Option<u8>,
    pub country: Option<Country>,
    pub qbss: Option<QbssLoad>,
    pub ht_capabilities: Option<HtCapabilities>,
    pub ht_operation: Option<HtOperation>,
    pub mobility_domain: Option<MobilityDomain>,
    pub mesh_id: Option<String>,
    pub mesh_configuration: Option<MeshConfiguration>,
    pub extended_capabilities: Option<ExtendedCapabilities>,
    pub ccx_name: Option<String>,
    pub vht_capabilities: Option<VhtCapabilities>,
    pub vht_operation: Option<VhtOperation>,
    pub rsn: Option<RsnInformation>,
    pub wpa: Option<WpaInformation>,
    pub vendor: Vec<VendorElement>,
    /// Tags without a decoder, kept as is.
    pub unknown: Vec<(u8, Vec<u8>)>,

    /// Encryption advertised by the RSN, WPA and WPS elements.
    pub cryptset: Cryptset,
    /// CRC-32 over the raw bytes of every tag, per identity.
    pub tag_checksums: HashMap<TagKey, u32>,
    /// Hash over the checksums of the configured fingerprint tags.
    pub fingerprint: u32,
    pub saw_rates: bool,
}

impl TaggedParameters {
    /// Walk a tag stream and decode everything in it.
    ///
    /// On a structural error the walk stops and the error is returned. Whatever was
    /// decoded up to that point stays in `self`. Alerts are pushed to `alerts`.
    pub fn decode(
        &mut self,
        data: &[u8],
        config: &DissectorConfig,
        alerts: &mut Vec<Alert>,
    ) -> Result<(), DissectError> {
        let mut checksums: HashMap<TagKey, Digest<'static, u32>> = HashMap::new();
        let mut result = Ok(());

        for tag in TagWalker::new(data) {
            let tag = match tag {
                Ok(tag) => tag,
                Err(error) => {
                    if !config.weak_dissect {
                        result = Err(error);
                    }
                    break;
                }
            };

            checksums
                .entry(tag.key())
                .or_insert_with(|| TAG_CRC.digest())
                .update(tag.raw);

            if let Err(error) = self.decode_tag(&tag, alerts) {
                result = Err(error);
                break;
            }
        }

        self.tag_checksums = checksums
            .into_iter()
            .map(|(key, digest)| (key, digest.finalize()))
            .collect();
        self.fingerprint = self.fingerprint(&config.fingerprint_tags);
        self.resolve_cryptset();

        result
    }

    fn decode_tag(&mut self, tag: &RawTag, alerts: &mut Vec<Alert>) -> Result<(), DissectError> {
        let value = tag.value;
        match tag.number {
            0 => {
                if self.ssid.is_some() {
                    return Ok(());
                }
                if value.len() > MAX_SSID_LEN {
                    alerts.push(Alert::new(
                        AlertKind::LongSsid,
                        format!(
                            "Illegal SSID ({} bytes, greater than {MAX_SSID_LEN}) detected, \
                             this likely indicates an exploit attempt against a client",
                            value.len()
                        ),
                    ));
                    return Err(DissectError::corrupt("SSID over 32 bytes"));
                }
                self.ssid = Some(Ssid::parse(value));
            }
            1 | 50 => {
                if value.len() == 75 && value.starts_with(&[0xeb, 0x49]) {
                    alerts.push(Alert::new(
                        AlertKind::MsfDlinkRate,
                        "MSF-style poisoned rate field in beacon, exploit attempt against \
                         D-Link drivers",
                    ));
                    return Err(DissectError::corrupt("poisoned rate tag"));
                }
                self.saw_rates = true;
                for rate in parse_rates(value) {
                    if rate.rate > self.max_rate {
                        self.max_rate = rate.rate;
                    }
                    self.rates.push(rate);
                }
            }
            3 => {
                if value.len() != 1 {
                    alerts.push(Alert::new(
                        AlertKind::MalformMgmt,
                        format!(
                            "Invalid DS parameter (channel) tag length {}, expected 1",
                            value.len()
                        ),
                    ));
                    return Err(DissectError::corrupt("channel tag length"));
                }
                self.channel = Some(value[0]);
            }
            7 => {
                if value.len() > 6 {
                    self.country = Some(Country::parse(value));
                }
            }
            11 => self.qbss = Some(QbssLoad::parse(value)?),
            45 => self.ht_capabilities = Some(HtCapabilities::parse(value)?),
            48 => {
                let rsn = rsn::parse_rsn_information(value)?;
                self.rsn = Some(rsn);
            }
            54 => self.mobility_domain = MobilityDomain::parse(value),
            61 => self.ht_operation = HtOperation::parse(value),
            113 => self.mesh_configuration = MeshConfiguration::parse(value),
            114 => self.mesh_id = Some(munge_to_printable(value)),
            127 => self.extended_capabilities = Some(ExtendedCapabilities::parse(value)?),
            133 => self.ccx_name = parse_ccx1_name(value),
            191 => self.vht_capabilities = VhtCapabilities::parse(value),
            192 => self.vht_operation = VhtOperation::parse(value),
            150 | 221 => self.decode_vendor(tag)?,
            number => self.unknown.push((number, value.to_vec())),
        }
        Ok(())
    }

    fn decode_vendor(&mut self, tag: &RawTag) -> Result<(), DissectError> {
        if tag.value.len() < 3 {
            if tag.number == 221 {
                return Err(DissectError::corrupt("vendor tag shorter than its OUI"));
            }
            return Ok(());
        }

        match VendorElement::parse(tag.value) {
            Ok(VendorElement::Wpa(wpa)) => {
                if self.wpa.is_none() {
                    self.wpa = Some(wpa);
                }
            }
            Ok(element) => self.vendor.push(element),
            Err(error) => {
                // WPA feeds the cryptset like RSN does. The other vendor decoders are
                // cosmetic and fall back to opaque bytes.
                if vendor::is_wpa(tag.value) {
                    return Err(error);
                }
                trace!("Keeping vendor element {} opaque: {error}", tag.key());
                self.vendor.push(VendorElement::opaque(tag.value));
            }
        }
        Ok(())
    }

    /// Hash the checksums of `tags`, in the given order. Missing tags are skipped.
    pub fn fingerprint(&self, tags: &[TagKey]) -> u32 {
        let mut digest = TAG_CRC.digest();
        for key in tags {
            if let Some(checksum) = self.tag_checksums.get(key) {
                digest.update(&key.to_bytes());
                digest.update(&checksum.to_le_bytes());
            }
        }
        digest.finalize()
    }

    fn resolve_cryptset(&mut self) {
        let mut set = Cryptset::empty();
        if let Some(rsn) = &self.rsn {
            set |= rsn.cryptset();
        }
        if let Some(wpa) = &self.wpa {
            set |= wpa.cryptset();
        }
        if self.wps().is_some_and(|wps| wps.is_configured()) {
            set |= Cryptset::WPS;
        }
        self.cryptset = set;
    }

    /// True if an RSN or WPA element was present.
    pub fn has_wpa(&self) -> bool {
        self.rsn.is_some() || self.wpa.is_some()
    }

    pub fn wps(&self) -> Option<&wps::WpsInformation> {
        self.vendor.iter().find_map(|element| match element {
            VendorElement::Wps(wps) => Some(wps),
            _ => None,
        })
    }

    pub fn droneid(&self) -> Option<&droneid::DroneId> {
        self.vendor.iter().find_map(|element| match element {
            VendorElement::DroneId(drone) => Some(drone),
            _ => None,
        })
    }

    /// PMKIDs carried as RSN key data elements, e.g. in EAPOL key data.
    pub fn pmkids(&self) -> Vec<[u8; 16]> {
        let mut pmkids: Vec<[u8; 16]> = self
            .vendor
            .iter()
            .filter_map(|element| match element {
                VendorElement::RsnPmkid(pmkid) => Some(*pmkid),
                _ => None,
            })
            .collect();
        if let Some(rsn) = &self.rsn {
            pmkids.extend(rsn.pmkids.iter().copied());
        }
        pmkids
    }

    /// Checksum of a single tag identity, if it was present.
    pub fn checksum(&self, key: &TagKey) -> Option<u32> {
        self.tag_checksums.get(key).copied()
    }

    /// The union of the RSN and WPA derived bits, without the WPS bit.
    pub fn wpa_cryptset(&self) -> Cryptset {
        self.cryptset.difference(Cryptset::WPS)
    }
}

/// Decode the tag stream found in EAPOL key data.
///
/// Key data reuses the tag format, but is usually encrypted. Anything we can't walk is
/// ignored.
pub fn decode_key_data(data: &[u8]) -> TaggedParameters {
    let mut tags = TaggedParameters::default();
    let mut alerts = Vec::new();
    let config = DissectorConfig {
        weak_dissect: true,
        ..Default::default()
    };
    if let Err(error) = tags.decode(data, &config, &mut alerts) {
        trace!("Key data is not a clean tag stream: {error}");
    }
    tags
}

/// Cryptset helpers for the decoded security elements.
impl RsnInformation {
    pub fn cryptset(&self) -> Cryptset {
        let mut set = crypt::resolve_rsn(
            &self.group_cipher,
            &self.pairwise_ciphers,
            &self.akm_suites,
            self.group_management_cipher.as_ref(),
        );
        if self.mfp_capable {
            set |= Cryptset::MFP_CAPABLE;
        }
        if self.mfp_required {
            set |= Cryptset::MFP_REQUIRED;
        }
        set
    }
}

impl WpaInformation {
    pub fn cryptset(&self) -> Cryptset {
        crypt::resolve_wpa(&self.group_cipher, &self.pairwise_ciphers, &self.akm_suites)
    }
}
