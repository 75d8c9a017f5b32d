use crate::crypt::{MSFT_OUI, RSN_OUI};
use crate::error::DissectError;
use crate::frame::components::MacAddress;
use crate::ie::droneid::{self, DroneId, DJI_OUI};
use crate::ie::elements::munge_to_printable;
use crate::ie::rsn::{self, WpaInformation};
use crate::ie::wps::{self, WpsInformation};

pub const CISCO_OUI: [u8; 3] = [0x00, 0x40, 0x96];
pub const WFA_OUI: [u8; 3] = [0x50, 0x6f, 0x9a];
pub const ARUBA_OUI: [u8; 3] = [0x00, 0x0b, 0x86];
pub const MERAKI_OUI: [u8; 3] = [0x00, 0x18, 0x0a];
pub const RUCKUS_OUI: [u8; 3] = [0x00, 0x13, 0x92];
pub const UBIQUITI_OUI: [u8; 3] = [0x00, 0x27, 0x22];

const MSFT_WPA: u8 = 0x01;
const MSFT_WMM: u8 = 0x02;
const MSFT_WPS: u8 = 0x04;

const CISCO_AP_NAME: u8 = 0x0b;
const CISCO_TX_POWER: u8 = 0x14;
const CISCO_MFP: u8 = 0x2c;

const WFA_P2P: u8 = 0x09;
const WFA_HOTSPOT20: u8 = 0x10;
const WFA_OWE_TRANSITION: u8 = 0x1c;

const RSN_KDE_PMKID: u8 = 0x04;

/// A decoded vendor specific element (tags 150 and 221).
#[derive(Clone, Debug, PartialEq)]
pub enum VendorElement {
    Wpa(WpaInformation),
    Wmm { version: u8, qos_info: u8 },
    Wps(WpsInformation),
    CiscoTxPower(u8),
    CiscoApName(String),
    CiscoMfp,
    P2p(Vec<u8>),
    Hotspot20 { release: u8 },
    OweTransition { bssid: MacAddress, ssid: String },
    RsnPmkid([u8; 16]),
    DroneId(DroneId),
    ApName { vendor: &'static str, name: String },
    Opaque { oui: [u8; 3], subtype: Option<u8>, data: Vec<u8> },
}

fn split_oui(value: &[u8]) -> Result<([u8; 3], &[u8]), DissectError> {
    DissectError::require(value, 3)?;
    Ok(([value[0], value[1], value[2]], &value[3..]))
}

/// True if the element claims to be the Microsoft WPA element.
pub fn is_wpa(value: &[u8]) -> bool {
    value.len() >= 4 && value[..3] == MSFT_OUI && value[3] == MSFT_WPA
}

impl VendorElement {
    /// Dispatch on OUI and OUI type. `value` starts with the OUI.
    pub fn parse(value: &[u8]) -> Result<VendorElement, DissectError> {
        let (oui, body) = split_oui(value)?;
        let Some((&subtype, rest)) = body.split_first() else {
            return Ok(VendorElement::opaque(value));
        };

        let element = match (oui, subtype) {
            (MSFT_OUI, MSFT_WPA) => VendorElement::Wpa(rsn::parse_wpa_information(rest)?),
            (MSFT_OUI, MSFT_WMM) => {
                // OUI subtype, version, QoS info
                DissectError::require(rest, 3)?;
                VendorElement::Wmm {
                    version: rest[1],
                    qos_info: rest[2],
                }
            }
            (MSFT_OUI, MSFT_WPS) => VendorElement::Wps(wps::parse_wps_information(rest)?),
            (CISCO_OUI, CISCO_TX_POWER) => {
                DissectError::require(rest, 1)?;
                VendorElement::CiscoTxPower(rest[0])
            }
            (CISCO_OUI, CISCO_AP_NAME) => {
                // Skip the sub type and flags
                DissectError::require(rest, 2)?;
                VendorElement::CiscoApName(munge_to_printable(&rest[2..]))
            }
            (CISCO_OUI, CISCO_MFP) => VendorElement::CiscoMfp,
            (WFA_OUI, WFA_P2P) => VendorElement::P2p(rest.to_vec()),
            (WFA_OUI, WFA_HOTSPOT20) => {
                DissectError::require(rest, 1)?;
                VendorElement::Hotspot20 {
                    release: (rest[0] >> 4) + 1,
                }
            }
            (WFA_OUI, WFA_OWE_TRANSITION) => {
                DissectError::require(rest, 7)?;
                let ssid_len = rest[6] as usize;
                DissectError::require(&rest[7..], ssid_len)?;
                let bssid = MacAddress::from_slice(&rest[..6])
                    .ok_or_else(|| DissectError::corrupt("OWE transition BSSID"))?;
                VendorElement::OweTransition {
                    bssid,
                    ssid: munge_to_printable(&rest[7..7 + ssid_len]),
                }
            }
            (RSN_OUI, RSN_KDE_PMKID) => {
                DissectError::require(rest, 16)?;
                let mut pmkid = [0u8; 16];
                pmkid.copy_from_slice(&rest[..16]);
                VendorElement::RsnPmkid(pmkid)
            }
            (DJI_OUI, _) => VendorElement::DroneId(droneid::parse_droneid(body)?),
            (ARUBA_OUI, 0x01) => {
                // Sub type 3 carries the AP name after one more header byte.
                DissectError::require(rest, 2)?;
                if rest[0] != 0x03 {
                    return Ok(VendorElement::opaque(value));
                }
                VendorElement::ApName {
                    vendor: "Aruba",
                    name: munge_to_printable(&rest[2..]),
                }
            }
            (MERAKI_OUI, _) => VendorElement::ApName {
                vendor: "Meraki",
                name: munge_to_printable(rest),
            },
            (RUCKUS_OUI, _) => VendorElement::ApName {
                vendor: "Ruckus",
                name: munge_to_printable(rest),
            },
            (UBIQUITI_OUI, _) => VendorElement::ApName {
                vendor: "Ubiquiti",
                name: munge_to_printable(rest),
            },
            _ => VendorElement::opaque(value),
        };

        Ok(element)
    }

    /// Keep an element we don't (or can't) decode.
    pub fn opaque(value: &[u8]) -> VendorElement {
        let mut oui = [0u8; 3];
        let copied = value.len().min(3);
        oui[..copied].copy_from_slice(&value[..copied]);
        VendorElement::Opaque {
            oui,
            subtype: value.get(3).copied(),
            data: value.get(4..).unwrap_or_default().to_vec(),
        }
    }

    /// AP name advertised by any vendor.
    pub fn ap_name(&self) -> Option<&str> {
        match self {
            VendorElement::CiscoApName(name) | VendorElement::ApName { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmm() {
        let value = [0x00, 0x50, 0xf2, 0x02, 0x00, 0x01, 0x80];
        assert_eq!(
            VendorElement::parse(&value).unwrap(),
            VendorElement::Wmm {
                version: 1,
                qos_info: 0x80
            }
        );
    }

    #[test]
    fn test_truncated_wpa_is_error() {
        let value = [0x00, 0x50, 0xf2, 0x01, 0x01];
        assert!(is_wpa(&value));
        assert!(VendorElement::parse(&value).is_err());
    }

    #[test]
    fn test_owe_transition() {
        let value = [
            0x50, 0x6f, 0x9a, 0x1c, 0x02, 0x11, 0x22, 0x33, 0x44, 0x55, 0x03, b'o', b'w', b'e',
        ];
        let VendorElement::OweTransition { bssid, ssid } = VendorElement::parse(&value).unwrap()
        else {
            panic!("expected OWE transition");
        };
        assert_eq!(bssid.to_string(), "02:11:22:33:44:55");
        assert_eq!(ssid, "owe");
    }

    #[test]
    fn test_ap_names() {
        let meraki = [0x00, 0x18, 0x0a, 0x01, b'l', b'o', b'b', b'b', b'y'];
        assert_eq!(VendorElement::parse(&meraki).unwrap().ap_name(), Some("lobby"));

        let cisco = [0x00, 0x40, 0x96, 0x0b, 0x00, 0x00, b'a', b'p', b'1'];
        assert_eq!(VendorElement::parse(&cisco).unwrap().ap_name(), Some("ap1"));
    }

    #[test]
    fn test_unknown_is_opaque() {
        let value = [0x00, 0x11, 0x22, 0x07, 0xaa, 0xbb];
        assert_eq!(
            VendorElement::parse(&value).unwrap(),
            VendorElement::Opaque {
                oui: [0x00, 0x11, 0x22],
                subtype: Some(0x07),
                data: vec![0xaa, 0xbb]
            }
        );
    }
}
