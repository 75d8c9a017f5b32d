use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::frame::components::MacAddress;

/// How bad a raised condition is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Every named condition the dissector and the trackers can raise.
///
/// The string form is the alert header used in configuration, e.g. `LONGSSID`.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AlertKind {
    LongSsid,
    MsfBcomSsid,
    MsfDlinkRate,
    MsfNetgearBeacon,
    Netstumbler,
    LucentTest,
    DeauthCodeInvalid,
    DisconCodeInvalid,
    ChanChange,
    CryptoDrop,
    BeaconRate,
    WpsBrute,
    MalformMgmt,
    NonceDegrade,
    NonceReuse,
    Rtl8195Vd1406,
    Rtl8195Vd1407,
}

impl AlertKind {
    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::MsfBcomSsid
            | AlertKind::MsfDlinkRate
            | AlertKind::MsfNetgearBeacon
            | AlertKind::Rtl8195Vd1406
            | AlertKind::Rtl8195Vd1407 => Severity::Critical,
            AlertKind::LongSsid | AlertKind::NonceReuse | AlertKind::WpsBrute => Severity::High,
            AlertKind::CryptoDrop | AlertKind::MalformMgmt | AlertKind::NonceDegrade => {
                Severity::Medium
            }
            AlertKind::DeauthCodeInvalid
            | AlertKind::DisconCodeInvalid
            | AlertKind::ChanChange
            | AlertKind::BeaconRate => Severity::Low,
            AlertKind::Netstumbler | AlertKind::LucentTest => Severity::Info,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AlertKind::LongSsid => "SSID over 32 bytes, likely an exploit attempt against clients",
            AlertKind::MsfBcomSsid => "Poisoned beacon targeting Broadcom drivers",
            AlertKind::MsfDlinkRate => "Poisoned rate tag targeting D-Link drivers",
            AlertKind::MsfNetgearBeacon => "Over-sized beacon targeting Netgear drivers",
            AlertKind::Netstumbler => "Netstumbler active scanning probe",
            AlertKind::LucentTest => "Lucent link test probe",
            AlertKind::DeauthCodeInvalid => "Deauthentication with an illegal reason code",
            AlertKind::DisconCodeInvalid => "Disassociation with an illegal reason code",
            AlertKind::ChanChange => "Access point changed channel",
            AlertKind::CryptoDrop => "Access point advertised weaker encryption",
            AlertKind::BeaconRate => "Access point changed its beacon interval",
            AlertKind::WpsBrute => "Repeated WPS M3 messages, likely a WPS PIN brute force",
            AlertKind::MalformMgmt => "Malformed management frame element",
            AlertKind::NonceDegrade => "EAPOL handshake with an all-zero nonce",
            AlertKind::NonceReuse => "EAPOL nonce replayed, possible KRACK style attack",
            AlertKind::Rtl8195Vd1406 => "Over-long EAPOL key data targeting Realtek RTL8195",
            AlertKind::Rtl8195Vd1407 => "Over-long AES EAPOL key data targeting Realtek RTL8195",
        }
    }
}

/// A condition raised while looking at one packet.
///
/// The dissector only collects these, the addresses are filled from the packet once
/// dissection is complete. Rate limiting and delivery is done by the consumer.
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
    pub bssid: Option<MacAddress>,
    pub source: Option<MacAddress>,
    pub dest: Option<MacAddress>,
    pub channel: Option<u8>,
}

impl Alert {
    pub fn new(kind: AlertKind, text: impl Into<String>) -> Self {
        Alert {
            kind,
            text: text.into(),
            bssid: None,
            source: None,
            dest: None,
            channel: None,
        }
    }

    pub fn with_addresses(
        mut self,
        bssid: Option<MacAddress>,
        source: Option<MacAddress>,
        dest: Option<MacAddress>,
    ) -> Self {
        self.bssid = self.bssid.or(bssid);
        self.source = self.source.or(source);
        self.dest = self.dest.or(dest);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}
