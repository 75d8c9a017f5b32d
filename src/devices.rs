use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use libwifi::alert::{Alert, AlertKind};
use libwifi::crypt::Cryptset;
use libwifi::frame::components::MacAddress;
use libwifi::{DistributionMode, FrameSubType, FrameType, PacketInfo};
use log::{debug, trace};

use crate::auth::HandshakeTracker;

/// More WPS M3 messages than this inside [WPS_M3_WINDOW] look like a PIN brute force.
pub const WPS_M3_LIMIT: usize = 5;
pub const WPS_M3_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct AccessPoint {
    pub mac_address: MacAddress,
    pub ssid: Option<String>,
    pub channel: Option<u8>,
    pub cryptset: Cryptset,
    pub beacon_interval: Option<u16>,
    /// Checksum of the tags last decoded for this network.
    pub ietag_csum: u32,
    pub fingerprint: u32,
    pub first_seen: Duration,
    pub last_seen: Duration,
    pub beacons: u64,
    pub clients: HashSet<MacAddress>,
}

impl AccessPoint {
    fn new(mac_address: MacAddress, info: &PacketInfo, timestamp: Duration) -> Self {
        let mut ap = AccessPoint {
            mac_address,
            ssid: None,
            channel: None,
            cryptset: Cryptset::empty(),
            beacon_interval: None,
            ietag_csum: 0,
            fingerprint: 0,
            first_seen: timestamp,
            last_seen: timestamp,
            beacons: 0,
            clients: HashSet::new(),
        };
        ap.update_with(info);
        ap
    }

    fn update_with(&mut self, info: &PacketInfo) {
        if let Some(ssid) = info.tags.as_ref().and_then(|tags| tags.ssid.as_ref()) {
            if !ssid.cloaked {
                self.ssid = Some(ssid.printable.clone());
            }
        }
        if info.channel.is_some() {
            self.channel = info.channel;
        }
        if info.is_beacon() {
            if let Some(interval) = info.management.as_ref().and_then(|m| m.beacon_interval()) {
                self.beacon_interval = Some(interval);
            }
        }
        self.cryptset = info.cryptset;
        self.ietag_csum = info.ietag_csum;
        self.fingerprint = info.tags.as_ref().map_or(0, |tags| tags.fingerprint);
    }
}

#[derive(Clone, Debug)]
pub struct Station {
    pub mac_address: MacAddress,
    pub bssid: Option<MacAddress>,
    pub probes: Vec<String>,
    pub first_seen: Duration,
    pub last_seen: Duration,
}

impl Station {
    fn new(mac_address: MacAddress, timestamp: Duration) -> Self {
        Station {
            mac_address,
            bssid: None,
            probes: Vec::new(),
            first_seen: timestamp,
            last_seen: timestamp,
        }
    }
}

/// Persistent device state, folded together from dissected packets.
///
/// Owned behind a single lock by the packet chain; [DeviceList::commit] is the only
/// writer.
#[derive(Default)]
pub struct DeviceList {
    access_points: HashMap<MacAddress, AccessPoint>,
    stations: HashMap<MacAddress, Station>,
    handshakes: HandshakeTracker,
    wps_m3: HashMap<MacAddress, VecDeque<Duration>>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_point(&self, mac: &MacAddress) -> Option<&AccessPoint> {
        self.access_points.get(mac)
    }

    pub fn station(&self, mac: &MacAddress) -> Option<&Station> {
        self.stations.get(mac)
    }

    pub fn access_points(&self) -> impl Iterator<Item = &AccessPoint> {
        self.access_points.values()
    }

    pub fn handshakes(&self) -> &HandshakeTracker {
        &self.handshakes
    }

    pub fn size(&self) -> (usize, usize) {
        (self.access_points.len(), self.stations.len())
    }

    /// Fold one dissected packet into the device state.
    ///
    /// Corrupt packets and deauthentication or disassociation frames with an illegal
    /// reason code are refused. Returns the alerts the packet raised against the
    /// stored state.
    pub fn commit(
        &mut self,
        info: &PacketInfo,
        raw: &[u8],
        timestamp: Duration,
    ) -> Result<Vec<Alert>, &'static str> {
        if info.corrupt {
            return Err("corrupt packet");
        }
        if let Some(reason) = info.management.as_ref().and_then(|m| m.reason_code()) {
            if !reason.is_valid() {
                debug!(
                    "Refusing {} from {:?}, reason code {}",
                    info.subtype, info.source, reason.0
                );
                return Err("invalid reason code");
            }
        }

        let mut alerts = Vec::new();
        match info.frame_type {
            FrameType::Management => match info.subtype {
                FrameSubType::Beacon | FrameSubType::ProbeResponse => {
                    alerts.extend(self.commit_access_point(info, timestamp));
                }
                FrameSubType::ProbeRequest => self.commit_probe(info, timestamp),
                _ => {}
            },
            FrameType::Data => {
                self.commit_station(info, timestamp);
                alerts.extend(self.handshakes.observe(info, raw, timestamp));
                alerts.extend(self.commit_wps(info, timestamp));
            }
            _ => {}
        }

        Ok(alerts
            .into_iter()
            .map(|alert| {
                let mut alert = alert.with_addresses(info.bssid, info.source, info.dest);
                alert.channel = alert.channel.or(info.channel);
                alert
            })
            .collect())
    }

    fn commit_access_point(&mut self, info: &PacketInfo, timestamp: Duration) -> Vec<Alert> {
        let Some(bssid) = info.bssid else {
            return Vec::new();
        };
        let Some(ap) = self.access_points.get_mut(&bssid) else {
            let mut ap = AccessPoint::new(bssid, info, timestamp);
            ap.beacons = u64::from(info.is_beacon());
            self.access_points.insert(bssid, ap);
            return Vec::new();
        };

        ap.last_seen = timestamp;
        let mut alerts = Vec::new();

        if info.is_beacon() {
            ap.beacons += 1;
            let interval = info.management.as_ref().and_then(|m| m.beacon_interval());
            if let (Some(old), Some(new)) = (ap.beacon_interval, interval) {
                if old != new {
                    alerts.push(Alert::new(
                        AlertKind::BeaconRate,
                        format!("{bssid} changed beacon interval from {old} to {new}"),
                    ));
                    ap.beacon_interval = Some(new);
                }
            }
        }

        if info.ietag_csum != 0 && info.ietag_csum == ap.ietag_csum {
            trace!("{bssid} tags unchanged");
            return alerts;
        }

        if let (Some(old), Some(new)) = (ap.channel, info.channel) {
            if old != new {
                alerts.push(Alert::new(
                    AlertKind::ChanChange,
                    format!("{bssid} moved from channel {old} to {new}"),
                ));
            }
        }
        if ap.cryptset.is_downgraded_by(&info.cryptset) {
            alerts.push(Alert::new(
                AlertKind::CryptoDrop,
                format!(
                    "{} dropped encryption from {} to {}",
                    bssid, ap.cryptset, info.cryptset
                ),
            ));
        }

        ap.update_with(info);
        alerts
    }

    fn commit_probe(&mut self, info: &PacketInfo, timestamp: Duration) {
        let Some(source) = info.source.filter(|mac| mac.is_real_device()) else {
            return;
        };
        let station = self
            .stations
            .entry(source)
            .or_insert_with(|| Station::new(source, timestamp));
        station.last_seen = timestamp;
        if let Some(ssid) = info.ssid().filter(|ssid| !ssid.is_empty()) {
            if !station.probes.iter().any(|probe| probe == ssid) {
                station.probes.push(ssid.to_string());
            }
        }
    }

    fn commit_station(&mut self, info: &PacketInfo, timestamp: Duration) {
        let client = match info.distribution {
            DistributionMode::ToAp => info.source,
            DistributionMode::FromAp => info.dest,
            _ => None,
        };
        let (Some(client), Some(bssid)) = (client, info.bssid) else {
            return;
        };
        if !client.is_real_device() || client == bssid {
            return;
        }

        let station = self
            .stations
            .entry(client)
            .or_insert_with(|| Station::new(client, timestamp));
        station.last_seen = timestamp;
        station.bssid = Some(bssid);

        if let Some(ap) = self.access_points.get_mut(&bssid) {
            ap.last_seen = timestamp;
            ap.clients.insert(client);
        }
    }

    fn commit_wps(&mut self, info: &PacketInfo, timestamp: Duration) -> Option<Alert> {
        if !info.wps_m3 {
            return None;
        }
        let bssid = info.bssid?;
        let seen = self.wps_m3.entry(bssid).or_default();
        seen.push_back(timestamp);
        while seen
            .front()
            .is_some_and(|first| timestamp.saturating_sub(*first) > WPS_M3_WINDOW)
        {
            seen.pop_front();
        }

        (seen.len() > WPS_M3_LIMIT).then(|| {
            Alert::new(
                AlertKind::WpsBrute,
                format!(
                    "{} WPS M3 messages from {} in {}s",
                    seen.len(),
                    bssid,
                    WPS_M3_WINDOW.as_secs()
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libwifi::error::DissectError;

    const AP: MacAddress = MacAddress([0x00, 0x12, 0x34, 0x56, 0x78, 0x9a]);

    fn beacon(channel: u8, cryptset: Cryptset, csum: u32) -> PacketInfo {
        PacketInfo {
            frame_type: FrameType::Management,
            subtype: FrameSubType::Beacon,
            bssid: Some(AP),
            source: Some(AP),
            channel: Some(channel),
            cryptset,
            ietag_csum: csum,
            ..Default::default()
        }
    }

    #[test]
    fn test_channel_and_crypto_changes() {
        let mut devices = DeviceList::new();
        let wpa2 = Cryptset::WPA2 | Cryptset::CCMP128 | Cryptset::PSK;
        let at = Duration::from_secs;

        assert!(devices.commit(&beacon(6, wpa2, 1), &[], at(0)).unwrap().is_empty());
        // Same tags, nothing to look at.
        assert!(devices.commit(&beacon(6, wpa2, 1), &[], at(1)).unwrap().is_empty());

        let alerts = devices.commit(&beacon(11, Cryptset::WEP, 2), &[], at(2)).unwrap();
        let kinds: Vec<AlertKind> = alerts.iter().map(|alert| alert.kind).collect();
        assert_eq!(kinds, vec![AlertKind::ChanChange, AlertKind::CryptoDrop]);
        assert_eq!(alerts[0].bssid, Some(AP));
        assert_eq!(alerts[0].channel, Some(11));

        let ap = devices.access_point(&AP).unwrap();
        assert_eq!(ap.channel, Some(11));
        assert_eq!(ap.beacons, 3);
        assert_eq!(ap.last_seen, at(2));

        // Upgrading is fine.
        assert!(devices.commit(&beacon(11, wpa2, 3), &[], at(3)).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_packets_are_refused() {
        let mut devices = DeviceList::new();
        let mut info = beacon(6, Cryptset::empty(), 1);
        info.set_corrupt(DissectError::corrupt("test"));
        assert!(devices.commit(&info, &[], Duration::ZERO).is_err());
        assert_eq!(devices.size(), (0, 0));
    }
}
