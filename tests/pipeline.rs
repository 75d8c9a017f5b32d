use std::time::Duration;

use crc::{Crc, CRC_32_ISO_HDLC};
use dot11_sentry::config::SentryConfig;
use dot11_sentry::Session;
use libwifi::alert::AlertKind;
use libwifi::crypt::Cryptset;
use libwifi::frame::components::MacAddress;
use libwifi::wep::{KeyStore, Rc4};

const ICV: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

const AP: [u8; 6] = [0x00, 0x12, 0x34, 0x56, 0x78, 0x9a];
const STA: [u8; 6] = [0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee];
const KEY: [u8; 5] = [0x1f, 0x2e, 0x3d, 0x4c, 0x5b];

fn new_session(wep: bool) -> Session {
    let mut config = SentryConfig {
        headless: false,
        ..Default::default()
    };
    if wep {
        config.wep_keys.push((MacAddress(AP), KEY.to_vec()));
    }
    Session::new(config).unwrap()
}

fn at(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

fn tag(frame: &mut Vec<u8>, number: u8, value: &[u8]) {
    frame.push(number);
    frame.push(value.len() as u8);
    frame.extend_from_slice(value);
}

const RATES: [u8; 8] = [0x82, 0x84, 0x8b, 0x96, 0x0c, 0x12, 0x18, 0x24];

fn beacon(ssid: &[u8], channel: u8, interval: u16) -> Vec<u8> {
    let mut frame = vec![0x80, 0x00, 0x00, 0x00];
    frame.extend_from_slice(&[0xff; 6]); // receiver: broadcast
    frame.extend_from_slice(&AP); // transmitter
    frame.extend_from_slice(&AP); // bssid
    frame.extend_from_slice(&[0x30, 0x5c]); // sequence control
    frame.extend_from_slice(&[0x85, 0x3a, 0x1c, 0x06, 0x00, 0x00, 0x00, 0x00]); // timestamp
    frame.extend_from_slice(&interval.to_le_bytes());
    frame.extend_from_slice(&0x0001u16.to_le_bytes()); // ESS
    tag(&mut frame, 0, ssid);
    tag(&mut frame, 1, &RATES);
    tag(&mut frame, 3, &[channel]);
    frame
}

/// Data frame header from the station to the access point.
fn to_ap(flags: u8) -> Vec<u8> {
    let mut frame = vec![0x08, 0x01 | flags, 0x3a, 0x01];
    frame.extend_from_slice(&AP); // bssid
    frame.extend_from_slice(&STA); // source
    frame.extend_from_slice(&AP); // destination
    frame.extend_from_slice(&[0x40, 0x02]); // sequence control
    frame
}

/// ARP request behind an LLC/SNAP header.
const ARP: [u8; 36] = [
    0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x08, 0x06, // LLC/SNAP, ARP
    0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, // ethernet/ipv4, request
    0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xc0, 0xa8, 0x01, 0x02, // sender
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0xa8, 0x01, 0x01, // target
];

fn wep_frame(key: &[u8]) -> Vec<u8> {
    let iv = [0x0a, 0x0b, 0x0c];
    let mut seed = iv.to_vec();
    seed.extend_from_slice(key);
    let mut body = ARP.to_vec();
    body.extend_from_slice(&ICV.checksum(&ARP).to_le_bytes());
    Rc4::new(&seed).unwrap().apply(&mut body);

    let mut frame = to_ap(0x40);
    frame.extend_from_slice(&iv);
    frame.push(0x00); // key index
    frame.extend_from_slice(&body);
    frame
}

fn kinds(alerts: &[libwifi::alert::Alert]) -> Vec<AlertKind> {
    alerts.iter().map(|alert| alert.kind).collect()
}

#[test]
fn test_hooks_run_in_order() {
    let mut session = new_session(true);
    let packet = session.process(wep_frame(&KEY), at(0));

    assert!(packet.decrypted);
    assert!(packet.committed);
    let info = packet.info.unwrap();
    assert!(!info.corrupt);
    assert!(info.cryptset.is_open());
    assert_eq!(info.datasize, ARP.len());
    assert_eq!(session.keys.counters(&MacAddress(AP)), Some((1, 0)));

    let devices = session.devices.lock().unwrap();
    assert_eq!(
        devices.station(&MacAddress(STA)).unwrap().bssid,
        Some(MacAddress(AP))
    );
}

#[test]
fn test_wrong_key_leaves_frame_encrypted() {
    let mut session = new_session(true);
    let packet = session.process(wep_frame(&[0x00; 5]), at(0));

    assert!(!packet.decrypted);
    assert_eq!(packet.info.unwrap().cryptset, Cryptset::WEP);
    assert_eq!(session.keys.counters(&MacAddress(AP)), Some((0, 1)));
}

#[test]
fn test_access_point_changes_raise_alerts() {
    let mut session = new_session(false);
    assert!(session.process(beacon(b"TestNet", 6, 100), at(0)).alerts.is_empty());
    assert!(session.process(beacon(b"TestNet", 6, 100), at(1)).alerts.is_empty());

    let packet = session.process(beacon(b"TestNet", 11, 100), at(2));
    assert_eq!(kinds(&packet.alerts), vec![AlertKind::ChanChange]);
    assert_eq!(packet.alerts[0].bssid, Some(MacAddress(AP)));

    let packet = session.process(beacon(b"TestNet", 11, 50), at(3));
    assert_eq!(kinds(&packet.alerts), vec![AlertKind::BeaconRate]);

    let devices = session.devices.lock().unwrap();
    let ap = devices.access_point(&MacAddress(AP)).unwrap();
    assert_eq!(ap.ssid.as_deref(), Some("TestNet"));
    assert_eq!(ap.channel, Some(11));
    assert_eq!(ap.beacon_interval, Some(50));
    assert_eq!(ap.beacons, 4);
}

#[test]
fn test_corrupt_frames_alert_without_commit() {
    let mut session = new_session(false);
    let packet = session.process(beacon(&[b'A'; 33], 6, 100), at(0));

    assert!(!packet.committed);
    assert_eq!(kinds(&packet.alerts), vec![AlertKind::LongSsid]);
    assert_eq!(session.devices.lock().unwrap().size(), (0, 0));
    assert_eq!(session.stats().corrupt, 1);
}

fn deauth(reason: u16) -> Vec<u8> {
    let mut frame = vec![0xc0, 0x00, 0x3a, 0x01];
    frame.extend_from_slice(&STA);
    frame.extend_from_slice(&AP);
    frame.extend_from_slice(&AP);
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&reason.to_le_bytes());
    frame
}

#[test]
fn test_invalid_reason_code_refuses_commit() {
    let mut session = new_session(false);

    let packet = session.process(deauth(7), at(0));
    assert!(packet.committed);
    assert!(packet.alerts.is_empty());

    let packet = session.process(deauth(28), at(1));
    assert!(!packet.committed);
    assert!(!packet.info.unwrap().corrupt);
    assert_eq!(kinds(&packet.alerts), vec![AlertKind::DeauthCodeInvalid]);
}

/// WPS M3 in an EAP expanded request from the access point.
fn wps_m3() -> Vec<u8> {
    let mut frame = vec![0x08, 0x02, 0x3a, 0x01];
    frame.extend_from_slice(&STA); // destination
    frame.extend_from_slice(&AP); // bssid
    frame.extend_from_slice(&AP); // source
    frame.extend_from_slice(&[0x80, 0x1f]); // sequence control
    frame.extend_from_slice(&[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0x8e]);
    frame.extend_from_slice(&[0x01, 0x00, 0x00, 0x18]); // 802.1X version 1, EAP
    frame.extend_from_slice(&[0x01, 0x07, 0x00, 0x18, 0xfe]); // request, expanded type
    frame.extend_from_slice(&[0x00, 0x37, 0x2a, 0x00, 0x00, 0x00, 0x01]); // WFA, WSC
    frame.extend_from_slice(&[0x04, 0x00]); // WSC_MSG, flags
    frame.extend_from_slice(&[0x10, 0x4a, 0x00, 0x01, 0x10]); // version
    frame.extend_from_slice(&[0x10, 0x22, 0x00, 0x01, 0x07]); // message type M3
    frame
}

#[test]
fn test_wps_brute_force() {
    let mut session = new_session(false);
    for second in 0..5 {
        let packet = session.process(wps_m3(), at(second));
        assert!(packet.info.unwrap().wps_m3);
        assert!(packet.alerts.is_empty());
    }
    let packet = session.process(wps_m3(), at(5));
    assert_eq!(kinds(&packet.alerts), vec![AlertKind::WpsBrute]);
    assert_eq!(packet.alerts[0].bssid, Some(MacAddress(AP)));

    // Spread out over more than a minute it's just a slow client.
    let mut session = new_session(false);
    for index in 0..8 {
        let packet = session.process(wps_m3(), at(index * 30));
        assert!(packet.alerts.is_empty());
    }
}

#[test]
fn test_rate_limited_alerts_are_not_reported() {
    let mut session = new_session(false);
    let first = session.process(deauth(40 + 6), at(0));
    let second = session.process(deauth(40 + 6), at(0));
    assert_eq!(first.alerts.len(), 1);
    assert!(second.alerts.is_empty());
    assert_eq!(session.alerts.suppressed(AlertKind::DeauthCodeInvalid), 1);
    assert_eq!(session.stats().alerts, 1);
}

#[test]
fn test_keys_can_be_removed_at_runtime() {
    let mut session = new_session(true);
    assert!(session.keys.remove_key(&MacAddress(AP)));
    assert_eq!(session.keys.key_for(&MacAddress(AP)), None);
    let packet = session.process(wep_frame(&KEY), at(0));
    assert!(!packet.decrypted);
}
