use std::time::Duration;

use dot11_sentry::auth::{HandshakeTracker, MAX_EAPOL_HISTORY};
use libwifi::alert::AlertKind;
use libwifi::frame::components::MacAddress;
use libwifi::frame::MessageType;
use libwifi::{dissect_frame, DissectorConfig, PacketInfo};

const AP: [u8; 6] = [0x00, 0x12, 0x34, 0x56, 0x78, 0x9a];
const STA: [u8; 6] = [0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee];

const M1: u16 = 0x008a;
const M2: u16 = 0x010a;
const M3: u16 = 0x13ca;
const M4: u16 = 0x030a;

/// EAPOL-Key frame from the access point to the station.
fn eapol(key_info: u16, retry: bool, replay: u64, nonce: u8, key_data: &[u8]) -> Vec<u8> {
    let flags = if retry { 0x0a } else { 0x02 };
    let mut frame = vec![0x08, flags, 0x3a, 0x01];
    frame.extend_from_slice(&STA); // destination
    frame.extend_from_slice(&AP); // bssid
    frame.extend_from_slice(&AP); // source
    frame.extend_from_slice(&[0x80, 0x1f]); // sequence control
    frame.extend_from_slice(&[0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0x8e]);

    let mut body = vec![0x02]; // descriptor type: RSN
    body.extend_from_slice(&key_info.to_be_bytes());
    body.extend_from_slice(&16u16.to_be_bytes()); // key length
    body.extend_from_slice(&replay.to_be_bytes());
    body.extend_from_slice(&[nonce; 32]);
    body.extend_from_slice(&[0; 16]); // iv
    body.extend_from_slice(&[0; 8]); // rsc
    body.extend_from_slice(&[0; 8]); // id
    body.extend_from_slice(&[0; 16]); // mic
    body.extend_from_slice(&(key_data.len() as u16).to_be_bytes());
    body.extend_from_slice(key_data);

    frame.extend_from_slice(&[0x02, 0x03]); // 802.1X version 2, key
    frame.extend_from_slice(&(body.len() as u16).to_be_bytes());
    frame.extend_from_slice(&body);
    frame
}

fn dissect(frame: &[u8]) -> PacketInfo {
    let info = dissect_frame(frame, &DissectorConfig::default());
    assert!(!info.corrupt, "{:?}", info.error);
    assert!(info.eapol.is_some());
    info
}

fn kinds(tracker: &mut HandshakeTracker, frame: &[u8], at: Duration) -> Vec<AlertKind> {
    tracker
        .observe(&dissect(frame), frame, at)
        .into_iter()
        .map(|alert| alert.kind)
        .collect()
}

const KEY_DATA: [u8; 8] = [0xdd, 0x06, 0x00, 0x0f, 0xac, 0x01, 0x00, 0x00];

#[test]
fn test_message_three_replay_after_a_second() {
    let mut tracker = HandshakeTracker::new();
    let frame = eapol(M3, false, 2, 0x33, &KEY_DATA);

    assert!(kinds(&mut tracker, &frame, Duration::from_millis(0)).is_empty());
    assert_eq!(
        kinds(&mut tracker, &frame, Duration::from_millis(1500)),
        vec![AlertKind::NonceReuse]
    );

    // Lower replay counter is a duplicate too.
    let older = eapol(M3, false, 1, 0x33, &KEY_DATA);
    assert_eq!(
        kinds(&mut tracker, &older, Duration::from_millis(2500)),
        vec![AlertKind::NonceReuse]
    );
}

#[test]
fn test_message_three_retransmission_within_a_second() {
    let mut tracker = HandshakeTracker::new();
    let frame = eapol(M3, false, 2, 0x33, &KEY_DATA);

    assert!(kinds(&mut tracker, &frame, Duration::from_millis(0)).is_empty());
    assert!(kinds(&mut tracker, &frame, Duration::from_millis(1000)).is_empty());
    assert!(kinds(&mut tracker, &frame, Duration::from_millis(400)).is_empty());
}

#[test]
fn test_increasing_replay_counter_is_renegotiation() {
    let mut tracker = HandshakeTracker::new();
    assert!(kinds(&mut tracker, &eapol(M3, false, 2, 0x33, &KEY_DATA), Duration::ZERO).is_empty());
    let later = Duration::from_secs(5);
    assert!(kinds(&mut tracker, &eapol(M3, false, 3, 0x33, &KEY_DATA), later).is_empty());

    let peer = tracker.peer(&MacAddress(STA)).unwrap();
    assert_eq!(peer.snonces.len(), 1);
    assert_eq!(peer.snonces[0].replay_counter, 3);
}

#[test]
fn test_message_one_duplicates() {
    let mut tracker = HandshakeTracker::new();
    let at = Duration::from_millis;

    assert!(kinds(&mut tracker, &eapol(M1, false, 1, 0x11, &[]), at(0)).is_empty());
    // A retry inside the window is normal.
    assert!(kinds(&mut tracker, &eapol(M1, true, 1, 0x11, &[]), at(200)).is_empty());
    // A fresh transmission of the same nonce is not.
    assert_eq!(
        kinds(&mut tracker, &eapol(M1, false, 1, 0x11, &[]), at(300)),
        vec![AlertKind::NonceReuse]
    );
}

#[test]
fn test_zero_nonce_degrades() {
    let mut tracker = HandshakeTracker::new();
    let frame = eapol(M1, false, 1, 0x00, &[]);
    assert_eq!(
        kinds(&mut tracker, &frame, Duration::ZERO),
        vec![AlertKind::NonceDegrade]
    );
    // Zero nonces are never stored, so never replayed.
    assert_eq!(
        kinds(&mut tracker, &frame, Duration::from_secs(3)),
        vec![AlertKind::NonceDegrade]
    );
    assert!(tracker.peer(&MacAddress(STA)).unwrap().anonces.is_empty());
}

#[test]
fn test_history_is_bounded() {
    let mut tracker = HandshakeTracker::new();
    let pattern = [M1, M2, M3, M4];
    for index in 0..17u64 {
        let key_info = pattern[index as usize % pattern.len()];
        let key_data: &[u8] = if key_info == M4 || key_info == M1 {
            &[]
        } else {
            &KEY_DATA
        };
        let frame = eapol(key_info, false, index + 1, index as u8 + 1, key_data);
        tracker.observe(&dissect(&frame), &frame, Duration::from_secs(index));

        let peer = tracker.peer(&MacAddress(STA)).unwrap();
        assert!(peer.history.len() <= MAX_EAPOL_HISTORY);
    }

    let peer = tracker.peer(&MacAddress(STA)).unwrap();
    assert_eq!(peer.history.len(), MAX_EAPOL_HISTORY);
    for message in [
        MessageType::Message1,
        MessageType::Message2,
        MessageType::Message3,
        MessageType::Message4,
    ] {
        assert!(peer.has_message(message), "{message}");
    }
    // The 17th frame, a message 1, pushed out the first message 1.
    assert_eq!(peer.history[0].message, MessageType::Message2);
    assert_eq!(peer.history.last().unwrap().message, MessageType::Message1);
    assert_eq!(peer.history.last().unwrap().raw.len(), 24 + 8 + 4 + 95);
}

#[test]
fn test_pmkid_collected_from_message_one() {
    let mut tracker = HandshakeTracker::new();
    let mut key_data = vec![0xdd, 0x14, 0x00, 0x0f, 0xac, 0x04];
    key_data.extend_from_slice(&[0x5a; 16]);
    let frame = eapol(M1, false, 1, 0x11, &key_data);

    tracker.observe(&dissect(&frame), &frame, Duration::ZERO);
    tracker.observe(&dissect(&frame), &frame, Duration::from_millis(10));
    assert_eq!(
        tracker.peer(&MacAddress(STA)).unwrap().pmkids,
        vec![[0x5a; 16]]
    );
}

#[test]
fn test_oversized_key_data() {
    let mut tracker = HandshakeTracker::new();
    let frame = eapol(M3, false, 1, 0x44, &[0x00; 0x102]);
    let alerts = tracker.observe(&dissect(&frame), &frame, Duration::ZERO);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Rtl8195Vd1406);
    assert_eq!(alerts[0].bssid, Some(MacAddress(AP)));
    assert_eq!(alerts[0].dest, Some(MacAddress(STA)));

    // Descriptor version 2 has a lower limit.
    let frame = eapol(M3, false, 1, 0x45, &[0x00; 0x90]);
    assert_eq!(
        kinds(&mut tracker, &frame, Duration::ZERO),
        vec![AlertKind::Rtl8195Vd1407]
    );

    // Version 1 (HMAC-MD5/RC4) doesn't.
    let frame = eapol(M3 & !0x0007 | 0x0001, false, 1, 0x46, &[0x00; 0x90]);
    assert!(kinds(&mut tracker, &frame, Duration::ZERO).is_empty());
}
