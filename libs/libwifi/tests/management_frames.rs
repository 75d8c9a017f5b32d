use libwifi::alert::AlertKind;
use libwifi::crypt::Cryptset;
use libwifi::frame::components::MacAddress;
use libwifi::frame::ManagementFrame;
use libwifi::ie::TagKey;
use libwifi::{
    dissect_frame, Addresses, DissectorConfig, DistributionMode, FrameSubType, FrameType,
};
use rand::{Rng, SeedableRng};

const AP: [u8; 6] = [0x00, 0x12, 0x34, 0x56, 0x78, 0x9a];

/// Beacon header and fixed parameters, tags follow.
fn beacon(capabilities: u16) -> Vec<u8> {
    let mut frame = vec![
        0x80, 0x00, // frame control: management, beacon
        0x00, 0x00, // duration
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // receiver: broadcast
    ];
    frame.extend_from_slice(&AP); // transmitter
    frame.extend_from_slice(&AP); // bssid
    frame.extend_from_slice(&[0x30, 0x5c]); // sequence control
    frame.extend_from_slice(&[0x85, 0x3a, 0x1c, 0x06, 0x00, 0x00, 0x00, 0x00]); // timestamp
    frame.extend_from_slice(&[0x64, 0x00]); // beacon interval
    frame.extend_from_slice(&capabilities.to_le_bytes());
    frame
}

fn tag(frame: &mut Vec<u8>, number: u8, value: &[u8]) {
    frame.push(number);
    frame.push(value.len() as u8);
    frame.extend_from_slice(value);
}

const RATES: [u8; 8] = [0x82, 0x84, 0x8b, 0x96, 0x0c, 0x12, 0x18, 0x24];

const RSN_CCMP_PSK: [u8; 20] = [
    0x01, 0x00, // version
    0x00, 0x0f, 0xac, 0x04, // group: CCMP
    0x01, 0x00, 0x00, 0x0f, 0xac, 0x04, // pairwise: CCMP
    0x01, 0x00, 0x00, 0x0f, 0xac, 0x02, // akm: PSK
    0x00, 0x00, // capabilities
];

fn test_net() -> Vec<u8> {
    let mut frame = beacon(0x0011);
    tag(&mut frame, 0, b"TestNet");
    tag(&mut frame, 1, &RATES);
    tag(&mut frame, 3, &[6]);
    tag(&mut frame, 48, &RSN_CCMP_PSK);
    frame
}

#[test]
fn test_wpa2_beacon() {
    let frame = test_net();
    let info = dissect_frame(&frame, &DissectorConfig::default());

    assert!(!info.corrupt, "{:?}", info.error);
    assert_eq!(info.frame_type, FrameType::Management);
    assert_eq!(info.subtype, FrameSubType::Beacon);
    assert_eq!(info.bssid, Some(MacAddress(AP)));
    assert_eq!(info.source, Some(MacAddress(AP)));
    assert_eq!(info.dest, Some(MacAddress::broadcast()));
    assert_eq!(info.sequence_number, 0x5c3);
    assert_eq!(info.header_offset, 36);
    assert_eq!(info.channel, Some(6));
    assert_eq!(
        info.cryptset,
        Cryptset::WPA2 | Cryptset::CCMP128 | Cryptset::PSK
    );

    let tags = info.tags.as_ref().unwrap();
    let ssid = tags.ssid.as_ref().unwrap();
    assert_eq!(ssid.printable, "TestNet");
    assert!(!ssid.cloaked);
    assert_eq!(tags.max_rate, 18.0);

    let management = info.management.as_ref().unwrap();
    assert_eq!(management.bssid(), Some(&MacAddress(AP)));
    assert_eq!(management.src(), Some(&MacAddress(AP)));
    assert_eq!(management.dest(), &MacAddress::broadcast());

    let Some(ManagementFrame::Beacon(fixed)) = &info.management else {
        panic!("expected beacon fixed parameters");
    };
    assert_eq!(fixed.beacon_interval, 100);
    assert!(fixed.capability_info.privacy());
}

#[test]
fn test_decoding_is_idempotent() {
    let frame = test_net();
    let config = DissectorConfig::default();
    let first = dissect_frame(&frame, &config);
    let second = dissect_frame(&frame, &config);

    assert_eq!(first.cryptset, second.cryptset);
    assert_eq!(first.ietag_csum, second.ietag_csum);
    assert_eq!(first.ssid(), second.ssid());
    let (first, second) = (first.tags.unwrap(), second.tags.unwrap());
    assert_eq!(first.tag_checksums, second.tag_checksums);
    assert_eq!(first.fingerprint, second.fingerprint);
}

#[test]
fn test_ietag_checksum_tracks_tag_bytes() {
    let config = DissectorConfig::default();
    let original = dissect_frame(&test_net(), &config);

    let mut changed = test_net();
    // sequence numbers and timestamps aren't part of the tag range
    changed[22] = 0x40;
    changed[24] = 0x99;
    assert_eq!(dissect_frame(&changed, &config).ietag_csum, original.ietag_csum);

    let mut moved = test_net();
    let channel = moved.len() - RSN_CCMP_PSK.len() - 3;
    moved[channel] = 11;
    assert_ne!(dissect_frame(&moved, &config).ietag_csum, original.ietag_csum);
}

#[test]
fn test_channel_tag_length() {
    for length in [0usize, 2, 255] {
        let mut frame = beacon(0x0001);
        tag(&mut frame, 0, b"chan");
        tag(&mut frame, 1, &RATES);
        frame.push(3);
        frame.push(length as u8);
        frame.extend(std::iter::repeat(0x06).take(length));

        // Big enough to not trip the management size cap.
        let config = DissectorConfig {
            max_mgmt_len: 1024,
            ..Default::default()
        };
        let info = dissect_frame(&frame, &config);
        assert!(info.corrupt, "length {length}");
        assert!(
            info.alerts
                .iter()
                .any(|alert| alert.kind == AlertKind::MalformMgmt),
            "length {length}"
        );
        assert_eq!(info.channel, None);
        // The tags before the broken one are kept.
        assert_eq!(info.ssid(), Some("chan"));
    }
}

#[test]
fn test_long_ssid() {
    let mut frame = beacon(0x0001);
    tag(&mut frame, 0, &[b'A'; 33]);
    tag(&mut frame, 1, &RATES);

    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(info.corrupt);
    assert_eq!(info.alerts.len(), 1);
    let alert = &info.alerts[0];
    assert_eq!(alert.kind, AlertKind::LongSsid);
    assert_eq!(alert.bssid, Some(MacAddress(AP)));
}

#[test]
fn test_cloaked_ssid() {
    let mut frame = beacon(0x0001);
    tag(&mut frame, 0, &[0x00; 8]);
    tag(&mut frame, 1, &RATES);

    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(!info.corrupt);
    assert!(info.tags.unwrap().ssid.unwrap().cloaked);
}

#[test]
fn test_dlink_rate_signature() {
    let mut frame = beacon(0x0001);
    tag(&mut frame, 0, b"x");
    let mut rates = vec![0xeb, 0x49];
    rates.resize(75, 0x90);
    tag(&mut frame, 1, &rates);

    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(info.corrupt);
    assert_eq!(info.alerts[0].kind, AlertKind::MsfDlinkRate);
}

#[test]
fn test_netgear_signature_beats_size_cap() {
    let mut frame = test_net();
    frame.resize(1184, 0x00);
    frame[1180..1184].copy_from_slice(&[0x6a, 0x39, 0x58, 0x01]);

    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(info.corrupt);
    assert_eq!(info.alerts.len(), 1);
    assert_eq!(info.alerts[0].kind, AlertKind::MsfNetgearBeacon);
}

#[test]
fn test_missing_rates_is_corrupt() {
    let mut frame = beacon(0x0001);
    tag(&mut frame, 0, b"norates");
    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(info.corrupt);
    assert_eq!(info.ssid(), Some("norates"));
}

fn probe_request() -> Vec<u8> {
    let mut frame = vec![
        0x40, 0x00, // frame control: management, probe request
        0x00, 0x00, // duration
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // receiver: broadcast
        0x02, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, // transmitter
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // bssid: wildcard
        0x10, 0x00, // sequence control
    ];
    tag(&mut frame, 0, b"TestNet");
    frame
}

#[test]
fn test_probe_request_needs_ssid_and_rates() {
    let mut frame = probe_request();
    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert_eq!(info.subtype, FrameSubType::ProbeRequest);
    assert!(info.corrupt);

    tag(&mut frame, 1, &RATES);
    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert!(!info.corrupt, "{:?}", info.error);
    assert_eq!(info.ssid(), Some("TestNet"));
}

#[test]
fn test_ibss_beacon_is_adhoc() {
    let mut frame = beacon(0x0002);
    tag(&mut frame, 0, b"ibss");
    tag(&mut frame, 1, &RATES);
    let info = dissect_frame(&frame, &DissectorConfig::default());
    assert_eq!(info.distribution, DistributionMode::Adhoc);
    assert!(info.cryptset.is_open());

    let info = dissect_frame(&test_net(), &DissectorConfig::default());
    assert_eq!(info.distribution, DistributionMode::Unknown);
}

#[test]
fn test_fingerprint_follows_configured_tags() {
    let frame = test_net();
    let default = dissect_frame(&frame, &DissectorConfig::default());
    let ssid_only = dissect_frame(
        &frame,
        &DissectorConfig {
            fingerprint_tags: vec![TagKey::number(0)],
            ..Default::default()
        },
    );
    assert_ne!(
        default.tags.unwrap().fingerprint,
        ssid_only.tags.unwrap().fingerprint
    );
}

fn deauth(reason: u16) -> Vec<u8> {
    let mut frame = vec![0xc0, 0x00, 0x3a, 0x01];
    frame.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    frame.extend_from_slice(&AP);
    frame.extend_from_slice(&AP);
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&reason.to_le_bytes());
    frame
}

#[test]
fn test_invalid_reason_code_only_alerts() {
    let info = dissect_frame(&deauth(7), &DissectorConfig::default());
    assert!(info.alerts.is_empty());

    for reason in [25u16, 31, 46, 0xffff] {
        let info = dissect_frame(&deauth(reason), &DissectorConfig::default());
        assert!(!info.corrupt, "reason {reason}");
        assert_eq!(info.alerts.len(), 1);
        assert_eq!(info.alerts[0].kind, AlertKind::DeauthCodeInvalid);
        assert_eq!(info.header_offset, 26);
    }
}

#[test]
fn test_short_management_body_is_truncated() {
    let frame = &test_net()[..30];
    let info = dissect_frame(frame, &DissectorConfig::default());
    assert!(info.corrupt);
    assert!(info.management.is_none());
}

#[test]
fn test_random_bytes_never_panic() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x8021_1000);
    let config = DissectorConfig::default();
    for _ in 0..2000 {
        let length = rng.gen_range(0..600);
        let mut frame: Vec<u8> = (0..length).map(|_| rng.gen()).collect();
        // Bias towards management frames so the tag walker gets exercised.
        if let Some(first) = frame.first_mut() {
            if rng.gen_bool(0.5) {
                *first = 0x80;
            }
        }
        let _ = dissect_frame(&frame, &config);
    }
}
