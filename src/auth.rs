use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use libwifi::alert::{Alert, AlertKind};
use libwifi::frame::components::MacAddress;
use libwifi::frame::{EapolKey, MessageType};
use libwifi::PacketInfo;
use log::debug;

/// Handshake frames kept per peer.
pub const MAX_EAPOL_HISTORY: usize = 16;
/// Nonces kept per peer, for each of the anonce and snonce lists.
pub const MAX_NONCE_HISTORY: usize = 128;
/// A duplicate message 3 closer than this to the original is a retransmission.
pub const NONCE_REPLAY_WINDOW: Duration = Duration::from_secs(1);

/// Over-long key data on an install message 3.
const RTL8195_KEY_DATA_LIMIT: u16 = 0x101;
/// Over-long key data with the AES/HMAC-SHA1 key descriptor.
const RTL8195_AES_KEY_DATA_LIMIT: u16 = 0x80;
const KEY_DESCRIPTOR_AES: u8 = 2;

#[derive(Clone, Debug)]
pub struct EapolRecord {
    pub message: MessageType,
    pub source: Option<MacAddress>,
    pub nonce: [u8; 32],
    pub replay_counter: u64,
    pub timestamp: Duration,
    pub raw: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceEntry {
    pub nonce: [u8; 32],
    pub replay_counter: u64,
    pub timestamp: Duration,
}

/// Handshake state of one peer.
#[derive(Clone, Debug, Default)]
pub struct PeerHandshake {
    pub history: Vec<EapolRecord>,
    pub anonces: VecDeque<NonceEntry>,
    pub snonces: VecDeque<NonceEntry>,
    pub pmkids: Vec<[u8; 16]>,
}

impl PeerHandshake {
    /// Append to the history, making room first if it is full.
    ///
    /// The entry that goes is the oldest one with the same message number. Failing
    /// that, the oldest one whose message number is stored more than once, so every
    /// message number in the history survives.
    fn record(&mut self, record: EapolRecord) {
        if self.history.len() >= MAX_EAPOL_HISTORY {
            let history = &self.history;
            let index = history
                .iter()
                .position(|stored| stored.message == record.message)
                .or_else(|| {
                    history.iter().position(|stored| {
                        history
                            .iter()
                            .filter(|other| other.message == stored.message)
                            .count()
                            > 1
                    })
                })
                .unwrap_or(0);
            self.history.remove(index);
        }
        self.history.push(record);
    }

    pub fn has_message(&self, message: MessageType) -> bool {
        self.history.iter().any(|record| record.message == message)
    }

    pub fn complete(&self) -> bool {
        [
            MessageType::Message1,
            MessageType::Message2,
            MessageType::Message3,
            MessageType::Message4,
        ]
        .into_iter()
        .all(|message| self.has_message(message))
    }
}

/// Result of looking a nonce up in a peer's list.
#[derive(Debug, PartialEq, Eq)]
enum NonceCheck {
    New,
    Advanced,
    /// Same nonce, replay counter not increasing. Holds the time since the stored copy.
    Duplicate(Duration),
}

fn check_nonce(
    list: &mut VecDeque<NonceEntry>,
    key: &EapolKey,
    timestamp: Duration,
) -> NonceCheck {
    if let Some(stored) = list.iter_mut().find(|stored| stored.nonce == key.key_nonce) {
        if key.replay_counter <= stored.replay_counter {
            return NonceCheck::Duplicate(timestamp.saturating_sub(stored.timestamp));
        }
        stored.replay_counter = key.replay_counter;
        stored.timestamp = timestamp;
        return NonceCheck::Advanced;
    }

    if list.len() >= MAX_NONCE_HISTORY {
        list.pop_front();
    }
    list.push_back(NonceEntry {
        nonce: key.key_nonce,
        replay_counter: key.replay_counter,
        timestamp,
    });
    NonceCheck::New
}

/// Four-way handshake and nonce replay tracking, per destination peer.
#[derive(Default)]
pub struct HandshakeTracker {
    peers: HashMap<MacAddress, PeerHandshake>,
}

impl HandshakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.peers.len()
    }

    pub fn peer(&self, mac: &MacAddress) -> Option<&PeerHandshake> {
        self.peers.get(mac)
    }

    /// Fold the EAPOL-Key frame of a dissected packet into the peer's state.
    ///
    /// `raw` is the frame the packet was dissected from and `timestamp` its capture
    /// time. Returns the alerts the frame raised.
    pub fn observe(&mut self, info: &PacketInfo, raw: &[u8], timestamp: Duration) -> Vec<Alert> {
        let (Some(key), Some(peer)) = (info.eapol.as_ref(), info.dest) else {
            return Vec::new();
        };
        let message = key.message_type();
        let state = self.peers.entry(peer).or_default();
        let mut alerts = Vec::new();

        debug!(
            "EAPOL {} for {} replay {}",
            message, peer, key.replay_counter
        );

        state.record(EapolRecord {
            message,
            source: info.source,
            nonce: key.key_nonce,
            replay_counter: key.replay_counter,
            timestamp,
            raw: raw.to_vec(),
        });

        if matches!(message, MessageType::Message1 | MessageType::Message3) {
            for pmkid in libwifi::ie::decode_key_data(&key.key_data).pmkids() {
                if !state.pmkids.contains(&pmkid) {
                    state.pmkids.push(pmkid);
                }
            }
        }

        let info_bits = key.key_information;
        if message == MessageType::Message3 && info_bits.install() && info_bits.ack() {
            if key.key_data_length > RTL8195_KEY_DATA_LIMIT {
                alerts.push(Alert::new(
                    AlertKind::Rtl8195Vd1406,
                    format!(
                        "EAPOL message 3 with {} bytes of key data, RTL8195 overflow",
                        key.key_data_length
                    ),
                ));
            } else if key.key_data_length > RTL8195_AES_KEY_DATA_LIMIT
                && info_bits.descriptor_version() == KEY_DESCRIPTOR_AES
            {
                alerts.push(Alert::new(
                    AlertKind::Rtl8195Vd1407,
                    format!(
                        "AES EAPOL message 3 with {} bytes of key data, RTL8195 overflow",
                        key.key_data_length
                    ),
                ));
            }
        }

        let nonces = match message {
            MessageType::Message1 => Some(&mut state.anonces),
            MessageType::Message3 => Some(&mut state.snonces),
            _ => None,
        };
        if let Some(nonces) = nonces {
            if key.has_zero_nonce() {
                alerts.push(Alert::new(
                    AlertKind::NonceDegrade,
                    format!("EAPOL {message} to {peer} carries an all-zero nonce"),
                ));
            } else if let NonceCheck::Duplicate(delta) = check_nonce(nonces, key, timestamp) {
                let reused = match message {
                    MessageType::Message3 => delta > NONCE_REPLAY_WINDOW,
                    _ => !info.retry || delta > NONCE_REPLAY_WINDOW,
                };
                if reused {
                    alerts.push(Alert::new(
                        AlertKind::NonceReuse,
                        format!(
                            "EAPOL {} to {} repeated a nonce after {:.3}s, replay counter {}",
                            message,
                            peer,
                            delta.as_secs_f64(),
                            key.replay_counter
                        ),
                    ));
                }
            }
        }

        alerts
            .into_iter()
            .map(|alert| {
                let mut alert = alert.with_addresses(info.bssid, info.source, info.dest);
                alert.channel = info.channel;
                alert
            })
            .collect()
    }
}
