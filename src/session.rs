use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{info, warn};

use crate::alerts::{AlertTracker, LogSink, StatusSink};
use crate::capture::CaptureReader;
use crate::chain::{Packet, PacketChain};
use crate::config::SentryConfig;
use crate::devices::DeviceList;
use crate::keystore::WepKeyTable;
use crate::status::{MessageLog, MessageType, StatusMessage};

/// Counters for one run over a capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub corrupt: u64,
    pub decrypted: u64,
    pub alerts: u64,
}

/// The state shared by everything processing one capture.
pub struct Session {
    pub keys: Arc<WepKeyTable>,
    pub devices: Arc<Mutex<DeviceList>>,
    pub alerts: Arc<AlertTracker>,
    pub log: Arc<Mutex<MessageLog>>,
    chain: PacketChain,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: SentryConfig) -> Result<Self> {
        let keys = Arc::new(WepKeyTable::new());
        for (bssid, key) in config.wep_keys {
            keys.add_key(bssid, key)?;
        }

        let log = Arc::new(Mutex::new(MessageLog::new(config.headless, None)));
        let alerts = Arc::new(AlertTracker::new(config.alerts));
        alerts.add_sink(Box::new(StatusSink::new(log.clone())));
        if !config.headless {
            alerts.add_sink(Box::new(LogSink));
        }

        let devices = Arc::new(Mutex::new(DeviceList::new()));
        let chain = PacketChain::standard(
            keys.clone(),
            config.dissector,
            devices.clone(),
            alerts.clone(),
        );

        Ok(Session {
            keys,
            devices,
            alerts,
            log,
            chain,
            stats: SessionStats::default(),
        })
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Run one 802.11 frame through the chain.
    pub fn process(&mut self, data: Vec<u8>, timestamp: Duration) -> Packet {
        let mut packet = Packet::new(data, timestamp);
        self.chain.process(&mut packet);

        self.stats.frames += 1;
        self.stats.alerts += packet.alerts.len() as u64;
        if packet.decrypted {
            self.stats.decrypted += 1;
        }
        if packet.info.as_ref().is_some_and(|info| info.corrupt) {
            self.stats.corrupt += 1;
        }
        packet
    }

    /// Process every frame of a capture file, stopping early once `running` clears.
    pub fn run_capture(&mut self, path: &Path, running: &AtomicBool) -> Result<SessionStats> {
        let mut reader = CaptureReader::open(path)?;
        self.status(MessageType::Status, format!("Reading {}", path.display()));

        while running.load(Ordering::SeqCst) {
            let Some(frame) = reader.next_frame() else {
                break;
            };
            match frame {
                Ok(frame) => {
                    self.process(frame.data, frame.timestamp);
                }
                Err(error) => {
                    warn!("{error:#}");
                    break;
                }
            }
        }

        info!(
            "Read {} packets, {} without a usable 802.11 frame",
            reader.packets, reader.skipped
        );
        Ok(self.stats)
    }

    pub fn status(&self, message_type: MessageType, content: String) {
        if let Ok(mut log) = self.log.lock() {
            log.add_message(StatusMessage::new(message_type, content));
        }
    }

    /// One line about the networks and stations seen so far.
    pub fn summary(&self) -> Result<String> {
        let devices = self
            .devices
            .lock()
            .map_err(|_| anyhow!("device list poisoned"))?;
        let (access_points, stations) = devices.size();
        Ok(format!(
            "{} frames, {} corrupt, {} decrypted, {} alerts | {} access points, {} stations, {} handshake peers",
            self.stats.frames,
            self.stats.corrupt,
            self.stats.decrypted,
            self.stats.alerts,
            access_points,
            stations,
            devices.handshakes().count()
        ))
    }
}
