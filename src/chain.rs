use std::sync::{Arc, Mutex};
use std::time::Duration;

use libwifi::alert::Alert;
use libwifi::error::WepError;
use libwifi::wep::decrypt_frame;
use libwifi::{dissect_frame, DissectorConfig, PacketInfo};
use log::{debug, trace};

use crate::alerts::AlertTracker;
use crate::devices::DeviceList;
use crate::keystore::WepKeyTable;

/// Stage groups of the chain, run in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChainStage {
    Decrypt,
    Dissect,
    Classify,
}

/// One packet moving through the chain.
#[derive(Clone, Debug)]
pub struct Packet {
    /// The 802.11 frame, replaced by the decrypted copy once WEP is removed.
    pub data: Vec<u8>,
    pub timestamp: Duration,
    pub decrypted: bool,
    pub info: Option<PacketInfo>,
    /// Alerts let through the rate limiter for this packet.
    pub alerts: Vec<Alert>,
    pub committed: bool,
}

impl Packet {
    pub fn new(data: Vec<u8>, timestamp: Duration) -> Self {
        Packet {
            data,
            timestamp,
            decrypted: false,
            info: None,
            alerts: Vec::new(),
            committed: false,
        }
    }
}

/// A processing stage. Returning false stops the chain for this packet.
pub trait PacketHook: Send + Sync {
    fn name(&self) -> &str;
    fn handle(&self, packet: &mut Packet) -> bool;
}

struct Registration {
    stage: ChainStage,
    priority: i32,
    hook: Box<dyn PacketHook>,
}

/// Ordered set of hooks every packet is run through.
///
/// Within a stage, hooks with a lower magnitude priority run first. Hooks with the
/// same priority run in the order they were registered.
#[derive(Default)]
pub struct PacketChain {
    hooks: Vec<Registration>,
}

impl PacketChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, stage: ChainStage, priority: i32, hook: Box<dyn PacketHook>) {
        debug!(
            "Registered {} in {:?} with priority {}",
            hook.name(),
            stage,
            priority
        );
        self.hooks.push(Registration {
            stage,
            priority,
            hook,
        });
        // stable, keeps registration order for equal keys
        self.hooks
            .sort_by_key(|registration| (registration.stage, registration.priority.unsigned_abs()));
    }

    /// Hook names in the order they run.
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks
            .iter()
            .map(|registration| registration.hook.name())
            .collect()
    }

    pub fn process(&self, packet: &mut Packet) {
        for registration in &self.hooks {
            if !registration.hook.handle(packet) {
                trace!("{} stopped the chain", registration.hook.name());
                break;
            }
        }
    }

    /// The usual chain: WEP decryption, 802.11 dissection and the device commit.
    pub fn standard(
        keys: Arc<WepKeyTable>,
        config: DissectorConfig,
        devices: Arc<Mutex<DeviceList>>,
        alerts: Arc<AlertTracker>,
    ) -> Self {
        let mut chain = PacketChain::new();
        chain.register(ChainStage::Decrypt, -100, Box::new(WepDecryptHook { keys }));
        chain.register(ChainStage::Dissect, -100, Box::new(DissectHook { config }));
        chain.register(
            ChainStage::Classify,
            -100,
            Box::new(CommitHook { devices, alerts }),
        );
        chain
    }
}

/// Replaces WEP protected frames with their plaintext when a key is configured.
pub struct WepDecryptHook {
    keys: Arc<WepKeyTable>,
}

impl PacketHook for WepDecryptHook {
    fn name(&self) -> &str {
        "WEP decrypt"
    }

    fn handle(&self, packet: &mut Packet) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        match decrypt_frame(&packet.data, &*self.keys) {
            Ok(Some(decrypted)) => {
                packet.data = decrypted;
                packet.decrypted = true;
            }
            Ok(None) | Err(WepError::NotProtected) => {}
            Err(error) => debug!("WEP decryption failed: {error}"),
        }
        true
    }
}

/// Dissects the frame into a fresh [PacketInfo].
pub struct DissectHook {
    config: DissectorConfig,
}

impl PacketHook for DissectHook {
    fn name(&self) -> &str {
        "802.11 dissect"
    }

    fn handle(&self, packet: &mut Packet) -> bool {
        packet.info = Some(dissect_frame(&packet.data, &self.config));
        true
    }
}

/// Raises the dissection alerts and folds the packet into the device list.
pub struct CommitHook {
    devices: Arc<Mutex<DeviceList>>,
    alerts: Arc<AlertTracker>,
}

impl CommitHook {
    fn raise(&self, packet: &mut Packet, alerts: Vec<Alert>) {
        for alert in alerts {
            if self.alerts.raise(&alert, packet.timestamp) {
                packet.alerts.push(alert);
            }
        }
    }
}

impl PacketHook for CommitHook {
    fn name(&self) -> &str {
        "device commit"
    }

    fn handle(&self, packet: &mut Packet) -> bool {
        let Some(info) = packet.info.take() else {
            return true;
        };
        self.raise(packet, info.alerts.clone());

        if !info.corrupt {
            let committed = match self.devices.lock() {
                Ok(mut devices) => devices.commit(&info, &packet.data, packet.timestamp),
                Err(_) => Err("device list poisoned"),
            };
            match committed {
                Ok(alerts) => {
                    packet.committed = true;
                    self.raise(packet, alerts);
                }
                Err(reason) => trace!("Not committed: {reason}"),
            }
        }

        packet.info = Some(info);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl PacketHook for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn handle(&self, packet: &mut Packet) -> bool {
            packet.data.push(self.0.len() as u8);
            self.0 != "stop"
        }
    }

    #[test]
    fn test_hook_order() {
        let mut chain = PacketChain::new();
        chain.register(ChainStage::Classify, -1, Box::new(Named("classify")));
        chain.register(ChainStage::Decrypt, -100, Box::new(Named("late decrypt")));
        chain.register(ChainStage::Decrypt, -10, Box::new(Named("early decrypt")));
        chain.register(ChainStage::Dissect, 0, Box::new(Named("dissect")));
        assert_eq!(
            chain.hook_names(),
            vec!["early decrypt", "late decrypt", "dissect", "classify"]
        );
    }

    #[test]
    fn test_false_stops_chain() {
        let mut chain = PacketChain::new();
        chain.register(ChainStage::Decrypt, 0, Box::new(Named("stop")));
        chain.register(ChainStage::Dissect, 0, Box::new(Named("never")));
        let mut packet = Packet::new(Vec::new(), Duration::ZERO);
        chain.process(&mut packet);
        assert_eq!(packet.data, vec![4]);
    }
}
