use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, bail, Context, Result};
use libwifi::frame::components::MacAddress;
use libwifi::wep::{valid_key_length, KeyStore};
use log::info;

/// One configured WEP key and how it has fared.
#[derive(Debug)]
pub struct WepKeyEntry {
    pub bssid: MacAddress,
    pub key: Vec<u8>,
    pub decrypted: AtomicU64,
    pub failed: AtomicU64,
}

impl WepKeyEntry {
    pub fn new(bssid: MacAddress, key: Vec<u8>) -> Self {
        WepKeyEntry {
            bssid,
            key,
            decrypted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

/// Parse `BSSID,HEXKEY`, e.g. `00:11:22:33:44:55,0102030405`.
pub fn parse_wep_key(input: &str) -> Result<(MacAddress, Vec<u8>)> {
    let (bssid, key) = input
        .split_once(',')
        .ok_or_else(|| anyhow!("expected BSSID,HEXKEY, got {input:?}"))?;
    let bssid: MacAddress = bssid
        .trim()
        .parse()
        .with_context(|| format!("bad BSSID {bssid:?}"))?;
    let key = hex::decode(key.trim().replace(':', ""))
        .with_context(|| format!("bad WEP key for {bssid}"))?;
    Ok((bssid, key))
}

/// WEP keys by BSSID.
///
/// Read on every protected data frame, written only when keys are added or removed.
/// The counters are atomics so that readers never need the write lock.
#[derive(Default)]
pub struct WepKeyTable {
    keys: RwLock<HashMap<MacAddress, Arc<WepKeyEntry>>>,
}

impl WepKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_key(&self, bssid: MacAddress, key: Vec<u8>) -> Result<()> {
        if !valid_key_length(key.len()) {
            bail!(
                "WEP key for {} is {} bytes, expected 5, 13 or 16",
                bssid,
                key.len()
            );
        }
        let mut keys = self
            .keys
            .write()
            .map_err(|_| anyhow!("WEP key table poisoned"))?;
        info!("Added {} bit WEP key for {}", key.len() * 8, bssid);
        keys.insert(bssid, Arc::new(WepKeyEntry::new(bssid, key)));
        Ok(())
    }

    pub fn remove_key(&self, bssid: &MacAddress) -> bool {
        self.keys
            .write()
            .map(|mut keys| keys.remove(bssid).is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, bssid: &MacAddress) -> Option<Arc<WepKeyEntry>> {
        self.keys.read().ok()?.get(bssid).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (decrypted, failed) counters of the key for `bssid`.
    pub fn counters(&self, bssid: &MacAddress) -> Option<(u64, u64)> {
        self.get(bssid).map(|entry| {
            (
                entry.decrypted.load(Ordering::Relaxed),
                entry.failed.load(Ordering::Relaxed),
            )
        })
    }
}

impl KeyStore for WepKeyTable {
    fn key_for(&self, bssid: &MacAddress) -> Option<Vec<u8>> {
        self.get(bssid).map(|entry| entry.key.clone())
    }

    fn record_result(&self, bssid: &MacAddress, decrypted: bool) {
        if let Some(entry) = self.get(bssid) {
            let counter = if decrypted {
                &entry.decrypted
            } else {
                &entry.failed
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}
