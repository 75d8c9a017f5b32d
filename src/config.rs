use anyhow::{anyhow, Result};
use libwifi::config::parse_fingerprint_tags;
use libwifi::frame::components::MacAddress;
use libwifi::DissectorConfig;

use crate::alerts::AlertConfig;
use crate::keystore::parse_wep_key;

/// Everything a capture session needs, assembled from the command line.
#[derive(Clone, Debug)]
pub struct SentryConfig {
    pub dissector: DissectorConfig,
    pub alerts: AlertConfig,
    pub wep_keys: Vec<(MacAddress, Vec<u8>)>,
    /// Print alerts to the terminal as they are raised.
    pub headless: bool,
}

impl Default for SentryConfig {
    fn default() -> Self {
        SentryConfig {
            dissector: DissectorConfig::default(),
            alerts: AlertConfig::default(),
            wep_keys: Vec::new(),
            headless: true,
        }
    }
}

impl SentryConfig {
    pub fn build(
        wep_keys: &[String],
        alerts: &[String],
        fingerprint_tags: Option<&str>,
        weak_dissect: bool,
        quiet: bool,
    ) -> Result<Self> {
        let mut dissector = DissectorConfig {
            weak_dissect,
            ..Default::default()
        };
        if let Some(tags) = fingerprint_tags {
            dissector.fingerprint_tags = parse_fingerprint_tags(tags)
                .map_err(|error| anyhow!("bad fingerprint tag list {tags:?}: {error}"))?;
        }

        Ok(SentryConfig {
            dissector,
            alerts: AlertConfig::with_overrides(alerts)?,
            wep_keys: wep_keys
                .iter()
                .map(|key| parse_wep_key(key))
                .collect::<Result<_>>()?,
            headless: !quiet,
        })
    }
}
