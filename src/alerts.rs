use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use libwifi::alert::{Alert, AlertKind};
use log::warn;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumString};

use crate::status::{MessageLog, StatusMessage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AlertUnit {
    Sec,
    Min,
    Hour,
    Day,
}

impl AlertUnit {
    pub fn duration(&self) -> Duration {
        match self {
            AlertUnit::Sec => Duration::from_secs(1),
            AlertUnit::Min => Duration::from_secs(60),
            AlertUnit::Hour => Duration::from_secs(60 * 60),
            AlertUnit::Day => Duration::from_secs(60 * 60 * 24),
        }
    }
}

/// Rate limits of one alert header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertDefinition {
    pub kind: AlertKind,
    /// Alerts let through per `limit_unit`.
    pub limit_rate: u32,
    pub limit_unit: AlertUnit,
    /// Alerts let through per `burst_unit`.
    pub burst_rate: u32,
    pub burst_unit: AlertUnit,
}

impl AlertDefinition {
    pub fn new(kind: AlertKind) -> Self {
        AlertDefinition {
            kind,
            limit_rate: 10,
            limit_unit: AlertUnit::Min,
            burst_rate: 1,
            burst_unit: AlertUnit::Sec,
        }
    }
}

fn parse_rate(input: &str) -> Result<(u32, AlertUnit)> {
    let (rate, unit) = input
        .split_once('/')
        .ok_or_else(|| anyhow!("expected rate/unit, got {input:?}"))?;
    let rate = rate
        .trim()
        .parse::<u32>()
        .with_context(|| format!("bad alert rate {rate:?}"))?;
    let unit = AlertUnit::from_str(unit.trim())
        .map_err(|_| anyhow!("bad alert unit {unit:?}, expected sec, min, hour or day"))?;
    Ok((rate, unit))
}

impl FromStr for AlertDefinition {
    type Err = anyhow::Error;

    /// `NAME,rate/unit,burst/unit`, e.g. `NONCEREUSE,5/min,1/sec`.
    fn from_str(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let [name, limit, burst] = parts.as_slice() else {
            bail!("expected NAME,rate/unit,burst/unit, got {input:?}");
        };
        let kind = AlertKind::from_str(&name.to_uppercase())
            .map_err(|_| anyhow!("unknown alert {name:?}"))?;
        let (limit_rate, limit_unit) = parse_rate(limit)?;
        let (burst_rate, burst_unit) = parse_rate(burst)?;
        Ok(AlertDefinition {
            kind,
            limit_rate,
            limit_unit,
            burst_rate,
            burst_unit,
        })
    }
}

/// Definitions for every alert header.
#[derive(Clone, Debug)]
pub struct AlertConfig {
    definitions: HashMap<AlertKind, AlertDefinition>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            definitions: AlertKind::iter()
                .map(|kind| (kind, AlertDefinition::new(kind)))
                .collect(),
        }
    }
}

impl AlertConfig {
    /// Defaults with the given `NAME,rate/unit,burst/unit` overrides applied.
    pub fn with_overrides<S: AsRef<str>>(overrides: &[S]) -> Result<Self> {
        let mut config = AlertConfig::default();
        for line in overrides {
            let definition: AlertDefinition = line.as_ref().parse()?;
            config.set(definition);
        }
        Ok(config)
    }

    pub fn set(&mut self, definition: AlertDefinition) {
        self.definitions.insert(definition.kind, definition);
    }

    pub fn get(&self, kind: &AlertKind) -> Option<&AlertDefinition> {
        self.definitions.get(kind)
    }
}

/// Somewhere raised alerts end up.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: &Alert);
}

/// Writes alerts through the log facade.
pub struct LogSink;

impl AlertSink for LogSink {
    fn deliver(&self, alert: &Alert) {
        warn!(
            "ALERT {} [{}] {}",
            alert.kind,
            alert.severity(),
            alert.text
        );
    }
}

/// Adds alerts to the operator message log.
pub struct StatusSink {
    log: Arc<Mutex<MessageLog>>,
}

impl StatusSink {
    pub fn new(log: Arc<Mutex<MessageLog>>) -> Self {
        StatusSink { log }
    }
}

impl AlertSink for StatusSink {
    fn deliver(&self, alert: &Alert) {
        if let Ok(mut log) = self.log.lock() {
            log.add_message(StatusMessage::from_alert(alert));
        }
    }
}

#[derive(Clone, Debug, Default)]
struct AlertWindow {
    last_sent: Option<Duration>,
    burst_sent: u32,
    total_sent: u32,
    suppressed: u64,
}

/// Rate limited alert delivery, shared by every pipeline worker.
///
/// Time is the capture timestamp of the packet that raised the alert, so replaying a
/// capture file limits the same way the live capture would have.
pub struct AlertTracker {
    config: AlertConfig,
    windows: Mutex<HashMap<AlertKind, AlertWindow>>,
    sinks: RwLock<Vec<Box<dyn AlertSink>>>,
}

impl AlertTracker {
    pub fn new(config: AlertConfig) -> Self {
        AlertTracker {
            config,
            windows: Mutex::new(HashMap::new()),
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn add_sink(&self, sink: Box<dyn AlertSink>) {
        if let Ok(mut sinks) = self.sinks.write() {
            sinks.push(sink);
        }
    }

    /// Check the rate limits of `kind` at `now`, counting the alert if it passes.
    ///
    /// Both counters restart once their unit has passed since the last alert sent.
    /// A rate of 0 turns limiting off for that alert.
    pub fn should_send(&self, kind: AlertKind, now: Duration) -> bool {
        let Some(definition) = self.config.get(&kind) else {
            return false;
        };
        if definition.limit_rate == 0 {
            return true;
        }
        let Ok(mut windows) = self.windows.lock() else {
            return false;
        };
        let window = windows.entry(kind).or_default();

        if let Some(last_sent) = window.last_sent {
            let since = now.saturating_sub(last_sent);
            if since >= definition.limit_unit.duration() {
                window.total_sent = 0;
            }
            if since >= definition.burst_unit.duration() {
                window.burst_sent = 0;
            }
        }

        if window.burst_sent < definition.burst_rate && window.total_sent < definition.limit_rate
        {
            window.last_sent = Some(now);
            window.burst_sent += 1;
            window.total_sent += 1;
            true
        } else {
            window.suppressed += 1;
            false
        }
    }

    /// Deliver `alert` to every sink unless it is rate limited.
    pub fn raise(&self, alert: &Alert, now: Duration) -> bool {
        if !self.should_send(alert.kind, now) {
            return false;
        }
        if let Ok(sinks) = self.sinks.read() {
            for sink in sinks.iter() {
                sink.deliver(alert);
            }
        }
        true
    }

    /// Alerts of `kind` dropped by the rate limiter so far.
    pub fn suppressed(&self, kind: AlertKind) -> u64 {
        self.windows
            .lock()
            .ok()
            .and_then(|windows| windows.get(&kind).map(|window| window.suppressed))
            .unwrap_or(0)
    }
}
