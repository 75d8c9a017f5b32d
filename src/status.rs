use chrono::{DateTime, Utc};
use std::fmt;

use libwifi::alert::{Alert, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Error,
    Warning,
    Info,
    Alert,
    Status,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message_type_str = match self {
            MessageType::Error => "Error",
            MessageType::Warning => "Warning",
            MessageType::Info => "Info",
            MessageType::Alert => "Alert",
            MessageType::Status => "Status",
        };
        write!(f, "{}", message_type_str)
    }
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    pub content: String,
}

impl StatusMessage {
    pub fn new(message_type: MessageType, content: String) -> Self {
        StatusMessage {
            timestamp: Utc::now(),
            message_type,
            content,
        }
    }

    /// One line per alert: header, severity, addresses and text.
    pub fn from_alert(alert: &Alert) -> Self {
        let address = |mac: Option<libwifi::frame::components::MacAddress>| {
            mac.map_or_else(|| "--".to_string(), |mac| mac.to_string())
        };
        let content = format!(
            "{} [{}] bssid {} src {} dst {}: {}",
            alert.kind,
            alert.severity(),
            address(alert.bssid),
            address(alert.source),
            address(alert.dest),
            alert.text
        );
        let message_type = if alert.severity() >= Severity::High {
            MessageType::Error
        } else {
            MessageType::Alert
        };
        StatusMessage::new(message_type, content)
    }
}

/// Bounded history of operator facing messages.
pub struct MessageLog {
    messages: Vec<StatusMessage>,
    headless: bool,
    max_size: usize,
}

impl MessageLog {
    pub fn new(headless: bool, max_size: Option<usize>) -> Self {
        MessageLog {
            messages: Vec::new(),
            headless,
            max_size: max_size.unwrap_or(500),
        }
    }

    pub fn add_message(&mut self, message: StatusMessage) {
        if self.messages.len() == self.max_size {
            self.messages.remove(0);
        }

        if self.headless {
            let color = match message.message_type {
                MessageType::Error => "\x1b[31m",
                MessageType::Warning => "\x1b[33m",
                MessageType::Info => "\x1b[0m",
                MessageType::Alert => "\x1b[35m",
                MessageType::Status => "\x1b[36m",
            };
            let white = "\x1b[0m";
            println!(
                "{}{} | {:^8} | {}{}",
                color,
                message.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                message.message_type,
                message.content,
                white,
            )
        }

        self.messages.push(message);
    }

    pub fn get_all_messages(&self) -> Vec<StatusMessage> {
        self.messages.clone()
    }

    pub fn size(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libwifi::alert::AlertKind;

    #[test]
    fn test_log_is_bounded() {
        let mut log = MessageLog::new(false, Some(3));
        for index in 0..5 {
            log.add_message(StatusMessage::new(MessageType::Info, format!("{index}")));
        }
        let contents: Vec<String> = log
            .get_all_messages()
            .into_iter()
            .map(|message| message.content)
            .collect();
        assert_eq!(contents, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_alert_line() {
        let alert = Alert::new(AlertKind::NonceReuse, "replayed");
        let message = StatusMessage::from_alert(&alert);
        assert_eq!(message.message_type, MessageType::Error);
        assert!(message.content.starts_with("NONCEREUSE [High] bssid --"));
    }
}
