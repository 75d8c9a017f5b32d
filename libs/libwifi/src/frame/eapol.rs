use std::fmt;

/// LLC/SNAP header announcing an 802.1X payload (EtherType 0x888e).
pub const DOT1X_LLC: [u8; 8] = [0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x88, 0x8e];

pub const DOT1X_TYPE_EAP: u8 = 0;
pub const DOT1X_TYPE_START: u8 = 1;
pub const DOT1X_TYPE_LOGOFF: u8 = 2;
pub const DOT1X_TYPE_KEY: u8 = 3;

pub const EAP_TYPE_IDENTITY: u8 = 1;
pub const EAP_TYPE_TLS: u8 = 13;
pub const EAP_TYPE_LEAP: u8 = 17;
pub const EAP_TYPE_TTLS: u8 = 21;
pub const EAP_TYPE_PEAP: u8 = 25;
pub const EAP_TYPE_EXPANDED: u8 = 254;

/// The 802.1X header following the LLC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dot1xHeader {
    pub version: u8,
    pub packet_type: u8,
    pub length: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EapCode {
    Request,
    Response,
    Success,
    Failure,
    Other(u8),
}

impl From<u8> for EapCode {
    fn from(value: u8) -> Self {
        match value {
            1 => EapCode::Request,
            2 => EapCode::Response,
            3 => EapCode::Success,
            4 => EapCode::Failure,
            other => EapCode::Other(other),
        }
    }
}

/// An EAP packet carried in an 802.1X type 0 frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EapPacket {
    pub code: EapCode,
    pub identifier: u8,
    pub length: u16,
    /// Only requests and responses carry a type.
    pub eap_type: Option<u8>,
    pub data: Vec<u8>,
}

impl EapPacket {
    /// The identity string of an identity response.
    pub fn identity(&self) -> Option<String> {
        if self.code == EapCode::Response && self.eap_type == Some(EAP_TYPE_IDENTITY) {
            Some(String::from_utf8_lossy(&self.data).into_owned())
        } else {
            None
        }
    }
}

/// The key information field of an EAPOL-Key frame (big endian u16).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyInformation(pub u16);

impl KeyInformation {
    /// Bits 0-2. 1 is HMAC-MD5/RC4, 2 is HMAC-SHA1/AES, 3 is AES-CMAC.
    pub fn descriptor_version(&self) -> u8 {
        (self.0 & 0x0007) as u8
    }

    pub fn pairwise(&self) -> bool {
        self.0 & 0x0008 != 0
    }

    pub fn key_index(&self) -> u8 {
        ((self.0 & 0x0030) >> 4) as u8
    }

    pub fn install(&self) -> bool {
        self.0 & 0x0040 != 0
    }

    pub fn ack(&self) -> bool {
        self.0 & 0x0080 != 0
    }

    pub fn mic(&self) -> bool {
        self.0 & 0x0100 != 0
    }

    pub fn secure(&self) -> bool {
        self.0 & 0x0200 != 0
    }

    pub fn error(&self) -> bool {
        self.0 & 0x0400 != 0
    }

    pub fn request(&self) -> bool {
        self.0 & 0x0800 != 0
    }

    pub fn encrypted_key_data(&self) -> bool {
        self.0 & 0x1000 != 0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum MessageType {
    Message1,
    Message2,
    Message3,
    Message4,
    Unknown,
}

impl MessageType {
    pub fn number(&self) -> Option<u8> {
        match self {
            MessageType::Message1 => Some(1),
            MessageType::Message2 => Some(2),
            MessageType::Message3 => Some(3),
            MessageType::Message4 => Some(4),
            MessageType::Unknown => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(number) => write!(f, "Message {number}"),
            None => write!(f, "Unknown Message"),
        }
    }
}

/// EAPOL-Key frame (802.1X type 3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EapolKey {
    pub protocol_version: u8,
    pub packet_length: u16,
    pub descriptor_type: u8,
    pub key_information: KeyInformation,
    pub key_length: u16,
    pub replay_counter: u64,
    pub key_nonce: [u8; 32],
    pub key_iv: [u8; 16],
    pub key_rsc: u64,
    pub key_id: u64,
    pub key_mic: [u8; 16],
    pub key_data_length: u16,
    pub key_data: Vec<u8>,
}

impl EapolKey {
    /// Position in the 4-way handshake, derived from the ACK, MIC and install bits.
    ///
    /// Message 2 and 4 only differ in whether they carry key data.
    pub fn message_type(&self) -> MessageType {
        let info = self.key_information;
        if info.ack() && !info.mic() && !info.install() {
            MessageType::Message1
        } else if info.mic() && !info.ack() && !info.install() {
            if self.key_data_length > 0 {
                MessageType::Message2
            } else {
                MessageType::Message4
            }
        } else if info.mic() && info.ack() {
            MessageType::Message3
        } else {
            MessageType::Unknown
        }
    }

    pub fn has_zero_nonce(&self) -> bool {
        self.key_nonce.iter().all(|byte| *byte == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(info: u16, key_data_length: u16) -> EapolKey {
        EapolKey {
            protocol_version: 2,
            packet_length: 95 + key_data_length,
            descriptor_type: 2,
            key_information: KeyInformation(info),
            key_length: 16,
            replay_counter: 1,
            key_nonce: [0; 32],
            key_iv: [0; 16],
            key_rsc: 0,
            key_id: 0,
            key_mic: [0; 16],
            key_data_length,
            key_data: vec![0; key_data_length as usize],
        }
    }

    #[test]
    fn test_message_numbers() {
        assert_eq!(key(0x008a, 0).message_type(), MessageType::Message1);
        assert_eq!(key(0x010a, 22).message_type(), MessageType::Message2);
        assert_eq!(key(0x13ca, 56).message_type(), MessageType::Message3);
        assert_eq!(key(0x030a, 0).message_type(), MessageType::Message4);
        assert_eq!(key(0x0000, 0).message_type(), MessageType::Unknown);
        assert_eq!(MessageType::Message3.to_string(), "Message 3");
    }

    #[test]
    fn test_key_information_bits() {
        let info = KeyInformation(0x13ca);
        assert_eq!(info.descriptor_version(), 2);
        assert!(info.pairwise());
        assert!(info.install());
        assert!(info.ack());
        assert!(info.mic());
        assert!(info.secure());
        assert!(info.encrypted_key_data());
        assert!(!info.error());
    }
}
