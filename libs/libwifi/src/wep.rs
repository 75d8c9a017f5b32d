//! WEP (RC4 + CRC32 ICV) decryption.
//!
//! The cipher itself is a pure function over a frame and a key. Where keys come from
//! is left to a [KeyStore], which the capture session owns.
use std::collections::HashMap;

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::crypt::{protected_data_cipher, Cryptset};
use crate::error::WepError;
use crate::frame::components::MacAddress;
use crate::frame_types::{FrameSubType, FrameType};
use crate::parsers::parse_mac_header;
use crate::Addresses;

/// The ICV is the standard Ethernet CRC32.
const ICV_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// 3 byte IV and the key index byte in front of the payload.
pub const WEP_IV_LEN: usize = 4;
pub const WEP_ICV_LEN: usize = 4;
/// Bytes a WEP frame grows by over its plaintext.
pub const WEP_OVERHEAD: usize = WEP_IV_LEN + WEP_ICV_LEN;

/// WEP-40, WEP-104 and the rare 128 bit vendor keys.
pub const WEP_KEY_LENGTHS: [usize; 3] = [5, 13, 16];

pub fn valid_key_length(length: usize) -> bool {
    WEP_KEY_LENGTHS.contains(&length)
}

/// RC4 keystream generator.
#[derive(Clone)]
pub struct Rc4 {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Run the key scheduling over `key`.
    pub fn new(key: &[u8]) -> Result<Self, WepError> {
        if key.is_empty() {
            return Err(WepError::EmptyKey);
        }
        let mut state = [0u8; 256];
        for (index, value) in state.iter_mut().enumerate() {
            *value = index as u8;
        }

        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        Ok(Rc4 { state, i: 0, j: 0 })
    }

    pub fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);
        let index = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[index as usize]
    }

    /// XOR the keystream into `data`.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.next_byte();
        }
    }
}

/// Source of WEP keys, looked up by BSSID.
///
/// Shared read-mostly between dissection threads, so implementations handle their own
/// locking.
pub trait KeyStore {
    fn key_for(&self, bssid: &MacAddress) -> Option<Vec<u8>>;

    /// Called after every decryption attempt with a key from this store.
    fn record_result(&self, _bssid: &MacAddress, _decrypted: bool) {}
}

impl KeyStore for HashMap<MacAddress, Vec<u8>> {
    fn key_for(&self, bssid: &MacAddress) -> Option<Vec<u8>> {
        self.get(bssid).cloned()
    }
}

/// Decrypt the WEP body of `frame`, which starts at `header_offset`.
///
/// Returns a copy of the frame with the IV and ICV removed, the plaintext directly
/// following the header, and the protected flag cleared. Fails if the recomputed
/// CRC32 doesn't match the ICV.
pub fn decrypt_wep(frame: &[u8], header_offset: usize, key: &[u8]) -> Result<Vec<u8>, WepError> {
    if !valid_key_length(key.len()) {
        return Err(WepError::BadKeyLength(key.len()));
    }
    if frame.len() < header_offset || frame.len() - header_offset <= WEP_OVERHEAD {
        return Err(WepError::TooShort);
    }

    let iv = &frame[header_offset..header_offset + 3];
    let mut seed = Vec::with_capacity(3 + key.len());
    seed.extend_from_slice(iv);
    seed.extend_from_slice(key);
    let mut rc4 = Rc4::new(&seed)?;

    let payload_start = header_offset + WEP_IV_LEN;
    let icv_start = frame.len() - WEP_ICV_LEN;

    let mut decrypted = Vec::with_capacity(frame.len() - WEP_OVERHEAD);
    decrypted.extend_from_slice(&frame[..header_offset]);
    decrypted.extend_from_slice(&frame[payload_start..icv_start]);
    rc4.apply(&mut decrypted[header_offset..]);

    let mut icv = ICV_CRC.checksum(&decrypted[header_offset..]).to_le_bytes();
    rc4.apply(&mut icv);
    if icv != frame[icv_start..] {
        return Err(WepError::IcvMismatch);
    }

    decrypted[1] &= !0x40;
    Ok(decrypted)
}

/// Try to decrypt a raw 802.11 frame with a key from `keys`.
///
/// Only protected `Data` and `QosData` frames whose body looks like WEP are candidates.
/// `Ok(None)` means the frame isn't a candidate or there's no key for its BSSID.
pub fn decrypt_frame(frame: &[u8], keys: &dyn KeyStore) -> Result<Option<Vec<u8>>, WepError> {
    let Ok((_, header)) = parse_mac_header(frame) else {
        return Ok(None);
    };
    let frame_control = &header.frame_control;
    if frame_control.frame_type != FrameType::Data
        || !matches!(
            frame_control.frame_subtype,
            FrameSubType::Data | FrameSubType::QosData
        )
    {
        return Ok(None);
    }
    if !frame_control.protected() {
        return Err(WepError::NotProtected);
    }

    let mut header_offset = header.len();
    if frame_control.frame_subtype.is_qos() {
        header_offset += 2;
    }
    let body = frame.get(header_offset..).unwrap_or_default();
    if protected_data_cipher(body) != Cryptset::WEP {
        return Ok(None);
    }

    let Some(bssid) = header.bssid().copied() else {
        return Ok(None);
    };
    let Some(key) = keys.key_for(&bssid) else {
        return Ok(None);
    };

    let result = decrypt_wep(frame, header_offset, &key);
    keys.record_result(&bssid, result.is_ok());
    result.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keystream(key: &[u8], length: usize) -> Vec<u8> {
        let mut rc4 = Rc4::new(key).unwrap();
        (0..length).map(|_| rc4.next_byte()).collect()
    }

    #[test]
    fn test_rc4_vectors() {
        let mut data = b"Plaintext".to_vec();
        Rc4::new(b"Key").unwrap().apply(&mut data);
        assert_eq!(data, [0xbb, 0xf3, 0x16, 0xe8, 0xd9, 0x40, 0xaf, 0x0a, 0xd3]);

        let mut data = b"pedia".to_vec();
        Rc4::new(b"Wiki").unwrap().apply(&mut data);
        assert_eq!(data, [0x10, 0x21, 0xbf, 0x04, 0x20]);

        let mut data = b"Attack at dawn".to_vec();
        Rc4::new(b"Secret").unwrap().apply(&mut data);
        assert_eq!(
            data,
            [0x45, 0xa0, 0x1f, 0x64, 0x5f, 0xc3, 0x5b, 0x38, 0x35, 0x52, 0x54, 0x4b, 0x9b, 0xf5]
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(matches!(Rc4::new(&[]), Err(WepError::EmptyKey)));
    }

    #[test]
    fn test_keystream_is_deterministic() {
        assert_eq!(keystream(b"\x01\x02\x03abcde", 16), keystream(b"\x01\x02\x03abcde", 16));
        assert_ne!(keystream(b"\x01\x02\x03abcde", 16), keystream(b"\x01\x02\x03abcdf", 16));
    }

    #[test]
    fn test_bad_inputs() {
        assert_eq!(
            decrypt_wep(&[0u8; 40], 24, b"abc"),
            Err(WepError::BadKeyLength(3))
        );
        assert_eq!(decrypt_wep(&[0u8; 32], 24, b"abcde"), Err(WepError::TooShort));
        assert_eq!(decrypt_wep(&[0u8; 20], 24, b"abcde"), Err(WepError::TooShort));
    }
}
