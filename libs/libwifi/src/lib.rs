/// Named alert conditions raised while dissecting.
pub mod alert;
/// [DissectorConfig] knobs.
pub mod config;
/// The [Cryptset](crypt::Cryptset) bitmask and the RSN/WPA suite mappings.
pub mod crypt;
/// The [dissect_frame] entry point.
mod dissect;
/// [DissectError](error::DissectError) and [WepError](error::WepError).
pub mod error;
/// Frame structs: MAC header, management fixed parameters, EAPOL.
pub mod frame;
/// Enums representing frame types and frame subtypes.
mod frame_types;
/// Information element (tag) decoding.
pub mod ie;
/// The per-packet [PacketInfo] record.
mod packinfo;
/// [nom] parsers for headers, fixed parameters and data payloads.
pub mod parsers;
/// All traits used or provided by this library.
mod traits;
/// RC4 decryption of WEP protected data frames.
pub mod wep;

use crate::error::DissectError;

// Re-exports for user convenience
pub use crate::config::DissectorConfig;
pub use crate::dissect::*;
pub use crate::frame_types::*;
pub use crate::packinfo::PacketInfo;
pub use crate::traits::*;

use crc::{Crc, CRC_32_ISO_HDLC};

// CRC algorithm for FCS calculation
const CRC_32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Verify and strip the trailing frame check sequence.
pub fn strip_fcs(input: &[u8]) -> Result<&[u8], DissectError> {
    DissectError::require(input, 4)?;

    let (frame_data, fcs_bytes) = input.split_at(input.len() - 4);
    let crc = CRC_32.checksum(frame_data);
    let fcs = u32::from_le_bytes([fcs_bytes[0], fcs_bytes[1], fcs_bytes[2], fcs_bytes[3]]);

    if crc != fcs {
        return Err(DissectError::corrupt(format!(
            "FCS mismatch {crc:08x} {fcs:08x}"
        )));
    }
    Ok(frame_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fcs() {
        let frame = [0xd4, 0x00, 0x00, 0x00, 1, 2, 3, 4, 5, 6];
        let mut with_fcs = frame.to_vec();
        with_fcs.extend_from_slice(&CRC_32.checksum(&frame).to_le_bytes());
        assert_eq!(strip_fcs(&with_fcs).unwrap(), &frame);

        with_fcs[4] ^= 0x01;
        assert!(strip_fcs(&with_fcs).is_err());
        assert!(strip_fcs(&[0x00, 0x01]).is_err());
    }
}
