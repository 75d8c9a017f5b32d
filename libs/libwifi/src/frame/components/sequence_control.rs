/// Bytes 22-23 of the MAC header.
///
/// Little endian u16: bits 0-3 are the fragment number, bits 4-15 the sequence number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceControl {
    pub fragment_number: u8,
    pub sequence_number: u16,
}

impl SequenceControl {
    pub fn from_raw(raw: u16) -> Self {
        SequenceControl {
            fragment_number: (raw & 0x000f) as u8,
            sequence_number: raw >> 4,
        }
    }

    pub fn encode(&self) -> [u8; 2] {
        let raw = (self.sequence_number << 4) | (self.fragment_number as u16 & 0x000f);
        raw.to_le_bytes()
    }
}
