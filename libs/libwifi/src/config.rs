use crate::ie::TagKey;

/// Largest management frame we accept before calling it corrupt.
pub const MAX_MGMT_LEN: usize = 512;
/// Largest control (phy) frame we accept before calling it corrupt.
pub const MAX_PHY_LEN: usize = 128;

/// Knobs for [crate::dissect_frame].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DissectorConfig {
    pub max_mgmt_len: usize,
    pub max_phy_len: usize,
    /// Tolerate a truncated trailing tag instead of marking the frame corrupt.
    pub weak_dissect: bool,
    /// Tag identities hashed into the IE fingerprint, in this order.
    pub fingerprint_tags: Vec<TagKey>,
}

impl Default for DissectorConfig {
    fn default() -> Self {
        DissectorConfig {
            max_mgmt_len: MAX_MGMT_LEN,
            max_phy_len: MAX_PHY_LEN,
            weak_dissect: false,
            fingerprint_tags: default_fingerprint_tags(),
        }
    }
}

pub fn default_fingerprint_tags() -> Vec<TagKey> {
    let mut tags: Vec<TagKey> = [0, 1, 45, 48, 50, 61, 127, 191]
        .into_iter()
        .map(TagKey::number)
        .collect();
    tags.push(TagKey::vendor(221, [0x00, 0x50, 0xf2], 1));
    tags.push(TagKey::vendor(221, [0x00, 0x50, 0xf2], 4));
    tags
}

/// Parse a comma separated list of tag identities, e.g. `0,1,48,221-0050f2-4`.
pub fn parse_fingerprint_tags(input: &str) -> Result<Vec<TagKey>, String> {
    input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fingerprint_tags() {
        let tags = parse_fingerprint_tags("0, 48,221-0050f2-4").unwrap();
        assert_eq!(
            tags,
            vec![
                TagKey::number(0),
                TagKey::number(48),
                TagKey::vendor(221, [0x00, 0x50, 0xf2], 4)
            ]
        );
        assert!(parse_fingerprint_tags("0,abc").is_err());
        assert_eq!(default_fingerprint_tags().len(), 10);
    }
}
