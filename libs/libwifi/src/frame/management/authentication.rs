use libwifi_macros::AddressHeader;

use crate::frame::components::*;

#[derive(Clone, Debug, AddressHeader)]
pub struct Authentication {
    pub header: MacHeader,
    pub auth_algorithm: u16,
    pub auth_seq: u16,
    pub status_code: u16,
}

impl Authentication {
    pub fn is_open_system(&self) -> bool {
        self.auth_algorithm == 0
    }

    pub fn is_sae(&self) -> bool {
        self.auth_algorithm == 3
    }
}

#[derive(Clone, Debug, AddressHeader)]
pub struct Deauthentication {
    pub header: MacHeader,
    pub reason_code: ReasonCode,
}

/// Reason codes 25 to 31 and anything above 45 are not legal on the air.
pub fn reason_code_is_valid(code: u16) -> bool {
    !((25..=31).contains(&code) || code > 45)
}

/// The reason code of deauthentication and disassociation frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReasonCode(pub u16);

impl ReasonCode {
    pub fn is_valid(&self) -> bool {
        reason_code_is_valid(self.0)
    }

    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Reserved",
            1 => "Unspecified reason",
            2 => "Previous authentication no longer valid",
            3 => "Station is leaving",
            4 => "Disassociated due to inactivity",
            5 => "AP unable to handle all associated stations",
            6 => "Class 2 frame received from nonauthenticated station",
            7 => "Class 3 frame received from nonassociated station",
            8 => "Station is leaving the BSS",
            9 => "Station requesting association is not authenticated",
            10 => "Power capability unacceptable",
            11 => "Supported channels unacceptable",
            12 => "BSS transition management",
            13 => "Invalid information element",
            14 => "MIC failure",
            15 => "4-way handshake timeout",
            16 => "Group key handshake timeout",
            17 => "Information element in 4-way handshake differs",
            18 => "Invalid group cipher",
            19 => "Invalid pairwise cipher",
            20 => "Invalid AKMP",
            21 => "Unsupported RSN element version",
            22 => "Invalid RSN element capabilities",
            23 => "IEEE 802.1X authentication failed",
            24 => "Cipher suite rejected by security policy",
            32..=45 => "QoS or mesh related reason",
            _ => "Illegal reason code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_code_ranges() {
        for code in 0..=24 {
            assert!(reason_code_is_valid(code), "{code}");
        }
        for code in 25..=31 {
            assert!(!reason_code_is_valid(code), "{code}");
        }
        assert!(reason_code_is_valid(32));
        assert!(reason_code_is_valid(45));
        assert!(!reason_code_is_valid(46));
        assert!(!ReasonCode(0xffff).is_valid());
        assert_eq!(ReasonCode(27).description(), "Illegal reason code");
    }
}
