use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Summary of the encryption a network advertises or a frame uses.
    ///
    /// Three axes share one mask: the protocol generation, the ciphers and the
    /// authentication (AKM) suites. A cipher or AKM bit is never set without a
    /// generation bit. The empty set means open.
    ///
    /// The EAP family ([Cryptset::EAP_FAMILY]) is outside that pairing. It comes from
    /// 802.1X traffic on the data path, which doesn't say which generation carried it.
    /// The remaining flags (migration mode, WPS, MFP) are markers on top of a
    /// generation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Cryptset: u64 {
        const WEP = 1 << 0;
        const WPA1 = 1 << 1;
        const WPA2 = 1 << 2;
        const WPA3 = 1 << 3;

        const WEP40 = 1 << 8;
        const WEP104 = 1 << 9;
        const TKIP = 1 << 10;
        const CCMP128 = 1 << 11;
        const CCMP256 = 1 << 12;
        const GCMP128 = 1 << 13;
        const GCMP256 = 1 << 14;
        const BIP_CMAC128 = 1 << 15;
        const BIP_CMAC256 = 1 << 16;
        const BIP_GMAC128 = 1 << 17;
        const BIP_GMAC256 = 1 << 18;

        const PSK = 1 << 24;
        const IEEE8021X = 1 << 25;
        const SAE = 1 << 26;
        const OWE = 1 << 27;
        const FT_PSK = 1 << 28;
        const FT_8021X = 1 << 29;
        const FT_SAE = 1 << 30;
        const SUITE_B = 1 << 31;
        const SUITE_B_192 = 1 << 32;
        const PSK_SHA256 = 1 << 33;
        const IEEE8021X_SHA256 = 1 << 34;
        const FILS = 1 << 35;

        const WPA_MIGMODE = 1 << 40;
        const WPS = 1 << 41;
        const MFP_CAPABLE = 1 << 42;
        const MFP_REQUIRED = 1 << 43;
        const EAP = 1 << 44;
        const LEAP = 1 << 45;
        const TLS = 1 << 46;
        const TTLS = 1 << 47;
        const PEAP = 1 << 48;

        const GENERATIONS = Self::WEP.bits() | Self::WPA1.bits() | Self::WPA2.bits() | Self::WPA3.bits();
        const EAP_FAMILY = Self::EAP.bits() | Self::LEAP.bits() | Self::TLS.bits() | Self::TTLS.bits() | Self::PEAP.bits();
    }
}

impl Cryptset {
    pub fn is_open(&self) -> bool {
        self.is_empty()
    }

    /// Strength of the best protocol generation in the set.
    ///
    /// 0 open, 1 WEP, 2 WPA1, 3 WPA2, 4 WPA3.
    pub fn generation_rank(&self) -> u8 {
        if self.contains(Cryptset::WPA3) {
            4
        } else if self.contains(Cryptset::WPA2) {
            3
        } else if self.contains(Cryptset::WPA1) {
            2
        } else if self.contains(Cryptset::WEP) {
            1
        } else {
            0
        }
    }

    /// True if `newer` advertises a weaker generation than `self`.
    pub fn is_downgraded_by(&self, newer: &Cryptset) -> bool {
        newer.generation_rank() < self.generation_rank()
    }

    /// Only the generation bits.
    pub fn generation(&self) -> Cryptset {
        self.intersection(Cryptset::GENERATIONS)
    }

    /// WPA1 with TKIP, also offering a WEP group key.
    fn with_migration_mode(mut self) -> Self {
        if self.contains(Cryptset::TKIP)
            && self.intersects(Cryptset::WEP40 | Cryptset::WEP104)
        {
            self |= Cryptset::WPA_MIGMODE;
        }
        self
    }
}

impl fmt::Display for Cryptset {
    /// Short operator friendly summary, e.g. `WPA2-PSK-CCMP`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            return write!(f, "OPEN");
        }

        let mut parts: Vec<&str> = Vec::new();
        for (name, flag) in [
            ("WPA3", Cryptset::WPA3),
            ("WPA2", Cryptset::WPA2),
            ("WPA", Cryptset::WPA1),
            ("WEP", Cryptset::WEP),
        ] {
            if self.contains(flag) {
                parts.push(name);
            }
        }
        for (name, flag) in [
            ("SAE", Cryptset::SAE | Cryptset::FT_SAE),
            ("OWE", Cryptset::OWE),
            ("PSK", Cryptset::PSK | Cryptset::FT_PSK | Cryptset::PSK_SHA256),
            ("EAP", Cryptset::IEEE8021X | Cryptset::FT_8021X | Cryptset::IEEE8021X_SHA256),
            ("SUITEB", Cryptset::SUITE_B | Cryptset::SUITE_B_192),
            ("FILS", Cryptset::FILS),
        ] {
            if self.intersects(flag) {
                parts.push(name);
            }
        }
        for (name, flag) in [
            ("GCMP", Cryptset::GCMP128 | Cryptset::GCMP256),
            ("CCMP", Cryptset::CCMP128 | Cryptset::CCMP256),
            ("TKIP", Cryptset::TKIP),
        ] {
            if self.intersects(flag) {
                parts.push(name);
            }
        }
        write!(f, "{}", parts.join("-"))
    }
}

/// Cipher suites, shared by the RSN element and the WPA vendor element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CipherSuite {
    /// Pairwise "use the group cipher".
    UseGroup,
    Wep40,
    Tkip,
    Ccmp128,
    Wep104,
    BipCmac128,
    GroupNotAllowed,
    Gcmp128,
    Gcmp256,
    Ccmp256,
    BipGmac128,
    BipGmac256,
    BipCmac256,
    Unknown([u8; 4]),
}

/// Authentication and key management suites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AkmSuite {
    Ieee8021X,
    Psk,
    FtIeee8021X,
    FtPsk,
    Ieee8021XSha256,
    PskSha256,
    Tdls,
    Sae,
    FtSae,
    SuiteB,
    SuiteB192,
    FtIeee8021XSha384,
    FilsSha256,
    FilsSha384,
    FtFilsSha256,
    FtFilsSha384,
    Owe,
    Unknown([u8; 4]),
}

pub const RSN_OUI: [u8; 3] = [0x00, 0x0f, 0xac];
pub const MSFT_OUI: [u8; 3] = [0x00, 0x50, 0xf2];

impl CipherSuite {
    /// Decode a 4 byte suite selector from an RSN element.
    pub fn from_rsn(suite: [u8; 4]) -> Self {
        if suite[..3] != RSN_OUI {
            return CipherSuite::Unknown(suite);
        }
        match suite[3] {
            0 => CipherSuite::UseGroup,
            1 => CipherSuite::Wep40,
            2 => CipherSuite::Tkip,
            4 => CipherSuite::Ccmp128,
            5 => CipherSuite::Wep104,
            6 => CipherSuite::BipCmac128,
            7 => CipherSuite::GroupNotAllowed,
            8 => CipherSuite::Gcmp128,
            9 => CipherSuite::Gcmp256,
            10 => CipherSuite::Ccmp256,
            11 => CipherSuite::BipGmac128,
            12 => CipherSuite::BipGmac256,
            13 => CipherSuite::BipCmac256,
            _ => CipherSuite::Unknown(suite),
        }
    }

    /// Decode a 4 byte suite selector from the Microsoft WPA element.
    pub fn from_wpa(suite: [u8; 4]) -> Self {
        if suite[..3] != MSFT_OUI {
            return CipherSuite::Unknown(suite);
        }
        match suite[3] {
            0 => CipherSuite::UseGroup,
            1 => CipherSuite::Wep40,
            2 => CipherSuite::Tkip,
            4 => CipherSuite::Ccmp128,
            5 => CipherSuite::Wep104,
            _ => CipherSuite::Unknown(suite),
        }
    }

    /// The cipher bit alone, without any generation.
    fn cipher_bits(&self) -> Cryptset {
        match self {
            CipherSuite::Wep40 => Cryptset::WEP40,
            CipherSuite::Wep104 => Cryptset::WEP104,
            CipherSuite::Tkip => Cryptset::TKIP,
            CipherSuite::Ccmp128 => Cryptset::CCMP128,
            CipherSuite::Ccmp256 => Cryptset::CCMP256,
            CipherSuite::Gcmp128 => Cryptset::GCMP128,
            CipherSuite::Gcmp256 => Cryptset::GCMP256,
            CipherSuite::BipCmac128 => Cryptset::BIP_CMAC128,
            CipherSuite::BipCmac256 => Cryptset::BIP_CMAC256,
            CipherSuite::BipGmac128 => Cryptset::BIP_GMAC128,
            CipherSuite::BipGmac256 => Cryptset::BIP_GMAC256,
            CipherSuite::UseGroup | CipherSuite::GroupNotAllowed | CipherSuite::Unknown(_) => {
                Cryptset::empty()
            }
        }
    }
}

impl AkmSuite {
    pub fn from_rsn(suite: [u8; 4]) -> Self {
        if suite[..3] != RSN_OUI {
            return AkmSuite::Unknown(suite);
        }
        match suite[3] {
            1 => AkmSuite::Ieee8021X,
            2 => AkmSuite::Psk,
            3 => AkmSuite::FtIeee8021X,
            4 => AkmSuite::FtPsk,
            5 => AkmSuite::Ieee8021XSha256,
            6 => AkmSuite::PskSha256,
            7 => AkmSuite::Tdls,
            8 => AkmSuite::Sae,
            9 => AkmSuite::FtSae,
            11 => AkmSuite::SuiteB,
            12 => AkmSuite::SuiteB192,
            13 => AkmSuite::FtIeee8021XSha384,
            14 => AkmSuite::FilsSha256,
            15 => AkmSuite::FilsSha384,
            16 => AkmSuite::FtFilsSha256,
            17 => AkmSuite::FtFilsSha384,
            18 => AkmSuite::Owe,
            _ => AkmSuite::Unknown(suite),
        }
    }

    pub fn from_wpa(suite: [u8; 4]) -> Self {
        if suite[..3] != MSFT_OUI {
            return AkmSuite::Unknown(suite);
        }
        match suite[3] {
            1 => AkmSuite::Ieee8021X,
            2 => AkmSuite::Psk,
            _ => AkmSuite::Unknown(suite),
        }
    }

    fn akm_bits(&self) -> Cryptset {
        match self {
            AkmSuite::Ieee8021X => Cryptset::IEEE8021X,
            AkmSuite::Psk => Cryptset::PSK,
            AkmSuite::FtIeee8021X | AkmSuite::FtIeee8021XSha384 => Cryptset::FT_8021X,
            AkmSuite::FtPsk => Cryptset::FT_PSK,
            AkmSuite::Ieee8021XSha256 => Cryptset::IEEE8021X_SHA256,
            AkmSuite::PskSha256 => Cryptset::PSK_SHA256,
            AkmSuite::Sae => Cryptset::SAE,
            AkmSuite::FtSae => Cryptset::FT_SAE,
            AkmSuite::SuiteB => Cryptset::SUITE_B,
            AkmSuite::SuiteB192 => Cryptset::SUITE_B_192,
            AkmSuite::FilsSha256
            | AkmSuite::FilsSha384
            | AkmSuite::FtFilsSha256
            | AkmSuite::FtFilsSha384 => Cryptset::FILS,
            AkmSuite::Owe => Cryptset::OWE,
            AkmSuite::Tdls | AkmSuite::Unknown(_) => Cryptset::empty(),
        }
    }

    /// The RSN generation this AKM implies.
    fn rsn_generation(&self) -> Cryptset {
        match self {
            AkmSuite::Sae | AkmSuite::FtSae | AkmSuite::Owe | AkmSuite::SuiteB192 => {
                Cryptset::WPA3
            }
            _ => Cryptset::WPA2,
        }
    }
}

/// Map an RSN cipher to its bits, tagged WPA2.
pub fn rsn_cipher(suite: &CipherSuite) -> Cryptset {
    let bits = suite.cipher_bits();
    if bits.is_empty() {
        bits
    } else {
        bits | Cryptset::WPA2
    }
}

/// Map an RSN AKM to its bits, tagged with the generation it implies.
pub fn rsn_akm(suite: &AkmSuite) -> Cryptset {
    let bits = suite.akm_bits();
    if bits.is_empty() {
        bits
    } else {
        bits | suite.rsn_generation()
    }
}

/// Map a WPA (vendor element) cipher to its bits, tagged WPA1.
pub fn wpa_cipher(suite: &CipherSuite) -> Cryptset {
    let bits = suite.cipher_bits();
    if bits.is_empty() {
        bits
    } else {
        bits | Cryptset::WPA1
    }
}

pub fn wpa_akm(suite: &AkmSuite) -> Cryptset {
    let bits = suite.akm_bits();
    if bits.is_empty() {
        bits
    } else {
        bits | Cryptset::WPA1
    }
}

/// Fold an RSN element into a cryptset.
///
/// The generation comes from the AKM suites. An element without any AKM is WPA2.
/// Every cipher is tagged with that generation.
pub fn resolve_rsn(
    group: &CipherSuite,
    pairwise: &[CipherSuite],
    akms: &[AkmSuite],
    group_management: Option<&CipherSuite>,
) -> Cryptset {
    let mut generation = akms
        .iter()
        .filter(|akm| !akm.akm_bits().is_empty())
        .fold(Cryptset::empty(), |set, akm| set | akm.rsn_generation());
    if generation.is_empty() {
        generation = Cryptset::WPA2;
    }

    let mut set = generation;
    for cipher in std::iter::once(group)
        .chain(pairwise.iter())
        .chain(group_management)
    {
        set |= cipher.cipher_bits();
    }
    for akm in akms {
        set |= akm.akm_bits();
    }
    set.with_migration_mode()
}

/// Fold a WPA vendor element into a cryptset.
pub fn resolve_wpa(group: &CipherSuite, pairwise: &[CipherSuite], akms: &[AkmSuite]) -> Cryptset {
    let mut set = Cryptset::WPA1;
    for cipher in std::iter::once(group).chain(pairwise.iter()) {
        set |= cipher.cipher_bits();
    }
    for akm in akms {
        set |= akm.akm_bits();
    }
    set.with_migration_mode()
}

/// Guess the cipher of a protected data frame from its first body bytes.
///
/// CCMP and TKIP both start with an 8 byte extended IV header. CCMP keeps byte 2
/// reserved (zero), TKIP sets the extended IV bit (0x20) in byte 1's WEP seed. Anything
/// else is WEP.
pub fn protected_data_cipher(body: &[u8]) -> Cryptset {
    if body.len() > 2 {
        if body[2] == 0 {
            return Cryptset::WPA2 | Cryptset::CCMP128;
        } else if body[1] & 0x20 != 0 {
            return Cryptset::WPA1 | Cryptset::TKIP;
        }
    }
    Cryptset::WEP
}
