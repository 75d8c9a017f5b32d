use nom::bytes::complete::take;
use nom::combinator::map;
use nom::multi::count;
use nom::number::complete::le_u16;
use nom::IResult;

use crate::crypt::{AkmSuite, CipherSuite};
use crate::error::DissectError;
use crate::parsers::clone_slice;

/// Tag 48, the RSN element.
///
/// Everything after the pairwise cipher list is optional on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsnInformation {
    pub version: u16,
    pub group_cipher: CipherSuite,
    pub pairwise_ciphers: Vec<CipherSuite>,
    pub akm_suites: Vec<AkmSuite>,
    pub capabilities: u16,
    pub pre_auth: bool,
    pub no_pairwise: bool,
    pub mfp_required: bool,
    pub mfp_capable: bool,
    pub pmkids: Vec<[u8; 16]>,
    pub group_management_cipher: Option<CipherSuite>,
}

/// The Microsoft WPA vendor element (00:50:F2 type 1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WpaInformation {
    pub version: u16,
    pub group_cipher: CipherSuite,
    pub pairwise_ciphers: Vec<CipherSuite>,
    pub akm_suites: Vec<AkmSuite>,
}

fn u16_le(input: &[u8]) -> IResult<&[u8], u16> {
    le_u16(input)
}

fn suite(input: &[u8]) -> IResult<&[u8], [u8; 4]> {
    map(take(4usize), clone_slice::<4>)(input)
}

/// Trailing fields may be left out, but a field that is started must be complete.
fn optional<'a, O>(
    input: &'a [u8],
    parser: impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
) -> IResult<&'a [u8], Option<O>> {
    if input.is_empty() {
        Ok((input, None))
    } else {
        map(parser, Some)(input)
    }
}

fn suite_list(input: &[u8]) -> IResult<&[u8], Vec<[u8; 4]>> {
    let (input, number) = le_u16(input)?;
    count(suite, number as usize)(input)
}

/// Parse the value of an RSN element.
pub fn parse_rsn_information(data: &[u8]) -> Result<RsnInformation, DissectError> {
    let (input, version) = u16_le(data)?;
    if version != 1 {
        return Err(DissectError::corrupt(format!(
            "Unsupported RSN version {version}"
        )));
    }
    let (input, group) = suite(input)?;

    // Pairwise and AKM lists may be omitted at the end of the element.
    let (input, pairwise) = optional(input, suite_list)?;
    let (input, akms) = if pairwise.is_some() {
        optional(input, suite_list)?
    } else {
        (input, None)
    };
    let (input, capabilities) = if akms.is_some() {
        optional(input, u16_le)?
    } else {
        (input, None)
    };
    let (input, pmkids) = if capabilities.is_some() {
        optional(input, suite_list_pmkid)?
    } else {
        (input, None)
    };
    let (_, group_management) = if pmkids.is_some() {
        optional(input, suite)?
    } else {
        (input, None)
    };

    let capabilities = capabilities.unwrap_or(0);
    Ok(RsnInformation {
        version,
        group_cipher: CipherSuite::from_rsn(group),
        pairwise_ciphers: pairwise
            .unwrap_or_default()
            .into_iter()
            .map(CipherSuite::from_rsn)
            .collect(),
        akm_suites: akms
            .unwrap_or_default()
            .into_iter()
            .map(AkmSuite::from_rsn)
            .collect(),
        capabilities,
        pre_auth: capabilities & (1 << 0) != 0,
        no_pairwise: capabilities & (1 << 1) != 0,
        mfp_required: capabilities & (1 << 6) != 0,
        mfp_capable: capabilities & (1 << 7) != 0,
        pmkids: pmkids.unwrap_or_default(),
        group_management_cipher: group_management.map(CipherSuite::from_rsn),
    })
}

fn suite_list_pmkid(input: &[u8]) -> IResult<&[u8], Vec<[u8; 16]>> {
    let (input, number) = le_u16(input)?;
    count(map(take(16usize), clone_slice::<16>), number as usize)(input)
}

/// Parse the WPA vendor element, starting after the OUI and OUI type.
pub fn parse_wpa_information(data: &[u8]) -> Result<WpaInformation, DissectError> {
    let (input, version) = u16_le(data)?;
    if version != 1 {
        return Err(DissectError::corrupt(format!(
            "Unsupported WPA version {version}"
        )));
    }
    let (input, group) = suite(input)?;
    let (input, pairwise) = optional(input, suite_list)?;
    let (_, akms) = if pairwise.is_some() {
        optional(input, suite_list)?
    } else {
        (input, None)
    };

    Ok(WpaInformation {
        version,
        group_cipher: CipherSuite::from_wpa(group),
        pairwise_ciphers: pairwise
            .unwrap_or_default()
            .into_iter()
            .map(CipherSuite::from_wpa)
            .collect(),
        akm_suites: akms
            .unwrap_or_default()
            .into_iter()
            .map(AkmSuite::from_wpa)
            .collect(),
    })
}
