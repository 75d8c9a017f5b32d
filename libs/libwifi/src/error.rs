use nom::Needed;

/// Hard dissection failures.
///
/// Any of these mean the frame can't be trusted any further. The dissector marks the
/// packet corrupt and stops processing its content. Cosmetic problems, such as a vendor
/// element we don't understand, never surface as a `DissectError`; the affected field
/// is simply left unset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DissectError {
    /// The buffer is shorter than the frame type requires.
    #[error("Frame truncated: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The frame is long enough but its content is structurally invalid.
    #[error("Corrupt frame: {0}")]
    Corrupt(String),

    /// A nom parser ran out of input in the middle of a structure.
    #[error("There wasn't enough data. {0}")]
    Incomplete(String),

    #[error("Cannot dissect this protocol: {0}")]
    UnhandledProtocol(String),
}

impl DissectError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        DissectError::Corrupt(reason.into())
    }

    /// Check that `data` holds at least `needed` bytes.
    pub fn require(data: &[u8], needed: usize) -> Result<(), DissectError> {
        if data.len() < needed {
            Err(DissectError::Truncated {
                needed,
                available: data.len(),
            })
        } else {
            Ok(())
        }
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for DissectError {
    /// nom errors borrow the input slice, which we can't carry around in the packet
    /// record, so only the error kind is kept.
    fn from(error: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match error {
            nom::Err::Incomplete(needed) => match needed {
                Needed::Size(size) => {
                    DissectError::Incomplete(format!("At least {size} bytes are missing"))
                }
                Needed::Unknown => DissectError::Incomplete(String::new()),
            },
            nom::Err::Failure(error) | nom::Err::Error(error) => DissectError::Corrupt(format!(
                "parser failed with {:?} ({} bytes left)",
                error.code,
                error.input.len()
            )),
        }
    }
}

/// Failures of the WEP decryptor. None of these mark the packet corrupt.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WepError {
    #[error("Frame is not a protected data frame")]
    NotProtected,
    #[error("Frame too short to hold IV, payload and ICV")]
    TooShort,
    #[error("WEP keys must be 5, 13 or 16 bytes, got {0}")]
    BadKeyLength(usize),
    #[error("ICV mismatch, wrong key")]
    IcvMismatch,
    #[error("RC4 needs a key of at least one byte")]
    EmptyKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::bytes::complete::take;
    use nom::IResult;

    fn take_four(input: &[u8]) -> IResult<&[u8], &[u8]> {
        take(4usize)(input)
    }

    #[test]
    fn test_nom_error_is_corrupt() {
        let err: DissectError = take_four(&[1, 2]).unwrap_err().into();
        assert!(matches!(err, DissectError::Corrupt(_)));
    }

    #[test]
    fn test_require() {
        assert!(DissectError::require(&[0; 10], 10).is_ok());
        assert_eq!(
            DissectError::require(&[0; 9], 10),
            Err(DissectError::Truncated {
                needed: 10,
                available: 9
            })
        );
    }
}
