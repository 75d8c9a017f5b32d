use byteorder::{BigEndian, ByteOrder};

use crate::error::DissectError;
use crate::ie::elements::munge_to_printable;

pub const ATTR_CONFIG_METHODS: u16 = 0x1008;
pub const ATTR_DEVICE_NAME: u16 = 0x1011;
pub const ATTR_MANUFACTURER: u16 = 0x1021;
pub const ATTR_MESSAGE_TYPE: u16 = 0x1022;
pub const ATTR_MODEL_NAME: u16 = 0x1023;
pub const ATTR_MODEL_NUMBER: u16 = 0x1024;
pub const ATTR_RF_BANDS: u16 = 0x103c;
pub const ATTR_SERIAL_NUMBER: u16 = 0x1042;
pub const ATTR_SETUP_STATE: u16 = 0x1044;
pub const ATTR_UUID_E: u16 = 0x1047;
pub const ATTR_VENDOR_EXTENSION: u16 = 0x1049;
pub const ATTR_VERSION: u16 = 0x104a;
pub const ATTR_PRIMARY_DEVICE_TYPE: u16 = 0x1054;
pub const ATTR_AP_SETUP_LOCKED: u16 = 0x1057;

/// WPS message type of the registrar's M3.
pub const MESSAGE_M3: u8 = 0x07;

/// Iterator over the big endian `(type: u16, length: u16, value)` attributes.
pub struct WpsAttributes<'a> {
    data: &'a [u8],
}

impl<'a> WpsAttributes<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WpsAttributes { data }
    }
}

impl<'a> Iterator for WpsAttributes<'a> {
    type Item = Result<(u16, &'a [u8]), DissectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        if self.data.len() < 4 {
            let available = self.data.len();
            self.data = &[];
            return Some(Err(DissectError::Truncated {
                needed: 4,
                available,
            }));
        }

        let kind = BigEndian::read_u16(&self.data[0..2]);
        let length = BigEndian::read_u16(&self.data[2..4]) as usize;
        if self.data.len() < 4 + length {
            let available = self.data.len();
            self.data = &[];
            return Some(Err(DissectError::Truncated {
                needed: 4 + length,
                available,
            }));
        }

        let value = &self.data[4..4 + length];
        self.data = &self.data[4 + length..];
        Some(Ok((kind, value)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WpsSetupState {
    #[default]
    NotConfigured,
    Configured,
}

/// WPS primary device type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceType {
    pub category: u16,
    pub oui: [u8; 4],
    pub subcategory: u16,
}

impl DeviceType {
    pub fn category_name(&self) -> &'static str {
        match self.category {
            0x0001 => "Computer",
            0x0002 => "Input Device",
            0x0003 => "Printer/Scanner/Fax/Copier",
            0x0004 => "Camera",
            0x0005 => "Storage",
            0x0006 => "Network Infrastructure",
            0x0007 => "Display",
            0x0008 => "Multimedia Device",
            0x0009 => "Gaming Device",
            0x000a => "Telephone",
            0x000b => "Audio Device",
            0x000c => "Docking Device",
            _ => "Unknown",
        }
    }

    /// Subcategories for the categories that show up on access points.
    pub fn subcategory_name(&self) -> Option<&'static str> {
        let name = match (self.category, self.subcategory) {
            (0x0001, 0x0001) => "PC",
            (0x0001, 0x0002) => "Server",
            (0x0001, 0x0005) => "Notebook",
            (0x0001, 0x0009) => "Tablet",
            (0x0006, 0x0001) => "AP",
            (0x0006, 0x0002) => "Router",
            (0x0006, 0x0003) => "Switch",
            (0x0006, 0x0004) => "Gateway",
            (0x0006, 0x0005) => "Bridge",
            (0x0007, 0x0001) => "Television",
            (0x0008, 0x0004) => "Set-Top Box",
            (0x000a, 0x0005) => "Smartphone",
            _ => return None,
        };
        Some(name)
    }
}

/// WPS vendor element (00:50:F2 type 4).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WpsInformation {
    pub version: Option<u8>,
    pub setup_state: Option<WpsSetupState>,
    pub ap_setup_locked: bool,
    pub config_methods: Option<u16>,
    pub device_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub uuid_e: Option<[u8; 16]>,
    pub rf_bands: Option<u8>,
    pub primary_device_type: Option<DeviceType>,
}

impl WpsInformation {
    pub fn is_configured(&self) -> bool {
        self.setup_state == Some(WpsSetupState::Configured)
    }
}

fn text(value: &[u8]) -> Option<String> {
    let text = munge_to_printable(value);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse the WPS attributes following the OUI and OUI type.
pub fn parse_wps_information(data: &[u8]) -> Result<WpsInformation, DissectError> {
    let mut wps = WpsInformation::default();

    for attribute in WpsAttributes::new(data) {
        let (kind, value) = attribute?;
        match kind {
            ATTR_VERSION => wps.version = value.first().copied(),
            ATTR_SETUP_STATE => {
                wps.setup_state = match value.first() {
                    Some(0x01) => Some(WpsSetupState::NotConfigured),
                    Some(0x02) => Some(WpsSetupState::Configured),
                    _ => return Err(DissectError::corrupt("Invalid WPS setup state")),
                }
            }
            ATTR_AP_SETUP_LOCKED => wps.ap_setup_locked = value.first().is_some_and(|v| *v != 0),
            ATTR_CONFIG_METHODS if value.len() == 2 => {
                wps.config_methods = Some(BigEndian::read_u16(value))
            }
            ATTR_DEVICE_NAME => wps.device_name = text(value),
            ATTR_MANUFACTURER => wps.manufacturer = text(value),
            ATTR_MODEL_NAME => wps.model = text(value),
            ATTR_MODEL_NUMBER => wps.model_number = text(value),
            ATTR_SERIAL_NUMBER => wps.serial_number = text(value),
            ATTR_UUID_E if value.len() == 16 => {
                let mut uuid = [0u8; 16];
                uuid.copy_from_slice(value);
                wps.uuid_e = Some(uuid);
            }
            ATTR_RF_BANDS => wps.rf_bands = value.first().copied(),
            ATTR_PRIMARY_DEVICE_TYPE if value.len() == 8 => {
                wps.primary_device_type = Some(DeviceType {
                    category: BigEndian::read_u16(&value[0..2]),
                    oui: [value[2], value[3], value[4], value[5]],
                    subcategory: BigEndian::read_u16(&value[6..8]),
                });
            }
            _ => {}
        }
    }

    Ok(wps)
}

/// The WPS message type carried by an attribute list, if any.
pub fn message_type(data: &[u8]) -> Option<u8> {
    WpsAttributes::new(data)
        .map_while(Result::ok)
        .find(|(kind, _)| *kind == ATTR_MESSAGE_TYPE)
        .and_then(|(_, value)| value.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wps() {
        let data = [
            0x10, 0x4a, 0x00, 0x01, 0x10, // version 1.0
            0x10, 0x44, 0x00, 0x01, 0x02, // configured
            0x10, 0x57, 0x00, 0x01, 0x01, // locked
            0x10, 0x21, 0x00, 0x04, b'A', b'C', b'M', b'E', // manufacturer
            0x10, 0x54, 0x00, 0x08, 0x00, 0x06, 0x00, 0x50, 0xf2, 0x04, 0x00, 0x01, // AP
            0x10, 0x11, 0x00, 0x03, b'r', b't', b'r', // device name
        ];
        let wps = parse_wps_information(&data).unwrap();
        assert_eq!(wps.version, Some(0x10));
        assert!(wps.is_configured());
        assert!(wps.ap_setup_locked);
        assert_eq!(wps.manufacturer.as_deref(), Some("ACME"));
        assert_eq!(wps.device_name.as_deref(), Some("rtr"));
        let device = wps.primary_device_type.unwrap();
        assert_eq!(device.category_name(), "Network Infrastructure");
        assert_eq!(device.subcategory_name(), Some("AP"));
    }

    #[test]
    fn test_overlong_attribute() {
        let data = [0x10, 0x11, 0x00, 0x10, b'x'];
        assert!(parse_wps_information(&data).is_err());
    }

    #[test]
    fn test_message_type() {
        let data = [0x10, 0x4a, 0x00, 0x01, 0x10, 0x10, 0x22, 0x00, 0x01, 0x07];
        assert_eq!(message_type(&data), Some(MESSAGE_M3));
        assert_eq!(message_type(&data[..5]), None);
    }
}
