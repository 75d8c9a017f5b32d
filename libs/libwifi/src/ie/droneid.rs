use byteorder::{ByteOrder, LittleEndian};

use crate::error::DissectError;
use crate::ie::elements::munge_to_printable;

/// DJI vendor OUI used by the DroneID beacon element.
pub const DJI_OUI: [u8; 3] = [0x26, 0x37, 0x12];

const SUBCOMMAND_FLIGHT_REG: u8 = 0x10;
const SUBCOMMAND_FLIGHT_PURPOSE: u8 = 0x11;

/// Raw angle units are centi-degrees expressed in radians * 100.
const RAW_ANGLE_SCALE: f64 = 100.0 * 57.296;
/// Raw coordinates are radians * 10^7.
const RAW_COORD_SCALE: f64 = 174_533.0;

fn cstr(data: &[u8]) -> String {
    munge_to_printable(data)
}

/// Telemetry record broadcast by DJI aircraft.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightRegistration {
    pub version: u8,
    pub sequence: u16,
    pub state_info: u16,
    pub serial_number: String,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: i16,
    pub height: i16,
    pub velocity_north: i16,
    pub velocity_east: i16,
    pub velocity_up: i16,
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
    pub home_longitude: f64,
    pub home_latitude: f64,
    pub product_type: u8,
    pub uuid: Vec<u8>,
}

impl FlightRegistration {
    const LEN: usize = 1 + 2 + 2 + 16 + 4 + 4 + 2 * 8 + 4 + 4 + 1 + 1 + 20;

    fn parse(data: &[u8]) -> Result<Self, DissectError> {
        DissectError::require(data, Self::LEN)?;

        let raw_angle = |offset: usize| LittleEndian::read_i16(&data[offset..]) as f64;
        let raw_coord = |offset: usize| LittleEndian::read_i32(&data[offset..]) as f64;
        let uuid_len = (data[54] as usize).min(20);

        Ok(FlightRegistration {
            version: data[0],
            sequence: LittleEndian::read_u16(&data[1..]),
            state_info: LittleEndian::read_u16(&data[3..]),
            serial_number: cstr(&data[5..21]),
            longitude: raw_coord(21) / RAW_COORD_SCALE,
            latitude: raw_coord(25) / RAW_COORD_SCALE,
            altitude: LittleEndian::read_i16(&data[29..]),
            height: LittleEndian::read_i16(&data[31..]),
            velocity_north: LittleEndian::read_i16(&data[33..]),
            velocity_east: LittleEndian::read_i16(&data[35..]),
            velocity_up: LittleEndian::read_i16(&data[37..]),
            pitch: raw_angle(39) / RAW_ANGLE_SCALE,
            roll: raw_angle(41) / RAW_ANGLE_SCALE,
            yaw: raw_angle(43) / RAW_ANGLE_SCALE,
            home_longitude: raw_coord(45) / RAW_COORD_SCALE,
            home_latitude: raw_coord(49) / RAW_COORD_SCALE,
            product_type: data[53],
            uuid: data[55..55 + uuid_len].to_vec(),
        })
    }

    pub fn serial_valid(&self) -> bool {
        self.state_info & 0x0001 != 0
    }

    pub fn gps_valid(&self) -> bool {
        self.state_info & 0x0040 != 0
    }

    pub fn motor_on(&self) -> bool {
        self.state_info & 0x0010 != 0
    }

    pub fn in_air(&self) -> bool {
        self.state_info & 0x0020 != 0
    }
}

/// Operator supplied flight purpose record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightPurpose {
    pub serial_number: String,
    pub drone_id: String,
    pub purpose: String,
}

impl FlightPurpose {
    fn parse(data: &[u8]) -> Result<Self, DissectError> {
        // serial(16), len(u64), id(10), purpose_len(u64), purpose
        DissectError::require(data, 16 + 8 + 10 + 8)?;
        Ok(FlightPurpose {
            serial_number: cstr(&data[0..16]),
            drone_id: cstr(&data[24..34]),
            purpose: cstr(&data[42..]),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DroneId {
    FlightRegistration(FlightRegistration),
    FlightPurpose(FlightPurpose),
    Other { subcommand: u8 },
}

/// Parse the element body following the DJI OUI.
pub fn parse_droneid(data: &[u8]) -> Result<DroneId, DissectError> {
    // vendor type, two unknown bytes, subcommand
    DissectError::require(data, 4)?;
    let record = &data[4..];
    match data[3] {
        SUBCOMMAND_FLIGHT_REG => Ok(DroneId::FlightRegistration(FlightRegistration::parse(
            record,
        )?)),
        SUBCOMMAND_FLIGHT_PURPOSE => Ok(DroneId::FlightPurpose(FlightPurpose::parse(record)?)),
        subcommand => Ok(DroneId::Other { subcommand }),
    }
}
