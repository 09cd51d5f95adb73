//! Vehicle position report wire format
//!
//! One report per text line, seven comma-separated fields:
//!
//! ```text
//! vehicleLat,vehicleLon,prevVehicleLat,prevVehicleLon,startId,destId,nextId
//! 22.309000,73.138000,22.308500,73.138000,1,5,5
//! ```

use std::fmt;
use std::str::FromStr;

use crate::signals::{valid_latitude, valid_longitude};

/// Number of comma-separated fields in a report line
pub const REPORT_FIELD_COUNT: usize = 7;

const FIELD_NAMES: [&str; REPORT_FIELD_COUNT] = [
    "vehicle_lat",
    "vehicle_lon",
    "prev_vehicle_lat",
    "prev_vehicle_lon",
    "start_id",
    "dest_id",
    "next_id",
];

/// A single decoded position report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReport {
    pub vehicle_lat: f64,
    pub vehicle_lon: f64,
    /// Previous fix; validated but not used for alerting
    pub prev_vehicle_lat: f64,
    pub prev_vehicle_lon: f64,
    pub start_id: u32,
    pub dest_id: u32,
    pub next_id: u32,
}

/// Reasons a report line is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ParseReportError {
    /// Line does not split into exactly seven fields
    FieldCount { expected: usize, actual: usize },
    /// A coordinate field is not a number
    InvalidNumber { field: &'static str, value: String },
    /// A waypoint id field is not a non-negative integer
    InvalidId { field: &'static str, value: String },
    /// A coordinate parsed but is NaN/infinite or outside the valid range
    CoordinateOutOfRange { field: &'static str, value: f64 },
}

impl fmt::Display for ParseReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseReportError::FieldCount { expected, actual } => {
                write!(f, "expected {} fields, got {}", expected, actual)
            }
            ParseReportError::InvalidNumber { field, value } => {
                write!(f, "{} is not a number: '{}'", field, value)
            }
            ParseReportError::InvalidId { field, value } => {
                write!(f, "{} is not a waypoint id: '{}'", field, value)
            }
            ParseReportError::CoordinateOutOfRange { field, value } => {
                write!(f, "{} out of range: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ParseReportError {}

impl FromStr for PositionReport {
    type Err = ParseReportError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();

        if fields.len() != REPORT_FIELD_COUNT {
            return Err(ParseReportError::FieldCount {
                expected: REPORT_FIELD_COUNT,
                actual: fields.len(),
            });
        }

        Ok(PositionReport {
            vehicle_lat: parse_latitude(fields[0], FIELD_NAMES[0])?,
            vehicle_lon: parse_longitude(fields[1], FIELD_NAMES[1])?,
            prev_vehicle_lat: parse_latitude(fields[2], FIELD_NAMES[2])?,
            prev_vehicle_lon: parse_longitude(fields[3], FIELD_NAMES[3])?,
            start_id: parse_id(fields[4], FIELD_NAMES[4])?,
            dest_id: parse_id(fields[5], FIELD_NAMES[5])?,
            next_id: parse_id(fields[6], FIELD_NAMES[6])?,
        })
    }
}

/// Encodes in the same layout the producers send: 6 decimal places, integer ids
impl fmt::Display for PositionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6},{},{},{}",
            self.vehicle_lat,
            self.vehicle_lon,
            self.prev_vehicle_lat,
            self.prev_vehicle_lon,
            self.start_id,
            self.dest_id,
            self.next_id
        )
    }
}

fn parse_coordinate(value: &str, field: &'static str) -> Result<f64, ParseReportError> {
    value
        .parse::<f64>()
        .map_err(|_| ParseReportError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_latitude(value: &str, field: &'static str) -> Result<f64, ParseReportError> {
    let lat = parse_coordinate(value, field)?;
    if !valid_latitude(lat) {
        return Err(ParseReportError::CoordinateOutOfRange { field, value: lat });
    }
    Ok(lat)
}

fn parse_longitude(value: &str, field: &'static str) -> Result<f64, ParseReportError> {
    let lon = parse_coordinate(value, field)?;
    if !valid_longitude(lon) {
        return Err(ParseReportError::CoordinateOutOfRange { field, value: lon });
    }
    Ok(lon)
}

fn parse_id(value: &str, field: &'static str) -> Result<u32, ParseReportError> {
    value.parse::<u32>().map_err(|_| ParseReportError::InvalidId {
        field,
        value: value.to_string(),
    })
}
