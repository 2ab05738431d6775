//! Encoded polyline codec for route geometries.
//!
//! Directions providers return paths as compact strings: each coordinate is a
//! pair of signed deltas from the previous one, scaled by 1e5, zig-zag encoded
//! and written 5 bits per character with a continuation bit, offset by 63 into
//! printable ASCII.

use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::models::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: u8 = 63;
/// Seven chunks (35 bits) cover any delta between valid 1e5-scaled degrees.
const MAX_SHIFT: u32 = 30;
const MAX_LAT: i64 = 90 * 100_000;
const MAX_LNG: i64 = 180 * 100_000;

/// Decodes an encoded path into coordinates.
///
/// An empty string decodes to an empty sequence. Codewords longer than a
/// coordinate delta can need, and running totals outside ±90°/±180°, are
/// rejected as [`PathError::OutOfRange`].
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PathError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while offset < bytes.len() {
        let start = offset;
        let (d_lat, next) = read_value(bytes, offset)?;
        let (d_lng, next) = read_value(bytes, next)?;
        offset = next;
        lat = lat
            .checked_add(d_lat)
            .filter(|v| v.abs() <= MAX_LAT)
            .ok_or(PathError::OutOfRange { offset: start })?;
        lng = lng
            .checked_add(d_lng)
            .filter(|v| v.abs() <= MAX_LNG)
            .ok_or(PathError::OutOfRange { offset: start })?;
        points.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Reads one zig-zag varint starting at `offset`, returning the value and the
/// offset just past it.
fn read_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PathError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(PathError::Malformed { offset });
        };
        if !(ASCII_OFFSET..=ASCII_OFFSET + 63).contains(&byte) {
            return Err(PathError::InvalidByte { byte, offset });
        }
        if shift > MAX_SHIFT {
            return Err(PathError::OutOfRange { offset });
        }
        let chunk = i64::from(byte - ASCII_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        offset += 1;
        if chunk < CONTINUATION {
            break;
        }
    }

    let value = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, offset))
}

/// Encodes coordinates into the compact string form.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lng = (point.longitude * PRECISION).round() as i64;
        write_value(&mut out, lat - prev_lat);
        write_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn write_value(out: &mut String, delta: i64) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        out.push(char::from(
            ((CONTINUATION | (value & CHUNK_MASK)) as u8) + ASCII_OFFSET,
        ));
        value >>= CHUNK_BITS;
    }
    out.push(char::from(value as u8 + ASCII_OFFSET));
}

/// A route geometry held as decoded coordinates.
///
/// Decoding happens once at the provider boundary; everything downstream
/// works on the points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn decode(encoded: &str) -> Result<Self, PathError> {
        decode(encoded).map(Self::new)
    }

    pub fn encode(&self) -> String {
        encode(&self.points)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
