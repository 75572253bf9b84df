//! Encoded polyline codec (the Directions API "overview_polyline" format).
//!
//! Each coordinate is stored as a pair of deltas against the previous point,
//! scaled to 1e-5 degrees, zig-zag encoded and split into 5-bit chunks offset
//! by 63 so that every chunk is a printable ASCII character.

use crate::models::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;
/// Largest shift that still leaves room for a whole chunk in an `i64`.
const MAX_SHIFT: u32 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("polyline ends in the middle of a value at byte {position}")]
    Truncated { position: usize },
    #[error("invalid polyline byte 0x{byte:02x} at position {position}")]
    InvalidCharacter { position: usize, byte: u8 },
    #[error("polyline value starting before byte {position} overflows")]
    Overflow { position: usize },
}

/// Decode an encoded polyline into its coordinates.
///
/// An empty string decodes to an empty path; callers decide whether that
/// counts as "no route".
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat = 0_i64;
    let mut lng = 0_i64;
    let mut path = Vec::with_capacity(bytes.len() / 4);

    while index < bytes.len() {
        let position = index;
        lat = lat
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(DecodeError::Overflow { position })?;
        let position = index;
        lng = lng
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(DecodeError::Overflow { position })?;
        path.push(Coordinate {
            lat: lat as f64 / PRECISION,
            lng: lng as f64 / PRECISION,
        });
    }

    Ok(path)
}

/// Encode coordinates into a polyline string, rounding to 1e-5 degrees.
pub fn encode(path: &[Coordinate]) -> String {
    let mut encoded = String::with_capacity(path.len() * 8);
    let mut prev_lat = 0_i64;
    let mut prev_lng = 0_i64;

    for coord in path {
        let lat = (coord.lat * PRECISION).round() as i64;
        let lng = (coord.lng * PRECISION).round() as i64;
        push_value(&mut encoded, lat - prev_lat);
        push_value(&mut encoded, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

/// Format waypoints the way directions providers expect them: `lat,lng|lat,lng`.
pub fn format_waypoints(waypoints: &[Coordinate]) -> String {
    waypoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let start = *index;
    let mut result = 0_i64;
    let mut shift = 0_u32;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(DecodeError::Truncated { position: *index });
        };
        let chunk = i64::from(byte) - ASCII_OFFSET;
        if !(0..64).contains(&chunk) {
            return Err(DecodeError::InvalidCharacter {
                position: *index,
                byte,
            });
        }
        *index += 1;

        result |= (chunk & CHUNK_MASK) << shift;
        if chunk < CONTINUATION {
            break;
        }
        shift += CHUNK_BITS;
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { position: start });
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= CONTINUATION {
        push_chunk(out, (CONTINUATION | (v & CHUNK_MASK)) + ASCII_OFFSET);
        v >>= CHUNK_BITS;
    }
    push_chunk(out, v + ASCII_OFFSET);
}

fn push_chunk(out: &mut String, code: i64) {
    // code is always within 63..=126
    out.push(char::from(code as u8));
}
