//! Encoded polyline decoding
//!
//! Routing engines return route geometry in the
//! [encoded polyline](https://developers.google.com/maps/documentation/utilities/polylinealgorithm)
//! format: each coordinate is stored as a latitude delta followed by a
//! longitude delta, each delta zig-zag encoded and split into 5-bit chunks
//! written as printable characters (`chunk + 63`, bit `0x20` = more chunks follow).

use domain::Coordinate;
use thiserror::Error;

/// Precision used by OSRM's default `polyline` geometry format
pub const DEFAULT_PRECISION: u8 = 5;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const VALUE_MASK: u64 = 0x1f;
const MAX_SHIFT: u32 = 60;

/// Errors that can occur while decoding a polyline
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolylineError {
    /// Byte outside the encoding alphabet
    #[error("invalid character {byte:#04x} at position {position}")]
    InvalidCharacter { position: usize, byte: u8 },

    /// Input ended in the middle of a value
    #[error("polyline ends in the middle of a value")]
    Truncated,

    /// Value needs more than 64 bits
    #[error("value starting at position {position} overflows")]
    Overflow { position: usize },

    /// Latitude delta without a matching longitude delta
    #[error("latitude without matching longitude")]
    UnpairedValue,
}

/// Decode a polyline at the default precision of 5 decimal places
///
/// # Errors
///
/// Returns a [`PolylineError`] for malformed input; no partial list is returned.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

/// Decode a polyline into `[lon, lat]` coordinates
///
/// # Errors
///
/// Returns a [`PolylineError`] for malformed input; no partial list is returned.
#[allow(clippy::cast_precision_loss)] // accumulated values stay far below 2^52
pub fn decode_with_precision(encoded: &str, precision: u8) -> Result<Vec<Coordinate>, PolylineError> {
    let bytes = encoded.as_bytes();
    let factor = 10_f64.powi(i32::from(precision));

    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let delta_lat = read_value(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(PolylineError::UnpairedValue);
        }
        let delta_lon = read_value(bytes, &mut index)?;

        lat = lat.wrapping_add(delta_lat);
        lon = lon.wrapping_add(delta_lon);

        coordinates.push(Coordinate::new_unchecked(
            lon as f64 / factor,
            lat as f64 / factor,
        ));
    }

    Ok(coordinates)
}

/// Read one zig-zag encoded signed value starting at `index`
#[allow(clippy::cast_possible_wrap)] // zig-zag output fits in 63 bits
fn read_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let position = *index;
        let Some(&byte) = bytes.get(position) else {
            return Err(PolylineError::Truncated);
        };
        *index += 1;

        let chunk = byte
            .checked_sub(CHAR_OFFSET)
            .filter(|c| *c < 64)
            .map(u64::from)
            .ok_or(PolylineError::InvalidCharacter { position, byte })?;

        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { position: start });
        }
        result |= (chunk & VALUE_MASK) << shift;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
        shift += 5;
    }

    let magnitude = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !magnitude } else { magnitude })
}
