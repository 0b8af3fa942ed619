//! Polyline representation for route geometries.
//!
//! Providers hand geometries over as encoded polylines (Google algorithm,
//! precision 5). They are decoded at the adapter boundary; the rest of the
//! crate only sees coordinate sequences.

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;
use crate::traits::Coordinates;

/// Precision used by OSRM (`geometries=polyline`) and OpenRouteService.
pub const DEFAULT_PRECISION: u32 = 5;

/// A route geometry as decoded (latitude, longitude) points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Straight line between two points, used when no real geometry exists.
    pub fn straight(from: Coordinates, to: Coordinates) -> Self {
        Self::new(vec![(from.lat, from.lng), (to.lat, to.lng)])
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends another leg, dropping its first point when it repeats our last.
    pub fn extend(&mut self, other: Polyline) {
        let mut points = other.into_points().into_iter().peekable();
        if let (Some(last), Some(first)) = (self.points.last(), points.peek()) {
            if last == first {
                points.next();
            }
        }
        self.points.extend(points);
    }

    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut position = 0;
        let mut lat = 0i64;
        let mut lng = 0i64;
        let mut points = Vec::new();

        while position < bytes.len() {
            lat += decode_value(bytes, &mut position)?;
            lng += decode_value(bytes, &mut position)?;
            points.push((lat as f64 / factor, lng as f64 / factor));
        }

        Ok(Self { points })
    }

    pub fn encode(&self, precision: u32) -> String {
        let factor = 10f64.powi(precision as i32);
        let mut encoded = String::new();
        let mut previous = (0i64, 0i64);

        for &(lat, lng) in &self.points {
            let current = ((lat * factor).round() as i64, (lng * factor).round() as i64);
            encode_value(current.0 - previous.0, &mut encoded);
            encode_value(current.1 - previous.1, &mut encoded);
            previous = current;
        }

        encoded
    }
}

fn decode_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result = 0i64;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated(*position));
        };
        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                position: *position,
            });
        }
        *position += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn encode_value(value: i64, out: &mut String) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        out.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    out.push((value as u8 + 63) as char);
}
