//! Base-32 geohash encoding
//!
//! Used by editor tooling to bucket zones spatially. Bits alternate
//! longitude/latitude starting with longitude, five bits per character.

use crate::fixes::Coordinate;

use super::editor::BoundingBox;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

pub const DEFAULT_PRECISION: usize = 9;
pub const MAX_PRECISION: usize = 12;

/// Encode a coordinate; `None` for out-of-range input or precision
pub fn encode(coordinate: Coordinate, precision: usize) -> Option<String> {
    if precision == 0 || precision > MAX_PRECISION || coordinate.validate().is_err() {
        return None;
    }

    let (mut min_lat, mut max_lat) = (-90.0_f64, 90.0_f64);
    let (mut min_lon, mut max_lon) = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bits = 0u8;
    let mut index = 0usize;

    while hash.len() < precision {
        if even_bit {
            let mid = (min_lon + max_lon) / 2.0;
            if coordinate.longitude >= mid {
                index = index * 2 + 1;
                min_lon = mid;
            } else {
                index *= 2;
                max_lon = mid;
            }
        } else {
            let mid = (min_lat + max_lat) / 2.0;
            if coordinate.latitude >= mid {
                index = index * 2 + 1;
                min_lat = mid;
            } else {
                index *= 2;
                max_lat = mid;
            }
        }
        even_bit = !even_bit;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[index] as char);
            bits = 0;
            index = 0;
        }
    }

    Some(hash)
}

/// Cell covered by a geohash; `None` for empty, too long or invalid hashes
pub fn decode_bounds(hash: &str) -> Option<BoundingBox> {
    if hash.is_empty() || hash.len() > MAX_PRECISION {
        return None;
    }

    let (mut min_lat, mut max_lat) = (-90.0_f64, 90.0_f64);
    let (mut min_lon, mut max_lon) = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for ch in hash.bytes() {
        let value = BASE32.iter().position(|&c| c == ch.to_ascii_lowercase())?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            if even_bit {
                let mid = (min_lon + max_lon) / 2.0;
                if bit == 1 {
                    min_lon = mid;
                } else {
                    max_lon = mid;
                }
            } else {
                let mid = (min_lat + max_lat) / 2.0;
                if bit == 1 {
                    min_lat = mid;
                } else {
                    max_lat = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    Some(BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    })
}

/// The up-to-eight cells surrounding `hash`, clockwise from north
///
/// Longitude wraps around the antimeridian; cells past a pole are omitted.
pub fn neighbors(hash: &str) -> Option<Vec<String>> {
    let cell = decode_bounds(hash)?;
    let center = cell.center();
    let height = cell.max_lat - cell.min_lat;
    let width = cell.max_lon - cell.min_lon;

    const DIRECTIONS: [(f64, f64); 8] = [
        (1.0, 0.0),
        (1.0, 1.0),
        (0.0, 1.0),
        (-1.0, 1.0),
        (-1.0, 0.0),
        (-1.0, -1.0),
        (0.0, -1.0),
        (1.0, -1.0),
    ];

    let result = DIRECTIONS
        .iter()
        .filter_map(|(d_lat, d_lon)| {
            let latitude = center.latitude + d_lat * height;
            if !(-90.0..=90.0).contains(&latitude) {
                return None;
            }
            let mut longitude = center.longitude + d_lon * width;
            if longitude > 180.0 {
                longitude -= 360.0;
            } else if longitude < -180.0 {
                longitude += 360.0;
            }
            encode(Coordinate::new(latitude, longitude), hash.len())
        })
        .collect();

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        let hash = encode(Coordinate::new(57.64911, 10.40744), 11).unwrap();
        assert_eq!(hash, "u4pruydqqvj");
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(encode(Coordinate::new(0.0, 0.0), 0).is_none());
        assert!(encode(Coordinate::new(0.0, 0.0), 13).is_none());
        assert!(encode(Coordinate::new(95.0, 0.0), 5).is_none());
    }

    #[test]
    fn test_decoded_cell_contains_original_point() {
        let point = Coordinate::new(48.8566, 2.3522);
        let hash = encode(point, DEFAULT_PRECISION).unwrap();
        let cell = decode_bounds(&hash).unwrap();
        assert!(cell.contains(point));
        assert!(cell.max_lat - cell.min_lat < 0.001);
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        // 'a', 'i', 'l' and 'o' are not in the alphabet
        assert!(decode_bounds("u09a").is_none());
        assert!(decode_bounds("").is_none());
    }

    #[test]
    fn test_neighbors_surround_the_cell() {
        let hash = encode(Coordinate::new(48.8566, 2.3522), 6).unwrap();
        let around = neighbors(&hash).unwrap();
        assert_eq!(around.len(), 8);
        assert!(!around.contains(&hash));

        let mut unique = around.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 8);

        // North neighbor sits directly above
        let cell = decode_bounds(&hash).unwrap();
        let north = decode_bounds(&around[0]).unwrap();
        assert!((north.min_lat - cell.max_lat).abs() < 1e-9);
        assert!((north.min_lon - cell.min_lon).abs() < 1e-9);
    }

    #[test]
    fn test_neighbors_wrap_antimeridian() {
        let hash = encode(Coordinate::new(0.0, 179.99), 4).unwrap();
        let around = neighbors(&hash).unwrap();
        assert_eq!(around.len(), 8);
        let east = decode_bounds(&around[2]).unwrap();
        assert!(east.min_lon < 0.0);
    }
}
