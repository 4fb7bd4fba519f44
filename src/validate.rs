use thiserror::Error;

// Slippy-map zoom ceiling shared by both tile providers
pub const MAX_ZOOM: u32 = 18;

// Coordinates are clamped to 6 decimal digits (~0.1 m) before they are used
// as cache or rate-limit key components
const PRECISION: f64 = 1e6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error("Invalid map parameters")]
    MalformedTile,
    #[error("Zoom out of range")]
    ZoomOutOfRange,
    #[error("Tile coordinates out of range")]
    TileOutOfRange,
    #[error("Missing required parameters: lat and lng are required")]
    MissingCoordinates,
    #[error("Invalid coordinates: lat and lng must be valid numbers")]
    MalformedCoordinates,
    #[error("Invalid latitude: must be between -90 and 90")]
    LatitudeOutOfRange,
    #[error("Invalid longitude: must be between -180 and 180")]
    LongitudeOutOfRange,
}

/// Validated tile address at zoom `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

/// Validated geographic coordinates, rounded to 6 decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoord {
    pub lat: f64,
    pub lng: f64,
}

fn digits(raw: &str) -> Result<&str, ValidateError> {
    // all-digit means no sign and no decimal point, rejected before any
    // numeric conversion happens
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidateError::MalformedTile);
    }
    Ok(raw)
}

/// Validate raw z/x/y path segments against the slippy-map bounds.
pub fn validate_tile(z_raw: &str, x_raw: &str, y_raw: &str) -> Result<TileCoord, ValidateError> {
    let z: u32 = digits(z_raw)?
        .parse()
        .map_err(|_| ValidateError::ZoomOutOfRange)?;
    let x: u32 = digits(x_raw)?
        .parse()
        .map_err(|_| ValidateError::TileOutOfRange)?;
    let y: u32 = digits(y_raw)?
        .parse()
        .map_err(|_| ValidateError::TileOutOfRange)?;

    if z > MAX_ZOOM {
        return Err(ValidateError::ZoomOutOfRange);
    }
    // z <= 18, so the shift cannot overflow
    let max = (1u32 << z) - 1;
    if x > max || y > max {
        return Err(ValidateError::TileOutOfRange);
    }

    Ok(TileCoord { z, x, y })
}

/// Validate raw lat/lng query values and round them to 6 decimal places.
pub fn validate_coordinates(
    lat_raw: Option<&str>,
    lng_raw: Option<&str>,
) -> Result<GeoCoord, ValidateError> {
    let (lat_raw, lng_raw) = match (lat_raw, lng_raw) {
        (Some(lat), Some(lng)) if !lat.is_empty() && !lng.is_empty() => (lat, lng),
        _ => return Err(ValidateError::MissingCoordinates),
    };

    let lat: f64 = lat_raw
        .parse()
        .map_err(|_| ValidateError::MalformedCoordinates)?;
    let lng: f64 = lng_raw
        .parse()
        .map_err(|_| ValidateError::MalformedCoordinates)?;

    // "NaN" and "inf" parse successfully, catch them here
    if !lat.is_finite() || !lng.is_finite() {
        return Err(ValidateError::MalformedCoordinates);
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidateError::LatitudeOutOfRange);
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ValidateError::LongitudeOutOfRange);
    }

    Ok(GeoCoord {
        lat: round6(lat),
        lng: round6(lng),
    })
}

pub fn round6(value: f64) -> f64 {
    (value * PRECISION).round() / PRECISION
}
