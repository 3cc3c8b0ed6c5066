use crate::compose;
use crate::models::{Coordinate, Outcome};

/// Parse and range-check a user-supplied location.
///
/// Missing either value is a prompt, not an error. Non-finite or
/// out-of-range values are a client error. Called lazily — only once a
/// location-dependent branch is reached, since conversational intents and
/// FAQ lookups never need it.
pub fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> Result<Coordinate, Outcome> {
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(compose::location_request());
    };

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(compose::validation_error(
            "Invalid latitude or longitude values.",
        ));
    }

    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_on_earth() {
        return Err(compose::validation_error(
            "Latitude must be between -90 and 90 and longitude between -180 and 180.",
        ));
    }

    Ok(coordinate)
}
