//! Response types for the Nominatim search endpoint.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use geo::Coord;
use mealdrop_core::GeocodeError;
use serde::Deserialize;

/// One search match. Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    /// Latitude in degrees.
    pub lat: String,
    /// Longitude in degrees.
    pub lon: String,
}

impl SearchResult {
    /// Parse the match into a coordinate (`x = longitude`, `y = latitude`).
    pub fn to_coord(&self) -> Result<Coord<f64>, GeocodeError> {
        Ok(Coord {
            x: parse_degrees("lon", &self.lon)?,
            y: parse_degrees("lat", &self.lat)?,
        })
    }
}

fn parse_degrees(field: &str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|degrees| degrees.is_finite())
        .ok_or_else(|| GeocodeError::ParseError {
            message: format!("invalid {field} value '{value}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserialise_search_results() {
        let json = r#"[{"place_id": 1, "lat": "51.5034", "lon": "-0.1276", "display_name": "Downing St"}]"#;
        let results: Vec<SearchResult> = serde_json::from_str(json).expect("should deserialise");
        let coord = results
            .first()
            .expect("one result")
            .to_coord()
            .expect("valid coordinates");
        assert_eq!(coord, Coord { x: -0.1276, y: 51.5034 });
    }

    #[rstest]
    fn empty_result_list_deserialises() {
        let results: Vec<SearchResult> = serde_json::from_str("[]").expect("should deserialise");
        assert!(results.is_empty());
    }

    #[rstest]
    #[case("north", "0.0")]
    #[case("0.0", "NaN")]
    #[case("", "0.0")]
    fn malformed_degrees_are_parse_errors(#[case] lat: &str, #[case] lon: &str) {
        let result = SearchResult {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
        };
        assert!(matches!(
            result.to_coord(),
            Err(GeocodeError::ParseError { .. })
        ));
    }
}
