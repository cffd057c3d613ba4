//! Persisted record model and registration form input
//!
//! Field names on the wire are the Portuguese keys the stored collection has
//! always used (`nome`, `rua`, `numero`, `cidade`, `estado`). Renaming them
//! requires a migration of existing stores.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Geographic coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the WGS84 ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Raw registration form input, exactly as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFields {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "rua", default)]
    pub street: String,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "estado", default)]
    pub state: String,
}

impl FormFields {
    pub fn new(
        name: impl Into<String>,
        street: impl Into<String>,
        number: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street: street.into(),
            number: number.into(),
            city: city.into(),
            state: state.into(),
        }
    }

    /// Names of the required fields that are empty or whitespace-only
    ///
    /// Street, city and state are required because they make up the
    /// geocoded address line. Name and number are stored but optional.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// A registered address with its resolved position
///
/// Records are immutable once persisted; there is no update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "rua")]
    pub street: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl UserRecord {
    /// Build a record from form input and a geocoded position
    ///
    /// Text fields are stored as entered (accents included); only the
    /// geocoding query is normalized.
    pub fn from_form(form: &FormFields, position: Coordinate) -> Self {
        Self {
            name: form.name.clone(),
            street: form.street.clone(),
            number: form.number.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }

    /// Stored position, re-validated against coordinate ranges
    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Short "street, number" line used as marker description
    pub fn description(&self) -> String {
        format!("{}, {}", self.street, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(-23.5, -46.6).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_missing_required_lists_every_blank_field() {
        let form = FormFields::new("Ana", "  ", "10", "", "SP");
        assert_eq!(form.missing_required(), vec!["street", "city"]);

        let complete = FormFields::new("", "Rua Teste", "", "São Paulo", "SP");
        assert!(complete.missing_required().is_empty());
    }

    #[test]
    fn test_record_serializes_with_portuguese_keys() {
        let form = FormFields::new("Ana", "Rua Teste", "10", "São Paulo", "SP");
        let record = UserRecord::from_form(&form, Coordinate::new(-23.5, -46.6).unwrap());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["nome"], "Ana");
        assert_eq!(value["rua"], "Rua Teste");
        assert_eq!(value["numero"], "10");
        assert_eq!(value["cidade"], "São Paulo");
        assert_eq!(value["estado"], "SP");
        assert_eq!(value["latitude"], -23.5);
        assert_eq!(value["longitude"], -46.6);
    }

    #[test]
    fn test_description_joins_street_and_number() {
        let form = FormFields::new("Ana", "Rua Teste", "10", "São Paulo", "SP");
        let record = UserRecord::from_form(&form, Coordinate::new(0.0, 0.0).unwrap());
        assert_eq!(record.description(), "Rua Teste, 10");
    }
}
