/*
 * Responsibility
 * - POST /api/user-location-updates request DTO
 * - Range checks happen here, before anything reaches the data layer
 */
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Precise,
    Nearby,
    Hidden,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precise => "precise",
            Self::Nearby => "nearby",
            Self::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub location_type: LocationType,
}

impl LocationUpdateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude must be between -180 and 180");
        }
        if let Some(accuracy) = self.accuracy
            && accuracy < 0.0
        {
            return Err("accuracy must be at least 0");
        }
        Ok(())
    }
}
