//! Value Objects for the Troca Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object and entity validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Resource type name not recognized
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// Offered or stored quantity violates an invariant
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Center name must be non-blank
    #[error("Invalid center name: {0}")]
    InvalidName(String),

    /// Latitude/longitude out of range
    #[error("Invalid geolocation: {0}")]
    InvalidGeoLocation(String),

    /// Occupation exceeds capacity or capacity invalid
    #[error("Invalid occupation: {0}")]
    InvalidOccupation(String),
}

// =============================================================================
// ResourceType
// =============================================================================

/// Closed set of barterable resource types.
///
/// Each type carries a fixed point weight used by the fairness rule.
/// This table is the single source of truth for exchange-time point
/// computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Doctor (4 points)
    Medico,
    /// Volunteer (3 points)
    Voluntario,
    /// Medical supplies (7 points)
    SuprimentosMedicos,
    /// Transport vehicle (5 points)
    VeiculoDeTransporte,
    /// Basic food basket (2 points)
    CestaBasica,
}

impl ResourceType {
    /// All variants, in declaration order.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Medico,
        ResourceType::Voluntario,
        ResourceType::SuprimentosMedicos,
        ResourceType::VeiculoDeTransporte,
        ResourceType::CestaBasica,
    ];

    /// Point weight of one unit of this resource type.
    pub fn points(&self) -> u32 {
        match self {
            ResourceType::Medico => 4,
            ResourceType::Voluntario => 3,
            ResourceType::SuprimentosMedicos => 7,
            ResourceType::VeiculoDeTransporte => 5,
            ResourceType::CestaBasica => 2,
        }
    }

    /// Canonical upper-snake name (wire and storage form).
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Medico => "MEDICO",
            ResourceType::Voluntario => "VOLUNTARIO",
            ResourceType::SuprimentosMedicos => "SUPRIMENTOS_MEDICOS",
            ResourceType::VeiculoDeTransporte => "VEICULO_DE_TRANSPORTE",
            ResourceType::CestaBasica => "CESTA_BASICA",
        }
    }
}

impl FromStr for ResourceType {
    type Err = DomainError;

    /// Parse a resource type name, case-insensitively.
    ///
    /// # Errors
    /// Returns `DomainError::UnknownResourceType` for unrecognized input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DomainError::UnknownResourceType(s.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Resource
// =============================================================================

/// A quantity of one resource type.
///
/// Inventory entries and offer entries share this shape. Stored
/// inventory entries always have quantity >= 1; zero-quantity entries
/// are removed on mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Unit count
    pub quantity: u32,
}

impl Resource {
    /// Create a resource entry.
    pub fn new(resource_type: ResourceType, quantity: u32) -> Self {
        Self { resource_type, quantity }
    }

    /// Point value of this entry: weight(type) * quantity.
    ///
    /// Widened to `u64` so the product cannot overflow for any `u32`
    /// quantity.
    pub fn points(&self) -> u64 {
        u64::from(self.resource_type.points()) * u64::from(self.quantity)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.resource_type, self.quantity)
    }
}

/// Total point value of a resource list, computed in `u64`.
pub fn total_points(resources: &[Resource]) -> u64 {
    resources.iter().map(Resource::points).sum()
}

// =============================================================================
// GeoLocation
// =============================================================================

/// Geographic coordinates of a center.
///
/// # Invariants
/// - Latitude in [-90, 90]
/// - Longitude in [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl GeoLocation {
    /// Create a validated geolocation.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidGeoLocation` when out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidGeoLocation(format!(
                "Latitude out of range: {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidGeoLocation(format!(
                "Longitude out of range: {}",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ResourceType tests
    #[test]
    fn test_point_weights() {
        assert_eq!(ResourceType::Medico.points(), 4);
        assert_eq!(ResourceType::Voluntario.points(), 3);
        assert_eq!(ResourceType::SuprimentosMedicos.points(), 7);
        assert_eq!(ResourceType::VeiculoDeTransporte.points(), 5);
        assert_eq!(ResourceType::CestaBasica.points(), 2);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("MEDICO".parse::<ResourceType>().unwrap(), ResourceType::Medico);
        assert_eq!("medico".parse::<ResourceType>().unwrap(), ResourceType::Medico);
        assert_eq!(
            "Suprimentos_Medicos".parse::<ResourceType>().unwrap(),
            ResourceType::SuprimentosMedicos
        );
        assert_eq!(
            "cesta_basica".parse::<ResourceType>().unwrap(),
            ResourceType::CestaBasica
        );
    }

    #[test]
    fn test_parse_unknown_is_typed_error() {
        let err = "ALIMENTO".parse::<ResourceType>().unwrap_err();
        assert_eq!(err, DomainError::UnknownResourceType("ALIMENTO".to_string()));
    }

    #[test]
    fn test_display_roundtrip() {
        for t in ResourceType::ALL {
            assert_eq!(t.to_string().parse::<ResourceType>().unwrap(), t);
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&ResourceType::VeiculoDeTransporte).unwrap();
        assert_eq!(json, "\"VEICULO_DE_TRANSPORTE\"");
        let parsed: ResourceType = serde_json::from_str("\"SUPRIMENTOS_MEDICOS\"").unwrap();
        assert_eq!(parsed, ResourceType::SuprimentosMedicos);
    }

    // Resource tests
    #[test]
    fn test_resource_points() {
        let r = Resource::new(ResourceType::CestaBasica, 5);
        assert_eq!(r.points(), 10);

        let r = Resource::new(ResourceType::SuprimentosMedicos, 3);
        assert_eq!(r.points(), 21);
    }

    #[test]
    fn test_points_do_not_overflow_at_max_quantity() {
        let r = Resource::new(ResourceType::SuprimentosMedicos, u32::MAX);
        assert_eq!(r.points(), 7 * u64::from(u32::MAX));

        let r = Resource::new(ResourceType::SuprimentosMedicos, 1_000_000_000);
        assert_eq!(r.points(), 7_000_000_000);
    }

    #[test]
    fn test_total_points() {
        let offer = vec![
            Resource::new(ResourceType::Voluntario, 2),
            Resource::new(ResourceType::CestaBasica, 2),
        ];
        assert_eq!(total_points(&offer), 10);
        assert_eq!(total_points(&[]), 0);
    }

    // GeoLocation tests
    #[test]
    fn test_geolocation_validation() {
        assert!(GeoLocation::new(-23.55, -46.63).is_ok());
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(90.1, 0.0).is_err());
        assert!(GeoLocation::new(0.0, -180.5).is_err());
    }
}
