use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monthly rent. Never negative, never NaN.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, String> {
        Self::try_from(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(format!("price must be a finite number, got {}", value));
        }
        if value < 0.0 {
            return Err(format!("price must not be negative, got {}", value));
        }
        Ok(Self(value))
    }
}

impl From<u32> for Price {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review score from 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, String> {
        Self::try_from(stars)
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                stars
            ))
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Lifecycle of a rental request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "rechazada")]
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContractStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "finalizado")]
    Finished,
    #[serde(rename = "cancelado")]
    Cancelled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    #[serde(rename = "pagado")]
    Paid,
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "atrasado")]
    Late,
    #[serde(other)]
    Other,
}

/// A renter asking to rent a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RentalRequest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "inquilino_id")]
    pub requester_id: String,
    #[serde(rename = "estado")]
    pub status: RequestStatus,
    #[serde(rename = "fecha_solicitud", default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "inquilino_id")]
    pub requester_id: String,
    #[serde(rename = "calificacion")]
    pub rating: Rating,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RentPayment {
    #[serde(rename = "fecha", default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "estado")]
    pub status: PaymentStatus,
}

/// Lease signed for a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "inquilino_id", default)]
    pub tenant_id: String,
    #[serde(rename = "estado")]
    pub status: ContractStatus,
    #[serde(rename = "fecha_inicio", default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "fecha_fin", default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(rename = "monto_renta", default)]
    pub monthly_rent: f64,
    #[serde(rename = "pagos_renta", default)]
    pub payments: Vec<RentPayment>,
}

/// Core property record as stored by the remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "precio")]
    pub price: Price,
    #[serde(rename = "caracteristicas", default)]
    pub features: Vec<String>,
    #[serde(rename = "disponible")]
    pub available: bool,
    /// Image identifiers, resolved separately
    #[serde(rename = "imagenes", default)]
    pub images: Vec<String>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "solicitudes_renta", default)]
    pub rental_requests: Vec<RentalRequest>,
    #[serde(rename = "contratos", default)]
    pub contracts: Vec<Contract>,
}

impl Property {
    pub fn pending_requests(&self) -> usize {
        self.rental_requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count()
    }

    pub fn active_contracts(&self) -> usize {
        self.contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .count()
    }
}

/// Body sent when creating or replacing a property
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProperty {
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "precio")]
    pub price: Price,
    #[serde(rename = "caracteristicas")]
    pub features: Vec<String>,
    #[serde(rename = "disponible")]
    pub available: bool,
    #[serde(rename = "imagenes")]
    pub images: Vec<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update that only touches the image references
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImagePatch {
    #[serde(rename = "imagenes")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewRentalRequest {
    #[serde(rename = "inquilino_id")]
    pub requester_id: String,
    #[serde(rename = "estado")]
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewReview {
    #[serde(rename = "inquilino_id")]
    pub requester_id: String,
    #[serde(rename = "calificacion")]
    pub rating: Rating,
    #[serde(rename = "comentario")]
    pub comment: String,
}

/// An image file staged for upload
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Image resolved to something a view can display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedImage {
    pub id: String,
    /// Either a remote URL or a `data:` URL
    pub url: String,
}

/// Everything the detail view shows for one property
#[derive(Debug, Clone, Serialize)]
pub struct PropertyAggregate {
    pub property: Property,
    pub images: Vec<ResolvedImage>,
    /// Set when at least one referenced image could not be resolved
    pub images_unavailable: bool,
    pub rental_requests: Vec<RentalRequest>,
    pub reviews: Vec<Review>,
}

/// Summary counters for the home view
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_properties: usize,
    pub available_properties: usize,
    pub active_contracts: usize,
    pub pending_requests: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_property_decodes_wire_names() {
        let property: Property = serde_json::from_value(json!({
            "_id": "64f5a53d1234567890abcdef",
            "ubicacion": "Av. Reforma 100",
            "precio": 15000,
            "caracteristicas": ["wifi", "parking"],
            "disponible": true,
            "imagenes": ["64f5a53d1234567890abcd01"],
            "solicitudes_renta": [
                {"inquilino_id": "64f5a53d1234567890abcdef", "estado": "pendiente",
                 "fecha_solicitud": "2024-03-01T10:00:00.000Z"}
            ],
            "contratos": [
                {"inquilino_id": "64f5a53d1234567890abcdef", "estado": "activo",
                 "monto_renta": 15000, "pagos_renta": [{"monto": 15000, "estado": "pagado"}]}
            ]
        }))
        .unwrap();

        assert_eq!(property.location, "Av. Reforma 100");
        assert_eq!(property.price.value(), 15000.0);
        assert_eq!(property.features, vec!["wifi", "parking"]);
        assert_eq!(property.pending_requests(), 1);
        assert_eq!(property.active_contracts(), 1);
        assert_eq!(property.contracts[0].payments[0].status, PaymentStatus::Paid);
    }

    #[test]
    fn test_missing_nested_lists_default_to_empty() {
        let property: Property = serde_json::from_value(json!({
            "_id": "64f5a53d1234567890abcdef",
            "ubicacion": "Centro",
            "precio": 8000.5,
            "disponible": false
        }))
        .unwrap();

        assert!(property.features.is_empty());
        assert!(property.images.is_empty());
        assert_eq!(property.pending_requests(), 0);
        assert_eq!(property.active_contracts(), 0);
    }

    #[test]
    fn test_negative_price_is_a_decode_error() {
        let result: Result<Property, _> = serde_json::from_value(json!({
            "_id": "64f5a53d1234567890abcdef",
            "ubicacion": "Centro",
            "precio": -1,
            "disponible": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_price_as_string_is_a_decode_error() {
        let result: Result<Property, _> = serde_json::from_value(json!({
            "_id": "64f5a53d1234567890abcdef",
            "ubicacion": "Centro",
            "precio": "15000",
            "disponible": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_contract_status_is_tolerated() {
        let contract: Contract = serde_json::from_value(json!({
            "estado": "suspendido",
            "monto_renta": 100
        }))
        .unwrap();
        assert_eq!(contract.status, ContractStatus::Other);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(3, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn test_rating_bounds(#[case] stars: u8, #[case] valid: bool) {
        assert_eq!(Rating::new(stars).is_ok(), valid);
    }

    #[test]
    fn test_new_review_serializes_numbers() {
        let review = NewReview {
            requester_id: "64f5a53d1234567890abcdef".to_string(),
            rating: Rating::new(4).unwrap(),
            comment: "Muy limpio".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&review).unwrap(),
            json!({
                "inquilino_id": "64f5a53d1234567890abcdef",
                "calificacion": 4,
                "comentario": "Muy limpio"
            })
        );
    }
}
