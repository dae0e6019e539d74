//! Boundary layer between the remote store's JSON and the domain types.
//!
//! Everything loosely typed stops here: ids that may be numbers, timestamps
//! serialized as strings, and the several vocabularies used for movement
//! types. Only validated domain values leave this module.

use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockflow_core::{Entity, MovementId, ProductId};
use stockflow_inventory::{
    Movement, MovementDetails, MovementType, Product, ProductRef, Quantity, ValidatedMovement,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown movement type: {0:?}")]
    UnknownMovementType(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

impl WireError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Names used on the wire for outgoing movement types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MovementVocabulary {
    /// ENTRADA / SAIDA / DEFEITO / TRANSFERENCIA, as spoken by the existing backend.
    #[default]
    Legacy,
    /// RECEIPT / ISSUE / DEFECT / TRANSFER.
    Canonical,
}

impl MovementVocabulary {
    pub fn render(self, movement_type: MovementType) -> &'static str {
        match self {
            MovementVocabulary::Canonical => movement_type.as_str(),
            MovementVocabulary::Legacy => match movement_type {
                MovementType::Receipt => "ENTRADA",
                MovementType::Issue => "SAIDA",
                MovementType::Defect => "DEFEITO",
                MovementType::Transfer => "TRANSFERENCIA",
            },
        }
    }
}

impl FromStr for MovementVocabulary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(MovementVocabulary::Legacy),
            "canonical" => Ok(MovementVocabulary::Canonical),
            other => Err(format!("unknown movement vocabulary: {other}")),
        }
    }
}

/// Translate any known external spelling of a movement type.
pub fn parse_movement_type(raw: &str) -> Result<MovementType, WireError> {
    match raw.trim().to_uppercase().as_str() {
        "RECEIPT" | "ENTRADA" | "IN" => Ok(MovementType::Receipt),
        "ISSUE" | "SAIDA" | "SAÍDA" | "OUT" => Ok(MovementType::Issue),
        "DEFECT" | "DEFEITO" => Ok(MovementType::Defect),
        "TRANSFER" | "TRANSFERENCIA" | "TRANSFERÊNCIA" => Ok(MovementType::Transfer),
        _ => Err(WireError::UnknownMovementType(raw.to_string())),
    }
}

/// Parse a remote timestamp.
///
/// RFC 3339 is preferred; an ISO date-time without offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, WireError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| WireError::InvalidTimestamp(raw.to_string()))
}

fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, WireError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(parse_timestamp)
        .transpose()
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, WireError> {
    u32::try_from(value).map_err(|_| WireError::field(field, format!("out of range: {value}")))
}

/// Product as exchanged with the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub current_stock: i64,
    pub minimum_stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ProductDto {
    pub fn into_domain(self) -> Result<Product, WireError> {
        let current_stock = non_negative("currentStock", self.current_stock)?;
        let minimum_stock = non_negative("minimumStock", self.minimum_stock)?;
        let created_at = parse_optional_timestamp(self.created_at.as_deref())?;
        let updated_at = parse_optional_timestamp(self.updated_at.as_deref())?;

        let product = Product::new(
            self.id,
            self.sku,
            self.name,
            self.price,
            current_stock,
            minimum_stock,
        )
        .map_err(|e| WireError::field("price", e.to_string()))?;

        Ok(product
            .with_category(self.category)
            .with_description(self.description)
            .with_image_url(self.image_url)
            .with_timestamps(created_at, updated_at))
    }
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id().clone(),
            sku: p.sku().to_string(),
            name: p.name().to_string(),
            description: p.description().map(str::to_string),
            price: p.price(),
            image_url: p.image_url().map(str::to_string),
            category: p.category().map(str::to_string),
            current_stock: i64::from(p.current_stock()),
            minimum_stock: i64::from(p.minimum_stock()),
            created_at: p.created_at().map(|t| t.to_rfc3339()),
            updated_at: p.updated_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Product reference embedded in a movement.
///
/// The backend may embed the whole product or just its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRefDto {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Movement as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: MovementId,
    pub product: ProductRefDto,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: i64,
    pub reason: String,
    #[serde(default)]
    pub responsible_user: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MovementDto {
    pub fn into_domain(self) -> Result<Movement, WireError> {
        let movement_type = parse_movement_type(&self.movement_type)?;
        let quantity = Quantity::new(self.quantity)
            .ok_or_else(|| WireError::field("quantity", format!("not positive: {}", self.quantity)))?;
        let timestamp = parse_timestamp(&self.timestamp)?;

        Ok(Movement::new(
            self.id,
            ProductRef {
                id: self.product.id,
                sku: self.product.sku.unwrap_or_default(),
                name: self.product.name.unwrap_or_default(),
            },
            MovementDetails {
                movement_type,
                quantity,
                reason: self.reason,
                responsible_user: self.responsible_user,
                notes: self.notes,
            },
            timestamp,
        ))
    }

    pub fn from_domain(m: &Movement, vocabulary: MovementVocabulary) -> Self {
        Self {
            id: m.id().clone(),
            product: ProductRefDto {
                id: m.product().id.clone(),
                sku: Some(m.product().sku.clone()),
                name: Some(m.product().name.clone()),
            },
            movement_type: vocabulary.render(m.movement_type()).to_string(),
            quantity: i64::from(m.quantity().get()),
            reason: m.reason().to_string(),
            responsible_user: m.responsible_user().to_string(),
            timestamp: m.timestamp().to_rfc3339(),
            notes: m.notes().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductIdDto {
    pub id: ProductId,
}

/// Body of a movement creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovementDto {
    pub product: ProductIdDto,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: u32,
    pub reason: String,
    pub responsible_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewMovementDto {
    pub fn new(movement: &ValidatedMovement, vocabulary: MovementVocabulary) -> Self {
        let details = movement.details();
        Self {
            product: ProductIdDto {
                id: movement.product_id().clone(),
            },
            movement_type: vocabulary.render(details.movement_type).to_string(),
            quantity: details.quantity.get(),
            reason: details.reason.clone(),
            responsible_user: details.responsible_user.clone(),
            notes: details.notes.clone(),
        }
    }
}
