//! Service records owned by a user.
//!
//! Records are stored under `services/<ownerId>/<serviceId>` as
//! `{ "name", "desc", "price" }` with `price` a JSON number. The owner never
//! appears inside the document; it is implied by the path.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::identity::UserId;
use crate::domain::validation::{
    FieldChecks, ValidationErrors, positive_number_rule, required_rule,
};

/// Form field holding the service name.
pub const NAME_FIELD: &str = "name";
/// Form field holding the service description.
pub const DESCRIPTION_FIELD: &str = "description";
/// Form field holding the price.
pub const PRICE_FIELD: &str = "price";

/// Validation errors for service value objects.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceValidationError {
    /// Blank service id.
    EmptyId,
    /// Service id that is not a single path segment.
    InvalidId,
    /// The named text field was blank.
    BlankText(&'static str),
    /// Price zero, negative, or not finite.
    NonPositivePrice(f64),
}

impl fmt::Display for ServiceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "service id must not be empty"),
            Self::InvalidId => write!(f, "service id must be a single path segment"),
            Self::BlankText(field) => write!(f, "service {field} must not be blank"),
            Self::NonPositivePrice(price) => {
                write!(f, "price {price} must be a finite number greater than zero")
            }
        }
    }
}

impl std::error::Error for ServiceValidationError {}

/// Store-assigned record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceId(String);

impl ServiceId {
    /// Validate and construct a [`ServiceId`].
    pub fn new(id: impl Into<String>) -> Result<Self, ServiceValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ServiceValidationError::EmptyId);
        }
        if id.trim() != id || id.contains('/') {
            return Err(ServiceValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ServiceId> for String {
    fn from(value: ServiceId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ServiceId {
    type Error = ServiceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive, finite price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Validate and construct a [`Price`].
    pub fn new(value: f64) -> Result<Self, ServiceValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ServiceValidationError::NonPositivePrice(value));
        }
        Ok(Self(value))
    }

    /// Price as a plain number.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ServiceValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated service fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDraft {
    name: String,
    #[serde(rename = "desc")]
    description: String,
    price: Price,
}

impl ServiceDraft {
    /// Build a draft from already validated parts.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
    ) -> Result<Self, ServiceValidationError> {
        let name = name.into().trim().to_owned();
        let description = description.into().trim().to_owned();
        if name.is_empty() {
            return Err(ServiceValidationError::BlankText("name"));
        }
        if description.is_empty() {
            return Err(ServiceValidationError::BlankText("description"));
        }
        Ok(Self {
            name,
            description,
            price,
        })
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Service price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Encode the stored document.
    pub fn to_document(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "desc": self.description,
            "price": self.price.value(),
        })
    }

    /// Decode a stored document.
    pub fn from_document(document: &Value) -> Result<Self, serde_json::Error> {
        let draft: Self = serde_json::from_value(document.clone())?;
        Self::new(draft.name, draft.description, draft.price)
            .map_err(serde::de::Error::custom)
    }
}

/// A service as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRecord {
    id: ServiceId,
    owner_id: UserId,
    draft: ServiceDraft,
}

impl ServiceRecord {
    /// Assemble a record from its key, owner, and stored fields.
    pub fn new(id: ServiceId, owner_id: UserId, draft: ServiceDraft) -> Self {
        Self {
            id,
            owner_id,
            draft,
        }
    }

    /// Record key.
    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Owner implied by the storage path.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Service name.
    pub fn name(&self) -> &str {
        self.draft.name()
    }

    /// Service description.
    pub fn description(&self) -> &str {
        self.draft.description()
    }

    /// Service price.
    pub fn price(&self) -> Price {
        self.draft.price()
    }

    /// Stored fields.
    pub fn draft(&self) -> &ServiceDraft {
        &self.draft
    }
}

/// Raw input of the add and edit screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    /// Raw name.
    pub name: String,
    /// Raw description.
    pub description: String,
    /// Raw price text.
    pub price: String,
}

impl ServiceForm {
    /// Build a form from raw input.
    pub fn new(name: &str, description: &str, price: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            price: price.to_owned(),
        }
    }

    /// Prefill the edit form from a stored record.
    pub fn from_record(record: &ServiceRecord) -> Self {
        Self {
            name: record.name().to_owned(),
            description: record.description().to_owned(),
            price: record.price().to_string(),
        }
    }

    /// Validate every field into a draft.
    ///
    /// # Examples
    /// ```
    /// use client::domain::ServiceForm;
    ///
    /// let draft = ServiceForm::new("Haircut", "Basic cut", "19.99").validate().unwrap();
    /// assert_eq!(draft.price().value(), 19.99);
    /// ```
    pub fn validate(&self) -> Result<ServiceDraft, ValidationErrors> {
        let mut checks = FieldChecks::default();
        let name = checks.check(required_rule(NAME_FIELD, &self.name));
        let description = checks.check(required_rule(DESCRIPTION_FIELD, &self.description));
        let price = checks.check(positive_number_rule(PRICE_FIELD, &self.price));
        checks.finish()?;

        match (name, description, price.map(Price::new)) {
            (Some(name), Some(description), Some(Ok(price))) => Ok(ServiceDraft {
                name,
                description,
                price,
            }),
            _ => Err(ValidationErrors::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::validation::FieldErrorKind;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn form_parses_decimal_price() {
        let draft = ServiceForm::new(" Haircut ", "Basic cut", "19.99")
            .validate()
            .expect("valid form");
        assert_eq!(draft.name(), "Haircut");
        assert!((draft.price().value() - 19.99).abs() < f64::EPSILON);
    }

    #[rstest]
    fn form_reports_all_invalid_fields() {
        let errors = ServiceForm::new("", " ", "-2")
            .validate()
            .expect_err("invalid form");
        let kinds: Vec<_> = errors
            .iter()
            .map(|error| (error.field(), error.kind().clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (NAME_FIELD, FieldErrorKind::Required),
                (DESCRIPTION_FIELD, FieldErrorKind::Required),
                (PRICE_FIELD, FieldErrorKind::NotPositive),
            ]
        );
    }

    #[rstest]
    fn document_uses_stored_key_names() {
        let draft = ServiceForm::new("Haircut", "Basic cut", "25")
            .validate()
            .expect("valid form");
        assert_eq!(
            draft.to_document(),
            json!({ "name": "Haircut", "desc": "Basic cut", "price": 25.0 })
        );
    }

    #[rstest]
    #[case(json!({ "name": "A", "desc": "B", "price": "25" }))]
    #[case(json!({ "name": "A", "desc": "B", "price": 0 }))]
    #[case(json!({ "name": " ", "desc": "B", "price": 3 }))]
    #[case(json!({ "name": "A", "price": 3 }))]
    fn malformed_documents_fail_to_decode(#[case] document: Value) {
        assert!(ServiceDraft::from_document(&document).is_err());
    }

    #[rstest]
    fn edit_prefill_uses_plain_price() {
        let draft = ServiceForm::new("Haircut", "Basic cut", "25")
            .validate()
            .expect("valid form");
        let record = ServiceRecord::new(
            ServiceId::new("s1").expect("id"),
            UserId::new("u1").expect("owner"),
            draft,
        );
        let form = ServiceForm::from_record(&record);
        assert_eq!(form.price, "25");
        assert!(form.validate().is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    fn service_id_must_be_a_segment(#[case] raw: &str) {
        assert!(ServiceId::new(raw).is_err());
    }

    #[rstest]
    fn price_rejects_non_finite() {
        assert!(Price::new(f64::NAN).is_err());
        assert!(Price::new(f64::INFINITY).is_err());
    }
}
