//! Profile data model and its document mapping.
//!
//! A profile lives in the document store at `users/<userId>` with the keys
//! `fullName`, `age`, `gender`, and `avatarUrl`. Reads are lenient: a missing
//! document is an empty profile and a malformed field degrades to its empty
//! value. Writes always go through [`ProfileForm::validate`].

use std::fmt;

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::validation::{
    FieldChecks, FieldError, FieldErrorKind, ValidationErrors, integer_range_rule,
};

/// Largest accepted age.
pub const AGE_MAX: u8 = 150;

/// Field names used by the profile form and the stored document.
pub const FULL_NAME_FIELD: &str = "fullName";
/// Age field name.
pub const AGE_FIELD: &str = "age";
/// Gender field name.
pub const GENDER_FIELD: &str = "gender";
/// Avatar field name in the stored document.
pub const AVATAR_FIELD: &str = "avatarUrl";

/// Validation errors for profile value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// Age outside `0..=AGE_MAX`.
    AgeOutOfRange(i64),
    /// Blank avatar location.
    EmptyAvatarUri,
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgeOutOfRange(age) => write!(f, "age {age} must be between 0 and {AGE_MAX}"),
            Self::EmptyAvatarUri => write!(f, "avatar uri must not be empty"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Age in whole years, `0..=150`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Age(u8);

impl Age {
    /// Validate and construct an [`Age`].
    pub fn new(years: i64) -> Result<Self, ProfileValidationError> {
        u8::try_from(years)
            .ok()
            .filter(|value| *value <= AGE_MAX)
            .map(Self)
            .ok_or(ProfileValidationError::AgeOutOfRange(years))
    }

    /// Age in years.
    pub fn years(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gender selected in the profile editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Not chosen.
    #[default]
    Unspecified,
    /// Stored as "Nam".
    Male,
    /// Stored as "Nữ".
    Female,
}

impl Gender {
    /// Parse a form or stored value. Blank input is [`Gender::Unspecified`].
    ///
    /// Accepts both the English option names and the stored Vietnamese
    /// labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" => Some(Self::Unspecified),
            "male" | "nam" => Some(Self::Male),
            "female" | "nữ" => Some(Self::Female),
            _ => None,
        }
    }

    /// Value written to the profile document.
    pub fn stored_label(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Male => "Nam",
            Self::Female => "Nữ",
        }
    }
}

/// Durable local path of the user's avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvatarUri(String);

impl AvatarUri {
    /// Validate and construct an [`AvatarUri`].
    pub fn new(uri: impl Into<String>) -> Result<Self, ProfileValidationError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(ProfileValidationError::EmptyAvatarUri);
        }
        Ok(Self(uri))
    }
}

impl AsRef<str> for AvatarUri {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AvatarUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User profile as shown in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Display name.
    pub full_name: Option<String>,
    /// Age in years.
    pub age: Option<Age>,
    /// Gender.
    pub gender: Gender,
    /// Stored avatar location.
    pub avatar_uri: Option<AvatarUri>,
}

impl Profile {
    /// Decode a stored profile document.
    ///
    /// Unknown keys are ignored; malformed values are dropped with a warning.
    pub fn from_document(document: &Value) -> Self {
        let Some(fields) = document.as_object() else {
            warn!(kind = %value_kind(document), "profile document is not an object");
            return Self::default();
        };

        let full_name = fields
            .get(FULL_NAME_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        let age = fields.get(AGE_FIELD).and_then(decode_age);

        let gender = match fields.get(GENDER_FIELD).and_then(Value::as_str) {
            None => Gender::Unspecified,
            Some(raw) => Gender::parse(raw).unwrap_or_else(|| {
                warn!(gender = raw, "dropping unknown stored gender");
                Gender::Unspecified
            }),
        };

        let avatar_uri = fields
            .get(AVATAR_FIELD)
            .and_then(Value::as_str)
            .and_then(|uri| AvatarUri::new(uri).ok());

        Self {
            full_name,
            age,
            gender,
            avatar_uri,
        }
    }

    /// Encode the full profile document. Empty fields are written as `""`.
    pub fn to_document(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(
            FULL_NAME_FIELD.to_owned(),
            Value::from(self.full_name.clone().unwrap_or_default()),
        );
        fields.insert(
            AGE_FIELD.to_owned(),
            self.age
                .map_or_else(|| Value::from(""), |age| Value::from(age.years())),
        );
        fields.insert(
            GENDER_FIELD.to_owned(),
            Value::from(self.gender.stored_label()),
        );
        fields.insert(
            AVATAR_FIELD.to_owned(),
            Value::from(
                self.avatar_uri
                    .as_ref()
                    .map(|uri| uri.as_ref().to_owned())
                    .unwrap_or_default(),
            ),
        );
        Value::Object(fields)
    }

    /// Document fragment carrying only the avatar, for merge writes.
    pub fn avatar_patch(uri: &AvatarUri) -> Value {
        let mut fields = Map::new();
        fields.insert(AVATAR_FIELD.to_owned(), Value::from(uri.as_ref()));
        Value::Object(fields)
    }
}

fn decode_age(value: &Value) -> Option<Age> {
    let years = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) if raw.trim().is_empty() => return None,
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    };
    match years.map(Age::new) {
        Some(Ok(age)) => Some(age),
        Some(Err(error)) => {
            warn!(%error, "dropping out-of-range stored age");
            None
        }
        None => {
            warn!(kind = %value_kind(value), "dropping malformed stored age");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Raw input of the profile editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    /// Raw full name.
    pub full_name: String,
    /// Raw age text.
    pub age: String,
    /// Raw gender option.
    pub gender: String,
}

impl ProfileForm {
    /// Prefill the editor from a loaded profile.
    pub fn from_profile(profile: &Profile) -> Self {
        let gender = match profile.gender {
            Gender::Unspecified => "",
            Gender::Male => "male",
            Gender::Female => "female",
        };
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            age: profile.age.map(|age| age.to_string()).unwrap_or_default(),
            gender: gender.to_owned(),
        }
    }

    /// Validate the form into a profile carrying `avatar_uri` unchanged.
    ///
    /// Age is a required whole number in `0..=150`; the full name is
    /// optional; gender must be one of the offered options.
    pub fn validate(&self, avatar_uri: Option<AvatarUri>) -> Result<Profile, ValidationErrors> {
        let mut checks = FieldChecks::default();
        let age = checks
            .check(integer_range_rule(
                AGE_FIELD,
                &self.age,
                0,
                i64::from(AGE_MAX),
            ))
            .and_then(|years| Age::new(years).ok());
        let gender = checks.check(
            Gender::parse(&self.gender)
                .ok_or_else(|| FieldError::new(GENDER_FIELD, FieldErrorKind::UnknownOption)),
        );
        checks.finish()?;

        let full_name = Some(self.full_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        Ok(Profile {
            full_name,
            age,
            gender: gender.unwrap_or_default(),
            avatar_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, true)]
    #[case(150, true)]
    #[case(151, false)]
    #[case(-1, false)]
    fn age_bounds(#[case] years: i64, #[case] ok: bool) {
        assert_eq!(Age::new(years).is_ok(), ok);
    }

    #[rstest]
    fn missing_fields_decode_to_empty_profile() {
        assert_eq!(Profile::from_document(&json!({})), Profile::default());
        assert_eq!(Profile::from_document(&json!(null)), Profile::default());
    }

    #[rstest]
    fn decodes_legacy_string_ages_and_labels() {
        let profile = Profile::from_document(&json!({
            "fullName": "Lan",
            "age": "30",
            "gender": "Nữ",
            "avatarUrl": "/data/avatars/lan.png"
        }));
        assert_eq!(profile.full_name.as_deref(), Some("Lan"));
        assert_eq!(profile.age.map(Age::years), Some(30));
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(
            profile.avatar_uri.as_ref().map(AsRef::as_ref),
            Some("/data/avatars/lan.png")
        );
    }

    #[rstest]
    fn malformed_values_degrade_to_empty() {
        let profile = Profile::from_document(&json!({
            "age": 200,
            "gender": "robot",
            "avatarUrl": ""
        }));
        assert_eq!(profile, Profile::default());
    }

    #[rstest]
    fn to_document_writes_every_key() {
        let profile = Profile {
            full_name: Some("Minh".to_owned()),
            age: Age::new(41).ok(),
            gender: Gender::Male,
            avatar_uri: None,
        };
        assert_eq!(
            profile.to_document(),
            json!({ "fullName": "Minh", "age": 41, "gender": "Nam", "avatarUrl": "" })
        );
        assert_eq!(Profile::from_document(&profile.to_document()), profile);
    }

    #[rstest]
    fn form_rejects_age_above_limit() {
        let form = ProfileForm {
            full_name: "Old".to_owned(),
            age: "200".to_owned(),
            gender: String::new(),
        };
        let errors = form.validate(None).expect_err("too old");
        assert_eq!(
            errors.for_field(AGE_FIELD).map(FieldError::kind),
            Some(&FieldErrorKind::OutOfRange { min: 0, max: 150 })
        );
    }

    #[rstest]
    fn form_accepts_upper_bound_and_keeps_avatar() {
        let avatar = AvatarUri::new("/a.png").ok();
        let form = ProfileForm {
            full_name: "  ".to_owned(),
            age: "150".to_owned(),
            gender: "female".to_owned(),
        };
        let profile = form.validate(avatar.clone()).expect("valid profile");
        assert_eq!(profile.age.map(Age::years), Some(150));
        assert_eq!(profile.full_name, None);
        assert_eq!(profile.avatar_uri, avatar);
    }

    #[rstest]
    #[case("", FieldErrorKind::Required)]
    #[case("abc", FieldErrorKind::NotAnInteger)]
    fn form_requires_numeric_age(#[case] age: &str, #[case] kind: FieldErrorKind) {
        let form = ProfileForm {
            age: age.to_owned(),
            gender: "other".to_owned(),
            ..ProfileForm::default()
        };
        let errors = form.validate(None).expect_err("invalid");
        assert_eq!(errors.for_field(AGE_FIELD).map(FieldError::kind), Some(&kind));
        assert_eq!(
            errors.for_field(GENDER_FIELD).map(FieldError::kind),
            Some(&FieldErrorKind::UnknownOption)
        );
    }

    #[rstest]
    fn form_prefill_round_trips() {
        let profile = Profile {
            full_name: Some("Minh".to_owned()),
            age: Age::new(41).ok(),
            gender: Gender::Male,
            avatar_uri: None,
        };
        let form = ProfileForm::from_profile(&profile);
        assert_eq!(form.validate(None).expect("valid"), profile);
    }
}
