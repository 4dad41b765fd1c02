use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Trait for enums whose variants have a fixed wire name.
///
/// This is implemented by the message type enums in this crate (via the request
/// pair macro) so that [`EnumString`] can compare known variants against raw
/// strings without serializing.
pub trait VariantName {
    /// Returns the wire name of this variant.
    fn variant_name(&self) -> &'static str;
}

// Helper enum allowing serde to retain arbitrary unknown string values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Enum<T> {
    Known(T),
    Unknown(Cow<'static, str>),
}

/// Wrapper type for an `enum` with a serialized string representation.
///
/// This allows for defining an `enum` with a set of known values, but still
/// accept other arbitrary string values when serializing/deserializing. The
/// server is free to introduce new message types without breaking this crate.
///
/// # Example
///
/// ```
/// use vts_controller::data::{EnumString, ResponseType};
///
/// let known = EnumString::new(ResponseType::AvailableModelsResponse);
/// let raw = EnumString::new_from_str("AvailableModelsResponse");
///
/// assert_eq!(known, ResponseType::AvailableModelsResponse);
/// assert_eq!(known, raw);
/// assert_eq!(raw.as_str(), "AvailableModelsResponse");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumString<T>(Enum<T>);

impl<T> EnumString<T> {
    /// Creates a new value from a known variant.
    pub const fn new(variant: T) -> Self {
        Self(Enum::Known(variant))
    }

    /// Creates a new value from a raw string.
    pub fn new_from_str<S>(value: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self(Enum::Unknown(value.into()))
    }

    /// Creates a new value from a `const` static string slice.
    pub const fn const_new_from_str(value: &'static str) -> Self {
        Self(Enum::Unknown(Cow::Borrowed(value)))
    }
}

impl<T: VariantName> EnumString<T> {
    /// Returns the string representation.
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Enum::Known(value) => value.variant_name(),
            Enum::Unknown(value) => value.as_ref(),
        }
    }
}

impl<T: Default> Default for EnumString<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for EnumString<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: VariantName + PartialEq> PartialEq for EnumString<T> {
    fn eq(&self, rhs: &Self) -> bool {
        match (&self.0, &rhs.0) {
            (Enum::Known(a), Enum::Known(b)) => a == b,
            _ => self.as_str() == rhs.as_str(),
        }
    }
}

impl<T: VariantName + PartialEq> PartialEq<T> for EnumString<T> {
    fn eq(&self, rhs: &T) -> bool {
        match &self.0 {
            Enum::Known(value) => value == rhs,
            Enum::Unknown(value) => value.as_ref() == rhs.variant_name(),
        }
    }
}

impl<T: VariantName> fmt::Display for EnumString<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
