//! Request fields that distinguish "not sent" from "sent"

use serde::{Deserialize, Deserializer};

/// A request body field that is either absent or present with a value
///
/// Used with `#[serde(default)]`: a missing key deserializes to
/// `Field::Missing`, while any provided value, including an empty list,
/// becomes `Field::Present`. `null` is only accepted where `T` accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    #[default]
    Missing,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Missing => None,
            Field::Present(value) => Some(value),
        }
    }

    /// Apply a fallible conversion to a present value
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Field<U>, E> {
        match self {
            Field::Missing => Ok(Field::Missing),
            Field::Present(value) => f(value).map(Field::Present),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Field::Present)
    }
}
