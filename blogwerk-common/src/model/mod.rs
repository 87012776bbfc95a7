pub mod comment;
pub mod post;

use derive_where::derive_where;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    marker::PhantomData,
    str::FromStr,
};
use thiserror::Error;
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use uuid::Uuid;

/// Fixed-width UTC layout used for stored timestamps, so that ordering by the
/// raw column is chronological on every backend.
pub const STORAGE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Id(#[from] InvalidIdError),
    #[error(transparent)]
    Timestamp(#[from] InvalidTimestampError),
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The id is invalid: {0}")]
pub struct InvalidIdError(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The timestamp is invalid: {0}")]
pub struct InvalidTimestampError(String);

#[derive_where(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(Uuid, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    #[must_use]
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4())
    }

    #[must_use]
    pub fn get(self) -> Uuid {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.hyphenated(), f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self::new)
            .map_err(|_| InvalidIdError(s.to_owned()))
    }
}

impl<Marker> From<Uuid> for Id<Marker> {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self::from_date_time(OffsetDateTime::now_utc())
    }

    /// Normalizes to UTC and drops anything finer than a microsecond, which the
    /// storage format cannot hold.
    #[must_use]
    pub fn from_date_time(date_time: OffsetDateTime) -> Self {
        let utc = date_time.to_offset(UtcOffset::UTC);
        let truncated = utc
            .replace_nanosecond(utc.nanosecond() / 1_000 * 1_000)
            .unwrap_or(utc);

        Self(truncated)
    }

    #[must_use]
    pub fn get(self) -> OffsetDateTime {
        self.0
    }

    #[must_use]
    pub fn to_storage_string(self) -> String {
        self.0
            .format(STORAGE_TIMESTAMP_FORMAT)
            .expect("UTC timestamp could not be formatted.")
    }
}

impl FromStr for Timestamp {
    type Err = InvalidTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveDateTime::parse(s, STORAGE_TIMESTAMP_FORMAT)
            .map(|date_time| Self(date_time.assume_utc()))
            .map_err(|_| InvalidTimestampError(s.to_owned()))
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize, Error)]
#[error("Invalid fields: {}", join_fields(.0))]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

fn join_fields(fields: &BTreeMap<&'static str, &'static str>) -> String {
    fields.keys().copied().collect::<Vec<_>>().join(", ")
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    pub fn require(&mut self, field: &'static str, value: &str, message: &'static str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}
