//! Data types and associated functions and methods

use std::collections::BTreeMap;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use validator::{Validate, ValidationError};

use crate::types::IsoDate;

/// A table of the climate store read by this service.
///
/// Tables are declared explicitly rather than reflected from the store. The store's schema is
/// checked against these declarations at startup.
pub trait Table {
    /// Name of the table.
    const NAME: &'static str;
    /// Columns that must be present in the table.
    const COLUMNS: &'static [&'static str];
}

/// A row of the `measurement` table: one observation per station and date.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Station identifier, references [Station::station]
    pub station: String,
    /// Observation date in `YYYY-MM-DD` form
    pub date: String,
    /// Precipitation, if recorded
    pub prcp: Option<f64>,
    /// Observed temperature
    pub tobs: f64,
}

impl Table for Measurement {
    const NAME: &'static str = "measurement";
    const COLUMNS: &'static [&'static str] = &["station", "date", "prcp", "tobs"];
}

/// A row of the `station` table.
///
/// The table also holds latitude, longitude and elevation, which this service does not read.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    /// Unique station identifier
    pub station: String,
    /// Human readable station name
    pub name: String,
}

impl Table for Station {
    const NAME: &'static str = "station";
    const COLUMNS: &'static [&'static str] = &["station", "name"];
}

/// Daily precipitation, as returned by the precipitation query.
#[derive(Clone, Debug, PartialEq)]
pub struct Precipitation {
    pub date: String,
    pub prcp: Option<f64>,
}

/// An entry of the station list.
///
/// Serialises as a `{"station": .., "name": ..}` map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationEntry {
    pub station: String,
    pub name: String,
}

/// A single temperature observation.
///
/// Serialises as a `[date, tobs]` array.
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: f64,
}

impl Serialize for TemperatureObservation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.date)?;
        tuple.serialize_element(&self.tobs)?;
        tuple.end()
    }
}

/// Minimum, average and maximum temperature observed on one date, over all stations.
///
/// Serialises as a `[date, min, avg, max]` array.
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureStats {
    pub date: String,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl Serialize for TemperatureStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.date)?;
        tuple.serialize_element(&self.min)?;
        tuple.serialize_element(&self.avg)?;
        tuple.serialize_element(&self.max)?;
        tuple.end()
    }
}

/// Precipitation response body: a map from date to precipitation.
///
/// Keys are ordered by date. Where more than one row shares a date, the last row wins.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PrecipitationMap(pub BTreeMap<String, Option<f64>>);

impl FromIterator<Precipitation> for PrecipitationMap {
    fn from_iter<I: IntoIterator<Item = Precipitation>>(rows: I) -> Self {
        Self(rows.into_iter().map(|row| (row.date, row.prcp)).collect())
    }
}

impl From<Station> for StationEntry {
    fn from(station: Station) -> Self {
        Self {
            station: station.station,
            name: station.name,
        }
    }
}

/// Path parameters of the open-ended temperature statistics route.
#[derive(Debug, Deserialize, PartialEq, Validate)]
pub struct StartDate {
    /// First date to include
    #[validate(custom = "validate_iso_date")]
    pub start: String,
}

/// Path parameters of the bounded temperature statistics route.
#[derive(Debug, Deserialize, PartialEq, Validate)]
pub struct DateRange {
    /// First date to include
    #[validate(custom = "validate_iso_date")]
    pub start: String,
    /// Last date to include
    #[validate(custom = "validate_iso_date")]
    pub end: String,
}

/// Validate a date path parameter
fn validate_iso_date(date: &str) -> Result<(), ValidationError> {
    if date.parse::<IsoDate>().is_err() {
        let mut error =
            ValidationError::new("date must be a valid YYYY-MM-DD calendar date in years 0000-9999");
        error.add_param("value".into(), &date);
        return Err(error);
    }
    Ok(())
}

/// Return a date path parameter in canonical `YYYY-MM-DD` form.
///
/// Parameters are validated before this is called; anything that still fails to parse is passed
/// through unchanged.
pub fn canonical_date(date: &str) -> String {
    date.parse::<IsoDate>()
        .map(|date| date.to_string())
        .unwrap_or_else(|_| date.to_string())
}
