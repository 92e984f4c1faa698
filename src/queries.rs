//! Climate store queries.
//!
//! Each query is implemented as a struct that implements the [Query](crate::query::Query) trait.
//! Dates are compared as `YYYY-MM-DD` strings inside SQL.

use crate::error::ClimateApiError;
use crate::models::{
    Precipitation, PrecipitationMap, Station, StationEntry, TemperatureObservation,
    TemperatureStats,
};
use crate::query::Query;
use crate::types::IsoDate;

use rusqlite::{params, Connection, OptionalExtension};

/// Returns the most recent date held in the measurement table.
///
/// # Arguments
///
/// * `connection`: Connection to the climate store
/// * `query`: Name of the query needing the date, reported if the table is empty
pub fn last_date(connection: &Connection, query: &'static str) -> Result<IsoDate, ClimateApiError> {
    let value: Option<String> =
        connection.query_row("SELECT MAX(date) FROM measurement", [], |row| row.get(0))?;
    let value = value.ok_or(ClimateApiError::NoData { query })?;
    value
        .parse()
        .map_err(|source| ClimateApiError::StoredDate { value, source })
}

/// Returns the identifier of the station with the most measurements.
///
/// Ties are broken by choosing the lexicographically smallest station identifier.
///
/// # Arguments
///
/// * `connection`: Connection to the climate store
/// * `query`: Name of the query needing the station, reported if the table is empty
pub fn most_active_station(
    connection: &Connection,
    query: &'static str,
) -> Result<String, ClimateApiError> {
    connection
        .query_row(
            "SELECT station, COUNT(*) AS observations
             FROM measurement
             GROUP BY station
             ORDER BY observations DESC, station ASC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(ClimateApiError::NoData { query })
}

/// Return the distinct stations of the dataset.
pub struct ListStations {}

impl Query for ListStations {
    const NAME: &'static str = "stations";
    type Output = Vec<StationEntry>;

    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
        let mut statement = connection.prepare("SELECT DISTINCT station, name FROM station")?;
        let stations = statement
            .query_map([], |row| {
                Ok(Station {
                    station: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .map(|station| station.map(StationEntry::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stations)
    }
}

/// Return the precipitation of every measurement in the trailing window ending on the last date
/// of the dataset.
pub struct PrecipitationLastYear {}

impl Query for PrecipitationLastYear {
    const NAME: &'static str = "precipitation";
    type Output = PrecipitationMap;

    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
        let window_start = last_date(connection, Self::NAME)?.window_start();
        let mut statement = connection.prepare(
            "SELECT date, prcp FROM measurement
             WHERE date >= ?1
             ORDER BY date",
        )?;
        let precipitation = statement
            .query_map([window_start.to_string()], |row| {
                Ok(Precipitation {
                    date: row.get(0)?,
                    prcp: row.get(1)?,
                })
            })?
            .collect::<Result<PrecipitationMap, _>>()?;
        Ok(precipitation)
    }
}

/// Return the temperature observations of the most active station in the trailing window ending
/// on the last date of the dataset.
pub struct MostActiveStationObservations {}

impl Query for MostActiveStationObservations {
    const NAME: &'static str = "tobs";
    type Output = Vec<TemperatureObservation>;

    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
        let window_start = last_date(connection, Self::NAME)?.window_start();
        let station = most_active_station(connection, Self::NAME)?;
        let mut statement = connection.prepare(
            "SELECT date, tobs FROM measurement
             WHERE date >= ?1 AND station = ?2
             ORDER BY date",
        )?;
        let observations = statement
            .query_map(params![window_start.to_string(), station], |row| {
                Ok(TemperatureObservation {
                    date: row.get(0)?,
                    tobs: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(observations)
    }
}

/// Return minimum, average and maximum temperature per date, for dates on or after `start`.
pub struct TemperatureStatsFrom {
    /// First date to include, in `YYYY-MM-DD` form.
    pub start: String,
}

impl Query for TemperatureStatsFrom {
    const NAME: &'static str = "temperature_stats_from";
    type Output = Vec<TemperatureStats>;

    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
        let mut statement = connection.prepare(
            "SELECT date, MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
             WHERE date >= ?1
             GROUP BY date
             ORDER BY date",
        )?;
        let stats = statement
            .query_map([&self.start], temperature_stats_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stats)
    }
}

/// Return minimum, average and maximum temperature per date, for dates between `start` and `end`
/// inclusive.
pub struct TemperatureStatsRange {
    /// First date to include, in `YYYY-MM-DD` form.
    pub start: String,
    /// Last date to include, in `YYYY-MM-DD` form.
    pub end: String,
}

impl Query for TemperatureStatsRange {
    const NAME: &'static str = "temperature_stats_range";
    type Output = Vec<TemperatureStats>;

    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
        let mut statement = connection.prepare(
            "SELECT date, MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
             WHERE date >= ?1 AND date <= ?2
             GROUP BY date
             ORDER BY date",
        )?;
        let stats = statement
            .query_map([&self.start, &self.end], temperature_stats_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stats)
    }
}

/// Map a `(date, min, avg, max)` row to [TemperatureStats].
fn temperature_stats_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemperatureStats> {
    Ok(TemperatureStats {
        date: row.get(0)?,
        min: row.get(1)?,
        avg: row.get(2)?,
        max: row.get(3)?,
    })
}
