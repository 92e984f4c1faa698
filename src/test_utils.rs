use crate::models::{Measurement, Station};
use crate::store::Store;

use rusqlite::{params, Connection};
use std::time::Duration;
use tempfile::TempDir;

/// Stations of the sample dataset.
pub(crate) fn sample_stations() -> Vec<Station> {
    vec![
        Station {
            station: "USC00519397".to_string(),
            name: "WAIKIKI 717.2, HI US".to_string(),
        },
        Station {
            station: "USC00519281".to_string(),
            name: "WAIHEE 837.5, HI US".to_string(),
        },
        Station {
            station: "USC00513117".to_string(),
            name: "KANEOHE 838.1, HI US".to_string(),
        },
    ]
}

/// Create a Measurement.
pub(crate) fn measurement(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Measurement {
    Measurement {
        station: station.to_string(),
        date: date.to_string(),
        prcp,
        tobs,
    }
}

/// Measurements of the sample dataset.
///
/// USC00519281 is the most active station. The last date is 2017-08-23, so the trailing window
/// starts on 2016-08-23.
pub(crate) fn sample_measurements() -> Vec<Measurement> {
    vec![
        measurement("USC00519397", "2010-01-01", Some(0.08), 65.0),
        measurement("USC00519281", "2010-01-01", Some(0.15), 70.0),
        measurement("USC00519281", "2016-08-22", Some(0.4), 78.0),
        measurement("USC00519397", "2016-08-23", Some(0.0), 81.0),
        measurement("USC00519281", "2016-08-23", Some(1.79), 77.0),
        measurement("USC00513117", "2016-08-23", None, 76.0),
        measurement("USC00519281", "2017-08-01", Some(0.0), 70.0),
        measurement("USC00519397", "2017-08-01", Some(0.02), 72.0),
        measurement("USC00513117", "2017-08-01", Some(0.12), 75.0),
        measurement("USC00519281", "2017-08-07", None, 80.0),
        measurement("USC00519397", "2017-08-23", Some(0.0), 81.0),
        measurement("USC00519281", "2017-08-23", Some(0.45), 76.0),
    ]
}

/// Create the climate schema on a connection.
pub(crate) fn create_schema(connection: &Connection) {
    connection
        .execute_batch(
            "CREATE TABLE station (
                 id INTEGER PRIMARY KEY,
                 station TEXT,
                 name TEXT,
                 latitude FLOAT,
                 longitude FLOAT,
                 elevation FLOAT
             );
             CREATE TABLE measurement (
                 id INTEGER PRIMARY KEY,
                 station TEXT,
                 date TEXT,
                 prcp FLOAT,
                 tobs FLOAT
             );",
        )
        .unwrap();
}

/// Insert stations and measurements into a connection with the climate schema.
pub(crate) fn insert(connection: &Connection, stations: &[Station], measurements: &[Measurement]) {
    for station in stations {
        connection
            .execute(
                "INSERT INTO station (station, name, latitude, longitude, elevation)
                 VALUES (?1, ?2, 21.27, -157.82, 3.0)",
                params![station.station, station.name],
            )
            .unwrap();
    }
    for measurement in measurements {
        connection
            .execute(
                "INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
                params![
                    measurement.station,
                    measurement.date,
                    measurement.prcp,
                    measurement.tobs
                ],
            )
            .unwrap();
    }
}

/// Create an in-memory connection holding the sample stations and the given measurements.
pub(crate) fn get_test_connection(measurements: &[Measurement]) -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    create_schema(&connection);
    insert(&connection, &sample_stations(), measurements);
    connection
}

/// Create a database file holding the sample stations and the given measurements.
///
/// Returns the temporary directory, which removes the file when dropped, and a Store for it.
pub(crate) fn get_test_store(measurements: &[Measurement]) -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hawaii.sqlite");
    let connection = Connection::open(&path).unwrap();
    create_schema(&connection);
    insert(&connection, &sample_stations(), measurements);
    drop(connection);
    let store = Store::new(path.to_str().unwrap(), Duration::from_secs(1)).unwrap();
    (dir, store)
}
