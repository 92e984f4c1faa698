use crate::error::ClimateApiError;

use rusqlite::Connection;
use serde::Serialize;

/// Trait for climate store queries.
///
/// This forms the contract between the API layer and the queries. A query runs to completion on
/// a single connection, which it neither opens nor closes.
pub trait Query: Send + 'static {
    /// Name of the query, used in logs and metrics.
    const NAME: &'static str;

    /// Formatted result of the query.
    type Output: Serialize + Send + 'static;

    /// Execute the query.
    ///
    /// Returns the formatted result, ready to be serialised into a response.
    ///
    /// # Arguments
    ///
    /// * `connection`: Connection to the climate store
    fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestQuery {
        value: i64,
    }

    impl Query for TestQuery {
        const NAME: &'static str = "test";
        type Output = Vec<i64>;

        fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
            let doubled = connection.query_row("SELECT ?1 * 2", [self.value], |row| row.get(0))?;
            Ok(vec![self.value, doubled])
        }
    }

    #[test]
    fn query_execute() {
        let connection = Connection::open_in_memory().unwrap();
        let output = TestQuery { value: 21 }.execute(&connection).unwrap();
        assert_eq!(vec![21, 42], output);
        assert_eq!("test", TestQuery::NAME);
    }

    #[test]
    fn query_error() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch("CREATE TABLE t (x INTEGER)")
            .unwrap();
        struct BrokenQuery {}
        impl Query for BrokenQuery {
            const NAME: &'static str = "broken";
            type Output = ();
            fn execute(&self, connection: &Connection) -> Result<Self::Output, ClimateApiError> {
                connection.query_row("SELECT y FROM t", [], |_| Ok(()))?;
                Ok(())
            }
        }
        let error = BrokenQuery {}.execute(&connection).unwrap_err();
        assert!(matches!(error, ClimateApiError::StoreQuery(_)));
    }
}
