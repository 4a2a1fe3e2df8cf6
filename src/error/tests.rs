//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod etl_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let etl_error = EtlError::from(json_error);

        match etl_error {
            EtlError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let etl_error = EtlError::from(io_error);

        match etl_error {
            EtlError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let db_error = rusqlite::Error::InvalidColumnType(
            0,
            "obp".to_string(),
            rusqlite::types::Type::Null,
        );
        let etl_error = EtlError::from(db_error);

        match etl_error {
            EtlError::Sqlite(_) => (),
            _ => panic!("Expected Sqlite error variant"),
        }
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_error = "twenty".parse::<u16>().unwrap_err();
        let etl_error = EtlError::from(parse_error);

        match etl_error {
            EtlError::InvalidSeason(_) => (),
            _ => panic!("Expected InvalidSeason error variant"),
        }
    }

    #[test]
    fn test_store_in_use_message() {
        let error = EtlError::StoreInUse {
            path: PathBuf::from("data/baseball.db"),
        };

        let error_string = error.to_string();
        assert!(error_string.contains("in use"));
        assert!(error_string.contains("data/baseball.db"));
    }

    #[test]
    fn test_missing_namespace_names_namespace() {
        let error = EtlError::MissingNamespace {
            namespace: "features".to_string(),
        };

        assert_eq!(error.to_string(), "Namespace 'features' does not exist");
        assert!(error.is_integrity_violation());
    }

    #[test]
    fn test_integrity_helper() {
        let error = EtlError::integrity("raw.team_batting has 3 rows");

        match &error {
            EtlError::Integrity { message } => {
                assert_eq!(message, "raw.team_batting has 3 rows");
            }
            _ => panic!("Expected Integrity error variant"),
        }
        assert!(error.is_integrity_violation());
    }

    #[test]
    fn test_non_integrity_errors() {
        let error = EtlError::Config {
            message: "bad ttl".to_string(),
        };
        assert!(!error.is_integrity_violation());

        let error = EtlError::StoreMissing {
            path: PathBuf::from("data/baseball.db"),
        };
        assert!(!error.is_integrity_violation());
        assert!(error.to_string().contains("run setup first"));
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let etl_error = EtlError::from(io_error);

        let error_trait: &dyn std::error::Error = &etl_error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_result_type_alias_error() {
        fn test_function() -> Result<String> {
            Err(EtlError::integrity("boom"))
        }

        let result = test_function();
        assert!(result.is_err());
    }
}
