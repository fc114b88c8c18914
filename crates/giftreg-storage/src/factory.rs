#[cfg(feature = "source-csv")]
use crate::CsvSource;
#[cfg(feature = "source-vault")]
use crate::VaultSource;
use crate::{RecordSource, SourceKind, StorageError, StorageResult};
use giftreg_core::ReportConfig;

/// Create a record source based on configuration
pub fn create_source(config: &ReportConfig) -> StorageResult<Box<dyn RecordSource>> {
    match config.source {
        #[cfg(feature = "source-csv")]
        SourceKind::Csv => {
            let path = config.input_path().ok_or_else(|| {
                StorageError::ConfigError(
                    "GIFTREG_INPUT (or --input) must name the CSV export".to_string(),
                )
            })?;
            Ok(Box::new(CsvSource::new(path, config.csv_delimiter)))
        }

        #[cfg(not(feature = "source-csv"))]
        SourceKind::Csv => Err(StorageError::ConfigError(
            "CSV source not available (source-csv feature not enabled)".to_string(),
        )),

        #[cfg(feature = "source-vault")]
        SourceKind::Vault => {
            let root = config
                .input_path()
                .unwrap_or_else(|| config.gifts_dir.clone());
            Ok(Box::new(VaultSource::new(root)?))
        }

        #[cfg(not(feature = "source-vault"))]
        SourceKind::Vault => Err(StorageError::ConfigError(
            "Vault source not available (source-vault feature not enabled)".to_string(),
        )),
    }
}
