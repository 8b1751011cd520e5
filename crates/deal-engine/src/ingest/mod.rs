//! Spreadsheet ingestion boundary: maps exported lead sheets onto typed [`PropertyRecord`]s
//! before anything reaches the analysis pipeline.

mod mapping;
mod normalizer;
mod parser;

use crate::analysis::domain::PropertyRecord;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read property export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid property CSV data: {}", err),
            ImportError::MissingColumn(column) => {
                write!(f, "property export has no '{}' column", column)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct PropertyCsvImporter;

impl PropertyCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PropertyRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, ImportError> {
        let records = parser::parse_records(reader)?;
        tracing::debug!(records = records.len(), "property export parsed");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::RejectedCell;
    use std::io::Cursor;

    #[test]
    fn importer_maps_aliased_headers_onto_typed_fields() {
        let csv = "\u{feff}Lead ID,Property Address,City,ST,Zip,Asking Price,ARV,Repairs,Sq Ft,Year Built,Notes\n\
L-1,12 Elm St,Ames,IA,50010,\"$150,000\",\"$300,000\",\"$20,000\",\"1,500\",1948,Probate sale\n";

        let mut records = PropertyCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        let record = records.pop().expect("one record");

        assert_eq!(record.id.0, "L-1");
        assert_eq!(record.location.address, "12 Elm St");
        assert_eq!(record.location.state, "IA");
        assert_eq!(record.location.postal_code, "50010");
        assert_eq!(record.financials.asking_price, Some(150_000.0));
        assert_eq!(record.financials.after_repair_value, Some(300_000.0));
        assert_eq!(record.financials.repair_estimate, Some(20_000.0));
        assert_eq!(record.financials.square_footage, Some(1_500));
        assert_eq!(record.financials.year_built, Some(1948));
        assert_eq!(record.notes.as_deref(), Some("Probate sale"));
    }

    #[test]
    fn blank_cells_stay_absent_and_rows_without_ids_are_numbered() {
        let csv = "Address,Asking Price,ARV\n9 Oak Ave,95000,\n";

        let records = PropertyCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(records[0].id.0, "row-2");
        assert_eq!(records[0].financials.asking_price, Some(95_000.0));
        assert_eq!(records[0].financials.after_repair_value, None);
    }

    #[test]
    fn missing_address_column_is_rejected() {
        let csv = "ID,Asking Price\nA,100000\n";

        match PropertyCsvImporter::from_reader(Cursor::new(csv)) {
            Err(ImportError::MissingColumn(column)) => assert_eq!(column, "address"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_cell_keeps_the_rest_of_the_sheet() {
        let csv = "ID,Address,Asking Price,Sq Ft\n\
A,1 Main St,100000,1200\n\
B,2 Main St,call agent,1500 sf\n\
C,3 Main St,120000,1300\n";

        let records = PropertyCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(records.len(), 3);
        assert!(records[0].rejected_cells.is_empty());
        assert!(records[2].rejected_cells.is_empty());
        assert_eq!(records[2].financials.asking_price, Some(120_000.0));

        let rejected = &records[1];
        assert_eq!(rejected.id.0, "B");
        assert_eq!(rejected.financials.asking_price, None);
        assert_eq!(
            rejected.rejected_cells,
            vec![
                RejectedCell {
                    field: "asking_price",
                    value: "call agent".to_string(),
                },
                RejectedCell {
                    field: "square_footage",
                    value: "1500 sf".to_string(),
                },
            ]
        );
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        match PropertyCsvImporter::from_path("./does-not-exist.csv") {
            Err(ImportError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
