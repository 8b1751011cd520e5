use super::mapping::{column_for_header, Column};
use super::normalizer::clean_amount;
use super::ImportError;
use crate::analysis::domain::{PropertyRecord, RejectedCell};
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;
use tracing::warn;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let layout = ColumnLayout::from_headers(csv_reader.headers()?)?;
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        records.push(layout.to_record(&row, line));
    }

    Ok(records)
}

struct ColumnLayout {
    positions: HashMap<Column, usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let mut positions = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(column) = column_for_header(header) {
                positions.entry(column).or_insert(index);
            }
        }

        if !positions.contains_key(&Column::Address) {
            return Err(ImportError::MissingColumn(Column::Address.label()));
        }

        Ok(Self { positions })
    }

    fn text(&self, row: &csv::StringRecord, column: Column) -> Option<String> {
        self.positions
            .get(&column)
            .and_then(|index| row.get(*index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Parses a numeric cell. An unreadable value is kept on the record so the row is
    /// rejected during validation instead of failing the whole sheet.
    fn number<T: FromStr>(
        &self,
        row: &csv::StringRecord,
        column: Column,
        rejected: &mut Vec<RejectedCell>,
    ) -> Option<T> {
        let raw = self.text(row, column)?;
        let cleaned = clean_amount(&raw)?;

        match cleaned.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                rejected.push(RejectedCell {
                    field: column.label(),
                    value: raw,
                });
                None
            }
        }
    }

    fn to_record(&self, row: &csv::StringRecord, line: u64) -> PropertyRecord {
        let id = self
            .text(row, Column::Id)
            .unwrap_or_else(|| format!("row-{line}"));

        let mut record = PropertyRecord::new(id);
        let mut rejected = Vec::new();
        record.location.address = self.text(row, Column::Address).unwrap_or_default();
        record.location.city = self.text(row, Column::City).unwrap_or_default();
        record.location.state = self.text(row, Column::State).unwrap_or_default();
        record.location.postal_code = self.text(row, Column::PostalCode).unwrap_or_default();

        record.financials.asking_price = self.number(row, Column::AskingPrice, &mut rejected);
        record.financials.after_repair_value =
            self.number(row, Column::AfterRepairValue, &mut rejected);
        record.financials.repair_estimate = self.number(row, Column::RepairEstimate, &mut rejected);
        record.financials.square_footage = self.number(row, Column::SquareFootage, &mut rejected);
        record.financials.year_built = self.number(row, Column::YearBuilt, &mut rejected);

        record.notes = self.text(row, Column::Notes);
        record.occupancy = self.text(row, Column::Occupancy);
        record.condition = self.text(row, Column::Condition);
        record.market_volume_score = self.number(row, Column::MarketVolumeScore, &mut rejected);
        record.velocity_score = self.number(row, Column::VelocityScore, &mut rejected);

        record.rejected_cells = rejected;
        if !record.rejected_cells.is_empty() {
            warn!(
                line,
                property_id = %record.id,
                rejected = record.rejected_cells.len(),
                "row kept with unreadable numeric cells"
            );
        }
        record
    }
}
