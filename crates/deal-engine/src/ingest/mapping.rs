use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Typed destination of a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    Id,
    Address,
    City,
    State,
    PostalCode,
    AskingPrice,
    AfterRepairValue,
    RepairEstimate,
    SquareFootage,
    YearBuilt,
    Notes,
    Occupancy,
    Condition,
    MarketVolumeScore,
    VelocityScore,
}

impl Column {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Address => "address",
            Column::City => "city",
            Column::State => "state",
            Column::PostalCode => "postal_code",
            Column::AskingPrice => "asking_price",
            Column::AfterRepairValue => "after_repair_value",
            Column::RepairEstimate => "repair_estimate",
            Column::SquareFootage => "square_footage",
            Column::YearBuilt => "year_built",
            Column::Notes => "notes",
            Column::Occupancy => "occupancy",
            Column::Condition => "condition",
            Column::MarketVolumeScore => "market_volume_score",
            Column::VelocityScore => "velocity_score",
        }
    }
}

static HEADER_ALIASES: OnceLock<HashMap<String, Column>> = OnceLock::new();

pub(crate) fn column_for_header(header: &str) -> Option<Column> {
    header_aliases().get(&normalize_header(header)).copied()
}

fn header_aliases() -> &'static HashMap<String, Column> {
    HEADER_ALIASES.get_or_init(|| {
        const ALIASES: &[(&str, Column)] = &[
            // Identity
            ("id", Column::Id),
            ("property id", Column::Id),
            ("lead id", Column::Id),
            ("record id", Column::Id),
            // Location
            ("address", Column::Address),
            ("property address", Column::Address),
            ("street address", Column::Address),
            ("street", Column::Address),
            ("city", Column::City),
            ("state", Column::State),
            ("st", Column::State),
            ("zip", Column::PostalCode),
            ("zip code", Column::PostalCode),
            ("zipcode", Column::PostalCode),
            ("postal code", Column::PostalCode),
            // Financials
            ("asking price", Column::AskingPrice),
            ("asking", Column::AskingPrice),
            ("list price", Column::AskingPrice),
            ("price", Column::AskingPrice),
            ("arv", Column::AfterRepairValue),
            ("after repair value", Column::AfterRepairValue),
            ("after-repair value", Column::AfterRepairValue),
            ("estimated arv", Column::AfterRepairValue),
            ("repairs", Column::RepairEstimate),
            ("repair estimate", Column::RepairEstimate),
            ("estimated repairs", Column::RepairEstimate),
            ("rehab", Column::RepairEstimate),
            ("rehab cost", Column::RepairEstimate),
            ("sqft", Column::SquareFootage),
            ("sq ft", Column::SquareFootage),
            ("square feet", Column::SquareFootage),
            ("square footage", Column::SquareFootage),
            ("living area", Column::SquareFootage),
            ("year built", Column::YearBuilt),
            ("built", Column::YearBuilt),
            // Qualitative
            ("notes", Column::Notes),
            ("description", Column::Notes),
            ("comments", Column::Notes),
            ("occupancy", Column::Occupancy),
            ("occupancy status", Column::Occupancy),
            ("condition", Column::Condition),
            ("property condition", Column::Condition),
            // Market signals
            ("market volume", Column::MarketVolumeScore),
            ("market volume score", Column::MarketVolumeScore),
            ("velocity", Column::VelocityScore),
            ("velocity score", Column::VelocityScore),
            ("market velocity", Column::VelocityScore),
        ];

        let mut map = HashMap::with_capacity(ALIASES.len());
        for (header, column) in ALIASES {
            map.insert(normalize_header(header), *column);
        }
        map
    })
}
