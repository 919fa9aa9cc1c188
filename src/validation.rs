//! Input validation for the demand/supply table and the OD matrix.
//!
//! Raw CSV tables are read as plain strings, then checked and converted in one
//! place: headers are mapped through the accepted aliases, names are trimmed,
//! numbers accept a decimal comma and must be finite and non-negative, and
//! every OD endpoint must name a known municipality.

use crate::error::{AllocationError, Result};
use crate::instance::{Municipality, OdPair};
use std::collections::{HashMap, HashSet};
use std::io::Read;

pub const NAME: &str = "NAME";
pub const SUPPLY: &str = "SUPPLY";
pub const INDUSTRIAL_DEMAND: &str = "INDUSTRIAL_DEMAND";
pub const RESIDENTIAL_DEMAND: &str = "RESIDENTIAL_DEMAND";

pub const ORIGIN_ID: &str = "origin_id";
pub const DESTINATION_ID: &str = "destination_id";
pub const DISTANCE_KM: &str = "distance_km";

/// Alternative header spellings found in exported demand/supply files
const DEMAND_SUPPLY_ALIASES: &[(&str, &str)] = &[
    ("name", NAME),
    ("supply", SUPPLY),
    ("industrial_demand", INDUSTRIAL_DEMAND),
    ("DEMAND_INDUSTRY", INDUSTRIAL_DEMAND),
    ("residential_demand", RESIDENTIAL_DEMAND),
    ("DEMAND_RESIDENTIAL", RESIDENTIAL_DEMAND),
];

/// Alternative header spellings found in OD matrix exports
const OD_ALIASES: &[(&str, &str)] = &[
    ("Origin", ORIGIN_ID),
    ("Destination", DESTINATION_ID),
    ("Distance_km", DISTANCE_KM),
    ("distance", DISTANCE_KM),
];

/// A CSV table before validation: a header row and string cells
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Table label used in error messages
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// Read a whole CSV source. A leading UTF-8 BOM is dropped and the
    /// delimiter (`;` or `,`) is detected from the header line.
    pub fn from_reader<R: Read>(name: &str, mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let delimiter = sniff_delimiter(content);
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        log::debug!(
            "Read {} rows from {} (delimiter {:?})",
            rows.len(),
            name,
            delimiter as char
        );

        Ok(RawTable::new(name, headers, rows))
    }

    /// Cell text, trimmed. CSV input is already trimmed by the reader; tables
    /// built with [`RawTable::new`] are not.
    fn cell<'a>(&self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(|c| c.trim()).unwrap_or("")
    }

    fn column_indices(
        &self,
        aliases: &[(&'static str, &'static str)],
        required: &[&str],
    ) -> Result<Vec<usize>> {
        let canonical: Vec<&str> = self
            .headers
            .iter()
            .map(|h| canonical_header(h.trim(), aliases))
            .collect();

        let mut indices = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for &column in required {
            match canonical.iter().position(|&h| h == column) {
                Some(idx) => indices.push(idx),
                None => missing.push(column.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(AllocationError::Schema {
                table: self.name.clone(),
                missing,
            })
        }
    }

    fn invalid(&self, row: usize, column: &str, value: &str, reason: &str) -> AllocationError {
        AllocationError::InvalidValue {
            table: self.name.clone(),
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Parse a non-negative quantity. With `blank_as_zero`, empty cells and
    /// `nan` count as 0.
    fn quantity(&self, row: usize, column: &str, raw: &str, blank_as_zero: bool) -> Result<f64> {
        let normalized = raw.trim().replace(',', ".");
        if blank_as_zero && (normalized.is_empty() || normalized.eq_ignore_ascii_case("nan")) {
            return Ok(0.0);
        }

        let value: f64 = normalized
            .parse()
            .map_err(|_| self.invalid(row, column, raw, "not a number"))?;
        if !value.is_finite() {
            return Err(self.invalid(row, column, raw, "not a finite number"));
        }
        if value < 0.0 {
            return Err(self.invalid(row, column, raw, "negative"));
        }
        Ok(value)
    }
}

fn canonical_header<'a>(header: &'a str, aliases: &[(&'a str, &'a str)]) -> &'a str {
    aliases
        .iter()
        .find(|(alias, _)| *alias == header)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(header)
}

/// Semicolon when it splits the header line into several columns, comma otherwise
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let columns = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_reader(header.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(0, |r| r.len());

    if columns > 1 {
        b';'
    } else {
        b','
    }
}

/// Validate the demand/supply table. Rows are numbered from 1 after the header.
/// NAME is unique: a repeated name is an error.
pub fn validate_demand_supply(table: &RawTable) -> Result<Vec<Municipality>> {
    let columns = table.column_indices(
        DEMAND_SUPPLY_ALIASES,
        &[NAME, SUPPLY, INDUSTRIAL_DEMAND, RESIDENTIAL_DEMAND],
    )?;

    let mut municipalities = Vec::with_capacity(table.rows.len());
    let mut seen = HashSet::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let name = table.cell(row, columns[0]);
        if name.is_empty() {
            return Err(table.invalid(row_no, NAME, name, "empty municipality name"));
        }

        let supply = table.quantity(row_no, SUPPLY, table.cell(row, columns[1]), true)?;
        let industrial = table.quantity(row_no, INDUSTRIAL_DEMAND, table.cell(row, columns[2]), true)?;
        let residential = table.quantity(row_no, RESIDENTIAL_DEMAND, table.cell(row, columns[3]), true)?;

        if !seen.insert(name.to_string()) {
            return Err(table.invalid(row_no, NAME, name, "duplicate municipality name"));
        }

        municipalities.push(Municipality::new(name, supply, industrial, residential));
    }

    Ok(municipalities)
}

/// Validate the OD matrix against the municipality index. A repeated
/// (origin, destination) pair keeps its first row.
pub fn validate_od(table: &RawTable, index: &HashMap<String, usize>) -> Result<Vec<OdPair>> {
    let columns = table.column_indices(OD_ALIASES, &[ORIGIN_ID, DESTINATION_ID, DISTANCE_KM])?;

    let lookup = |row_no: usize, column: &str, name: &str| -> Result<usize> {
        if name.is_empty() {
            return Err(table.invalid(row_no, column, name, "empty municipality name"));
        }
        index
            .get(name)
            .copied()
            .ok_or_else(|| AllocationError::UnknownReference {
                row: row_no,
                column: column.to_string(),
                name: name.to_string(),
            })
    };

    let mut pairs = Vec::with_capacity(table.rows.len());
    let mut seen = HashSet::new();

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;
        let origin = lookup(row_no, ORIGIN_ID, table.cell(row, columns[0]))?;
        let destination = lookup(row_no, DESTINATION_ID, table.cell(row, columns[1]))?;
        let distance_km = table.quantity(row_no, DISTANCE_KM, table.cell(row, columns[2]), false)?;

        if !seen.insert((origin, destination)) {
            log::warn!(
                "{} row {}: duplicate pair {} -> {} ignored",
                table.name,
                row_no,
                table.cell(row, columns[0]),
                table.cell(row, columns[1])
            );
            continue;
        }

        pairs.push(OdPair {
            origin,
            destination,
            distance_km,
        });
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, text: &str) -> RawTable {
        RawTable::from_reader(name, text.as_bytes()).unwrap()
    }

    fn index_of(municipalities: &[Municipality]) -> HashMap<String, usize> {
        municipalities
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect()
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("NAME;SUPPLY\nA;1"), b';');
        assert_eq!(sniff_delimiter("NAME,SUPPLY\nA,1"), b',');
        assert_eq!(sniff_delimiter("\"a;b\",c\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_bom_and_semicolon() {
        let raw = table("demand_supply", "\u{feff}NAME;SUPPLY;INDUSTRIAL_DEMAND;RESIDENTIAL_DEMAND\n Győr ;12,5;3;\n");
        assert_eq!(raw.headers[0], "NAME");

        let municipalities = validate_demand_supply(&raw).unwrap();
        assert_eq!(municipalities, vec![Municipality::new("Győr", 12.5, 3.0, 0.0)]);
    }

    #[test]
    fn test_header_aliases() {
        let raw = table(
            "demand_supply",
            "name,supply,DEMAND_INDUSTRY,DEMAND_RESIDENTIAL\nA,1,2,3\n",
        );
        let municipalities = validate_demand_supply(&raw).unwrap();
        assert_eq!(municipalities[0], Municipality::new("A", 1.0, 2.0, 3.0));

        let od = table("OD matrix", "Origin,Destination,distance\nA,A,0\n");
        let pairs = validate_od(&od, &index_of(&municipalities)).unwrap();
        assert_eq!(pairs, vec![OdPair { origin: 0, destination: 0, distance_km: 0.0 }]);
    }

    #[test]
    fn test_missing_columns() {
        let raw = table("demand_supply", "NAME,SUPPLY\nA,1\n");
        match validate_demand_supply(&raw) {
            Err(AllocationError::Schema { table, missing }) => {
                assert_eq!(table, "demand_supply");
                assert_eq!(missing, vec![INDUSTRIAL_DEMAND.to_string(), RESIDENTIAL_DEMAND.to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }

        let od = table("OD matrix", "origin_id,destination_id\nA,A\n");
        assert!(matches!(
            validate_od(&od, &HashMap::new()),
            Err(AllocationError::Schema { .. })
        ));
    }

    #[test]
    fn test_blank_quantities_are_zero() {
        let raw = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\nA,,nan,NaN\n",
        );
        let municipalities = validate_demand_supply(&raw).unwrap();
        assert_eq!(municipalities[0], Municipality::new("A", 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rejects_negative_and_non_numeric() {
        let negative = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\nA,1,0,0\nB,-4,0,0\n",
        );
        match validate_demand_supply(&negative) {
            Err(AllocationError::InvalidValue { row, column, reason, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, SUPPLY);
                assert_eq!(reason, "negative");
            }
            other => panic!("expected invalid value, got {:?}", other),
        }

        let text = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\nA,1,lots,0\n",
        );
        assert!(matches!(
            validate_demand_supply(&text),
            Err(AllocationError::InvalidValue { .. })
        ));

        let infinite = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\nA,inf,0,0\n",
        );
        assert!(matches!(
            validate_demand_supply(&infinite),
            Err(AllocationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_od_distance_required() {
        let municipalities = vec![Municipality::new("A", 1.0, 0.0, 0.0)];
        let od = table("OD matrix", "origin_id,destination_id,distance_km\nA,A,\n");
        assert!(matches!(
            validate_od(&od, &index_of(&municipalities)),
            Err(AllocationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let municipalities = vec![Municipality::new("A", 1.0, 0.0, 0.0)];
        let od = table("OD matrix", "origin_id,destination_id,distance_km\nA,A,1\nA,B,2\n");
        match validate_od(&od, &index_of(&municipalities)) {
            Err(AllocationError::UnknownReference { row, column, name }) => {
                assert_eq!(row, 2);
                assert_eq!(column, DESTINATION_ID);
                assert_eq!(name, "B");
            }
            other => panic!("expected unknown reference, got {:?}", other),
        }

        let od = table("OD matrix", "origin_id,destination_id,distance_km\nC,A,1\n");
        match validate_od(&od, &index_of(&municipalities)) {
            Err(AllocationError::UnknownReference { row, column, name }) => {
                assert_eq!(row, 1);
                assert_eq!(column, ORIGIN_ID);
                assert_eq!(name, "C");
            }
            other => panic!("expected unknown reference, got {:?}", other),
        }
    }

    #[test]
    fn test_cell_trims_untrimmed_tables() {
        let owned = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        let headers = owned(&[" NAME ", "SUPPLY", "INDUSTRIAL_DEMAND", "RESIDENTIAL_DEMAND"]);
        let rows = vec![owned(&["  A ", " 2 ", "0", ""])];
        let raw = RawTable::new("demand_supply", headers, rows);
        let municipalities = validate_demand_supply(&raw).unwrap();
        assert_eq!(municipalities, vec![Municipality::new("A", 2.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let raw = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\n  ,1,0,0\n",
        );
        assert!(matches!(
            validate_demand_supply(&raw),
            Err(AllocationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_municipality_rejected() {
        let raw = table(
            "demand_supply",
            "NAME,SUPPLY,INDUSTRIAL_DEMAND,RESIDENTIAL_DEMAND\nA,10,0,0\nX,0,5,0\nA,0,0,0\n",
        );
        match validate_demand_supply(&raw) {
            Err(AllocationError::InvalidValue { row, column, value, reason, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, NAME);
                assert_eq!(value, "A");
                assert_eq!(reason, "duplicate municipality name");
            }
            other => panic!("expected duplicate name error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_od_pairs_first_wins() {
        let municipalities = vec![
            Municipality::new("A", 1.0, 0.0, 0.0),
            Municipality::new("B", 0.0, 5.0, 0.0),
        ];
        let od = table(
            "OD matrix",
            "origin_id,destination_id,distance_km\nA,B,7\nB,A,3\nA,B,1\n",
        );
        let pairs = validate_od(&od, &index_of(&municipalities)).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].distance_km, 7.0);
        assert_eq!(pairs[1].distance_km, 3.0);
    }
}
