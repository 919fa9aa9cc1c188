//! Export of allocation results.
//!
//! The allocation table is written as CSV preceded by a UTF-8 BOM so that
//! spreadsheet tools pick up diacritics in municipality names.

use crate::allocation::AllocationRecord;
use crate::error::Result;
use crate::summary::AllocationSummary;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const OUTPUT_COLUMNS: [&str; 6] = [
    "origin",
    "destination",
    "demand_type",
    "allocated_volume",
    "distance_km",
    "weighted_cost",
];

/// Write the allocation table. The header is written even when there are no records.
pub fn write_allocation_csv<W: Write>(mut out: W, records: &[AllocationRecord]) -> Result<()> {
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Export the allocation table to a file
pub fn export_allocation_csv<P: AsRef<Path>>(path: P, records: &[AllocationRecord]) -> Result<()> {
    let file = File::create(path)?;
    write_allocation_csv(BufWriter::new(file), records)
}

/// Export the summary as pretty-printed JSON
pub fn export_summary_json<P: AsRef<Path>>(path: P, summary: &AllocationSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::DemandType;

    #[test]
    fn test_csv_layout() {
        let records = vec![
            AllocationRecord::new("Győr", "X", DemandType::Industrial, 50.0, 5.0),
            AllocationRecord::new("A", "Y", DemandType::Residential, 0.5, 2.25),
        ];
        let mut buffer = Vec::new();
        write_allocation_csv(&mut buffer, &records).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "origin,destination,demand_type,allocated_volume,distance_km,weighted_cost",
                "Győr,X,industrial,50.0,5.0,250.0",
                "A,Y,residential,0.5,2.25,1.125",
            ]
        );
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let mut buffer = Vec::new();
        write_allocation_csv(&mut buffer, &[]).unwrap();

        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.trim_end(), OUTPUT_COLUMNS.join(","));
    }

    #[test]
    fn test_round_trip_through_csv_reader() {
        let records = vec![AllocationRecord::new("A", "B", DemandType::Residential, 1.5, 4.0)];
        let mut buffer = Vec::new();
        write_allocation_csv(&mut buffer, &records).unwrap();

        let mut reader = csv::Reader::from_reader(&buffer[UTF8_BOM.len()..]);
        let parsed: Vec<AllocationRecord> = reader.deserialize::<AllocationRecord>().map(|r| r.unwrap()).collect();
        assert_eq!(parsed, records);
    }
}
