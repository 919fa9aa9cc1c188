//! Aggregate statistics over allocation records.

use crate::allocation::AllocationRecord;
use crate::instance::DemandType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Totals for one demand category, or for all of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub num_records: usize,
    /// m³
    pub total_volume: f64,
    /// m³·km
    pub total_weighted_cost: f64,
}

impl CategorySummary {
    fn add(&mut self, record: &AllocationRecord) {
        self.num_records += 1;
        self.total_volume += record.allocated_volume;
        self.total_weighted_cost += record.weighted_cost;
    }

    /// Volume-weighted mean distance, `None` when nothing was allocated
    pub fn average_distance_km(&self) -> Option<f64> {
        if self.total_volume > 0.0 {
            Some(self.total_weighted_cost / self.total_volume)
        } else {
            None
        }
    }
}

/// Per-category and combined totals of an allocation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationSummary {
    pub industrial: CategorySummary,
    pub residential: CategorySummary,
    pub overall: CategorySummary,
}

impl AllocationSummary {
    pub fn from_records(records: &[AllocationRecord]) -> Self {
        let mut summary = AllocationSummary::default();
        for record in records {
            match record.demand_type {
                DemandType::Industrial => summary.industrial.add(record),
                DemandType::Residential => summary.residential.add(record),
            }
            summary.overall.add(record);
        }
        summary
    }

    pub fn category(&self, demand_type: DemandType) -> &CategorySummary {
        match demand_type {
            DemandType::Industrial => &self.industrial,
            DemandType::Residential => &self.residential,
        }
    }
}

/// JSON shape of one summary line, with the average spelled out
#[derive(Serialize)]
struct CategoryReport {
    num_records: usize,
    total_volume: f64,
    total_weighted_cost: f64,
    average_distance_km: Option<f64>,
}

impl From<&CategorySummary> for CategoryReport {
    fn from(c: &CategorySummary) -> Self {
        CategoryReport {
            num_records: c.num_records,
            total_volume: c.total_volume,
            total_weighted_cost: c.total_weighted_cost,
            average_distance_km: c.average_distance_km(),
        }
    }
}

impl Serialize for AllocationSummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AllocationSummary", 3)?;
        s.serialize_field("industrial", &CategoryReport::from(&self.industrial))?;
        s.serialize_field("residential", &CategoryReport::from(&self.residential))?;
        s.serialize_field("overall", &CategoryReport::from(&self.overall))?;
        s.end()
    }
}

fn write_category(f: &mut fmt::Formatter<'_>, label: &str, c: &CategorySummary) -> fmt::Result {
    let average = c
        .average_distance_km()
        .map(|d| format!("{:.2} km", d))
        .unwrap_or_else(|| "N/A".to_string());
    writeln!(f, "{}:", label)?;
    writeln!(f, "  Allocated: {:.2} m³ ({} flows)", c.total_volume, c.num_records)?;
    writeln!(f, "  Weighted cost: {:.2} m³·km", c.total_weighted_cost)?;
    writeln!(f, "  Average distance: {}", average)
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_category(f, "Industrial", &self.industrial)?;
        write_category(f, "Residential", &self.residential)?;
        write_category(f, "Total", &self.overall)
    }
}
