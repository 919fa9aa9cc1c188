//! Allocation records and the result of an allocation run.

use crate::instance::DemandType;
use crate::summary::AllocationSummary;
use serde::{Deserialize, Serialize};

/// One flow of firewood from an origin to a destination.
///
/// Field order is the column order of the output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub origin: String,
    pub destination: String,
    pub demand_type: DemandType,
    /// Allocated volume (m³), always positive
    pub allocated_volume: f64,
    pub distance_km: f64,
    /// allocated_volume × distance_km (m³·km)
    pub weighted_cost: f64,
}

impl AllocationRecord {
    pub fn new(
        origin: &str,
        destination: &str,
        demand_type: DemandType,
        allocated_volume: f64,
        distance_km: f64,
    ) -> Self {
        AllocationRecord {
            origin: origin.to_string(),
            destination: destination.to_string(),
            demand_type,
            allocated_volume,
            distance_km,
            weighted_cost: allocated_volume * distance_km,
        }
    }
}

/// What is left of a municipality once the run is over
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityBalance {
    pub name: String,
    /// Supply still available when the industrial phase finished
    pub supply_after_industrial: f64,
    pub unused_supply: f64,
    pub unmet_industrial: f64,
    pub unmet_residential: f64,
}

impl MunicipalityBalance {
    pub fn unmet(&self, demand_type: DemandType) -> f64 {
        match demand_type {
            DemandType::Industrial => self.unmet_industrial,
            DemandType::Residential => self.unmet_residential,
        }
    }
}

/// Result of an allocation run
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    /// Records in the order they were produced: all industrial, then all residential
    pub records: Vec<AllocationRecord>,
    /// Per municipality, in instance order
    pub balances: Vec<MunicipalityBalance>,
    pub cutoff_km: Option<f64>,
    /// Pairs visited per phase
    pub ranked_pairs: usize,
    /// Algorithm that produced this allocation
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Allocation {
    pub fn records_of(&self, demand_type: DemandType) -> impl Iterator<Item = &AllocationRecord> + '_ {
        self.records.iter().filter(move |r| r.demand_type == demand_type)
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary::from_records(&self.records)
    }

    /// Destinations left with positive demand of the given type
    pub fn unmet_demand(&self, demand_type: DemandType) -> Vec<(&str, f64)> {
        self.balances
            .iter()
            .filter(|b| b.unmet(demand_type) > 0.0)
            .map(|b| (b.name.as_str(), b.unmet(demand_type)))
            .collect()
    }

    /// Origins left with positive supply
    pub fn unused_supply(&self) -> Vec<(&str, f64)> {
        self.balances
            .iter()
            .filter(|b| b.unused_supply > 0.0)
            .map(|b| (b.name.as_str(), b.unused_supply))
            .collect()
    }
}
