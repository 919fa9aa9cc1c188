//! Module for loading and representing firewood allocation instances.
//!
//! An instance is the pair of tables a run works on: the municipalities with
//! their supply and demand, and the road-network OD matrix between them.
//! Both are validated once at load time (see [`crate::validation`]) so the
//! rest of the crate can rely on trimmed names and non-negative numbers.

use crate::error::Result;
use crate::validation::{self, RawTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Demand category a volume of firewood is allocated to
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandType {
    Industrial,
    Residential,
}

impl DemandType {
    pub const ALL: [DemandType; 2] = [DemandType::Industrial, DemandType::Residential];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandType::Industrial => "industrial",
            DemandType::Residential => "residential",
        }
    }
}

impl fmt::Display for DemandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A municipality acting as supply origin, demand destination, or both
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Municipality {
    /// Unique municipality name, matched against the OD matrix
    pub name: String,
    /// Available firewood supply (m³)
    pub supply: f64,
    /// Industrial demand (m³)
    pub industrial_demand: f64,
    /// Residential demand (m³)
    pub residential_demand: f64,
}

impl Municipality {
    pub fn new(name: &str, supply: f64, industrial_demand: f64, residential_demand: f64) -> Self {
        Municipality {
            name: name.to_string(),
            supply,
            industrial_demand,
            residential_demand,
        }
    }

    /// Initial demand of the given category
    #[inline]
    pub fn demand(&self, demand_type: DemandType) -> f64 {
        match demand_type {
            DemandType::Industrial => self.industrial_demand,
            DemandType::Residential => self.residential_demand,
        }
    }
}

/// One OD matrix entry. Origin and destination index into
/// [`AllocationInstance::municipalities`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OdPair {
    pub origin: usize,
    pub destination: usize,
    /// Road distance (km)
    pub distance_km: f64,
}

/// A validated allocation instance
#[derive(Debug, Clone)]
pub struct AllocationInstance {
    municipalities: Vec<Municipality>,
    od_pairs: Vec<OdPair>,
    index: HashMap<String, usize>,
}

impl AllocationInstance {
    /// Load both tables from CSV files (semicolon or comma delimited)
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(demand_supply: P, od: Q) -> Result<Self> {
        let demand_supply = RawTable::from_reader("demand_supply", File::open(demand_supply)?)?;
        let od = RawTable::from_reader("OD matrix", File::open(od)?)?;
        Self::from_tables(&demand_supply, &od)
    }

    /// Load both tables from any CSV source
    pub fn from_readers<R1: Read, R2: Read>(demand_supply: R1, od: R2) -> Result<Self> {
        let demand_supply = RawTable::from_reader("demand_supply", demand_supply)?;
        let od = RawTable::from_reader("OD matrix", od)?;
        Self::from_tables(&demand_supply, &od)
    }

    /// Validate two raw tables into an instance. Nothing is built unless both
    /// tables pass.
    pub fn from_tables(demand_supply: &RawTable, od: &RawTable) -> Result<Self> {
        let municipalities = validation::validate_demand_supply(demand_supply)?;
        let index: HashMap<String, usize> = municipalities
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        let od_pairs = validation::validate_od(od, &index)?;

        log::info!(
            "Loaded {} municipalities and {} OD pairs",
            municipalities.len(),
            od_pairs.len()
        );

        Ok(AllocationInstance {
            municipalities,
            od_pairs,
            index,
        })
    }

    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    pub fn od_pairs(&self) -> &[OdPair] {
        &self.od_pairs
    }

    #[inline]
    pub fn municipality(&self, idx: usize) -> &Municipality {
        &self.municipalities[idx]
    }

    #[inline]
    pub fn name(&self, idx: usize) -> &str {
        &self.municipalities[idx].name
    }

    /// Index of a municipality by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Get statistics about the instance, counting pairs within `cutoff_km`
    pub fn statistics(&self, cutoff_km: Option<f64>) -> InstanceStatistics {
        let total_supply = self.municipalities.iter().map(|m| m.supply).sum();
        let total_industrial_demand = self.municipalities.iter().map(|m| m.industrial_demand).sum();
        let total_residential_demand = self.municipalities.iter().map(|m| m.residential_demand).sum();

        let distances: Vec<f64> = self.od_pairs.iter().map(|p| p.distance_km).collect();
        let (min_distance, avg_distance, max_distance) = if distances.is_empty() {
            (None, None, None)
        } else {
            (
                Some(distances.iter().cloned().fold(f64::INFINITY, f64::min)),
                Some(distances.iter().sum::<f64>() / distances.len() as f64),
                Some(distances.iter().cloned().fold(0.0, f64::max)),
            )
        };
        let pairs_within_cutoff = distances
            .iter()
            .filter(|&&d| cutoff_km.map_or(true, |c| d <= c))
            .count();

        let mut covered = vec![false; self.municipalities.len()];
        for pair in &self.od_pairs {
            covered[pair.origin] = true;
            covered[pair.destination] = true;
        }
        let uncovered = self
            .municipalities
            .iter()
            .zip(&covered)
            .filter(|(_, c)| !**c)
            .map(|(m, _)| m.name.clone())
            .collect();

        InstanceStatistics {
            num_municipalities: self.municipalities.len(),
            num_origins: self.municipalities.iter().filter(|m| m.supply > 0.0).count(),
            num_industrial: self.municipalities.iter().filter(|m| m.industrial_demand > 0.0).count(),
            num_residential: self.municipalities.iter().filter(|m| m.residential_demand > 0.0).count(),
            total_supply,
            total_industrial_demand,
            total_residential_demand,
            num_od_pairs: self.od_pairs.len(),
            cutoff_km,
            pairs_within_cutoff,
            min_distance,
            avg_distance,
            max_distance,
            uncovered,
        }
    }
}

/// Statistics about an allocation instance
#[derive(Debug, Clone, Serialize)]
pub struct InstanceStatistics {
    pub num_municipalities: usize,
    /// Municipalities with positive supply
    pub num_origins: usize,
    pub num_industrial: usize,
    pub num_residential: usize,
    pub total_supply: f64,
    pub total_industrial_demand: f64,
    pub total_residential_demand: f64,
    pub num_od_pairs: usize,
    pub cutoff_km: Option<f64>,
    pub pairs_within_cutoff: usize,
    pub min_distance: Option<f64>,
    pub avg_distance: Option<f64>,
    pub max_distance: Option<f64>,
    /// Municipalities that appear in no OD pair and can never be allocated
    pub uncovered: Vec<String>,
}

fn fmt_km(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".to_string())
}

impl fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Municipalities: {}", self.num_municipalities)?;
        writeln!(f, "  With supply: {}", self.num_origins)?;
        writeln!(f, "  With industrial demand: {}", self.num_industrial)?;
        writeln!(f, "  With residential demand: {}", self.num_residential)?;
        writeln!(f, "  Total supply: {:.2} m³", self.total_supply)?;
        writeln!(f, "  Total industrial demand: {:.2} m³", self.total_industrial_demand)?;
        writeln!(f, "  Total residential demand: {:.2} m³", self.total_residential_demand)?;
        writeln!(f, "OD pairs: {}", self.num_od_pairs)?;
        match self.cutoff_km {
            Some(c) => writeln!(f, "  Within {:.2} km cutoff: {}", c, self.pairs_within_cutoff)?,
            None => writeln!(f, "  Within cutoff: {} (no cutoff)", self.pairs_within_cutoff)?,
        }
        writeln!(f, "  Min distance: {} km", fmt_km(self.min_distance))?;
        writeln!(f, "  Avg distance: {} km", fmt_km(self.avg_distance))?;
        writeln!(f, "  Max distance: {} km", fmt_km(self.max_distance))?;
        write!(f, "Municipalities without OD pairs: {}", self.uncovered.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMAND_SUPPLY: &str = "NAME;SUPPLY;INDUSTRIAL_DEMAND;RESIDENTIAL_DEMAND\n\
                                 A;100;0;0\n\
                                 B;50;0;0\n\
                                 X;0;80;0\n\
                                 Y;0;0;40\n\
                                 Z;0;0;10\n";

    const OD: &str = "origin_id,destination_id,distance_km\n\
                      A,X,10\n\
                      A,Y,20\n\
                      B,X,5\n\
                      B,Y,15\n";

    #[test]
    fn test_load_from_readers() {
        let instance = AllocationInstance::from_readers(DEMAND_SUPPLY.as_bytes(), OD.as_bytes()).unwrap();

        assert_eq!(instance.municipalities().len(), 5);
        assert_eq!(instance.od_pairs().len(), 4);

        let a = instance.find("A").unwrap();
        let x = instance.find("X").unwrap();
        assert_eq!(instance.od_pairs()[0], OdPair { origin: a, destination: x, distance_km: 10.0 });
        assert_eq!(instance.municipality(x).demand(DemandType::Industrial), 80.0);
        assert!(instance.find("Q").is_none());
    }

    #[test]
    fn test_statistics() {
        let instance = AllocationInstance::from_readers(DEMAND_SUPPLY.as_bytes(), OD.as_bytes()).unwrap();
        let stats = instance.statistics(Some(12.0));

        assert_eq!(stats.num_origins, 2);
        assert_eq!(stats.num_industrial, 1);
        assert_eq!(stats.num_residential, 2);
        assert!((stats.total_supply - 150.0).abs() < 1e-10);
        assert_eq!(stats.pairs_within_cutoff, 2);
        assert_eq!(stats.min_distance, Some(5.0));
        assert_eq!(stats.max_distance, Some(20.0));
        assert!((stats.avg_distance.unwrap() - 12.5).abs() < 1e-10);
        assert_eq!(stats.uncovered, vec!["Z".to_string()]);
    }

    #[test]
    fn test_statistics_without_pairs() {
        let od = "origin_id,destination_id,distance_km\n";
        let instance = AllocationInstance::from_readers(DEMAND_SUPPLY.as_bytes(), od.as_bytes()).unwrap();
        let stats = instance.statistics(None);

        assert_eq!(stats.num_od_pairs, 0);
        assert_eq!(stats.min_distance, None);
        assert_eq!(stats.uncovered.len(), 5);
        assert!(stats.to_string().contains("N/A"));
    }

    #[test]
    fn test_demand_type_display() {
        assert_eq!(DemandType::Industrial.to_string(), "industrial");
        assert_eq!(DemandType::Residential.to_string(), "residential");
    }
}
