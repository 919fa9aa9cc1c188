//! Greedy distance-first allocation.
//!
//! Two phases share one [`CapacityLedger`]: the industrial phase runs to the
//! end of the ranked OD pairs before the residential phase starts, so
//! industrial demand always has first claim on every origin's supply. Within a
//! phase each ranked pair is visited exactly once and earlier decisions are
//! never revisited.

use crate::allocation::{Allocation, AllocationRecord, MunicipalityBalance};
use crate::error::{AllocationError, Result};
use crate::instance::{AllocationInstance, DemandType};
use crate::ledger::CapacityLedger;
use crate::ranking::OdRanker;
use std::time::Instant;

pub trait AllocationHeuristic {
    fn allocate(&self, instance: &AllocationInstance) -> Result<Allocation>;
    fn name(&self) -> &str;
}

/// Parameters the allocator consumes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AllocationConfig {
    /// Maximum distance of an eligible pair; `None` means unlimited
    pub cutoff_km: Option<f64>,
}

impl AllocationConfig {
    pub fn with_cutoff(cutoff_km: Option<f64>) -> Self {
        AllocationConfig { cutoff_km }
    }

    pub fn validate(&self) -> Result<()> {
        match self.cutoff_km {
            Some(c) if !(c >= 0.0) => Err(AllocationError::InvalidConfig(format!(
                "cutoff_km must be a non-negative number, got {}",
                c
            ))),
            _ => Ok(()),
        }
    }
}

/// Allocation phases, in execution order
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Industrial,
    Residential,
}

impl Phase {
    pub fn demand_type(self) -> DemandType {
        match self {
            Phase::Industrial => DemandType::Industrial,
            Phase::Residential => DemandType::Residential,
        }
    }

    /// The phase that runs after this one finished
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Industrial => Some(Phase::Residential),
            Phase::Residential => None,
        }
    }
}

/// Greedy allocator: closest pair first, `min(supply, demand)` per pair
#[derive(Debug, Clone, Default)]
pub struct GreedyAllocator {
    pub config: AllocationConfig,
}

impl GreedyAllocator {
    pub fn new(config: AllocationConfig) -> Self {
        GreedyAllocator { config }
    }

    /// Visit every ranked pair once for `phase`, appending records
    fn run_phase(
        &self,
        phase: Phase,
        instance: &AllocationInstance,
        ranker: &OdRanker<'_>,
        ledger: &mut CapacityLedger<'_>,
        records: &mut Vec<AllocationRecord>,
    ) -> Result<usize> {
        let demand_type = phase.demand_type();
        let before = records.len();

        for pair in ranker.iter() {
            let avail = ledger.remaining_supply(pair.origin);
            let need = ledger.remaining_demand(pair.destination, demand_type);
            if avail <= 0.0 || need <= 0.0 {
                continue;
            }

            let amount = avail.min(need);
            ledger.consume(pair.origin, pair.destination, demand_type, amount)?;

            let record = AllocationRecord::new(
                instance.name(pair.origin),
                instance.name(pair.destination),
                demand_type,
                amount,
                pair.distance_km,
            );
            log::debug!(
                "{}: {} -> {} {:.3} m³ over {:.2} km",
                demand_type,
                record.origin,
                record.destination,
                amount,
                pair.distance_km
            );
            records.push(record);
        }

        Ok(records.len() - before)
    }
}

impl AllocationHeuristic for GreedyAllocator {
    fn allocate(&self, instance: &AllocationInstance) -> Result<Allocation> {
        self.config.validate()?;
        let start = Instant::now();

        let ranker = OdRanker::new(instance.od_pairs(), self.config.cutoff_km);
        let mut ledger = CapacityLedger::new(instance);
        let mut records = Vec::new();
        let mut supply_after_industrial = None;

        log::info!(
            "Ranked {} of {} OD pairs (cutoff: {:?} km)",
            ranker.len(),
            instance.od_pairs().len(),
            self.config.cutoff_km
        );

        let mut phase = Some(Phase::Industrial);
        while let Some(current) = phase {
            let emitted = self.run_phase(current, instance, &ranker, &mut ledger, &mut records)?;
            log::info!("{:?} phase emitted {} allocations", current, emitted);

            if current == Phase::Industrial {
                supply_after_industrial = Some(ledger.supply_snapshot());
            }
            phase = current.next();
        }

        let supply_after_industrial = supply_after_industrial.unwrap_or_else(|| ledger.supply_snapshot());
        let balances = (0..instance.municipalities().len())
            .map(|i| MunicipalityBalance {
                name: instance.name(i).to_string(),
                supply_after_industrial: supply_after_industrial[i],
                unused_supply: ledger.remaining_supply(i),
                unmet_industrial: ledger.remaining_demand(i, DemandType::Industrial),
                unmet_residential: ledger.remaining_demand(i, DemandType::Residential),
            })
            .collect();

        Ok(Allocation {
            records,
            balances,
            cutoff_km: self.config.cutoff_km,
            ranked_pairs: ranker.len(),
            algorithm: self.name().to_string(),
            computation_time: start.elapsed().as_secs_f64(),
        })
    }

    fn name(&self) -> &str {
        "GreedyDistanceFirst"
    }
}
