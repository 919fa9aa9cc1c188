//! Remaining supply and demand bookkeeping for one allocation run.

use crate::error::{AllocationError, Result};
use crate::instance::{AllocationInstance, DemandType};

/// Live remaining quantities, indexed like the instance's municipalities.
///
/// Every value starts at the instance's figure and only ever decreases.
#[derive(Debug, Clone)]
pub struct CapacityLedger<'a> {
    instance: &'a AllocationInstance,
    supply: Vec<f64>,
    industrial: Vec<f64>,
    residential: Vec<f64>,
}

impl<'a> CapacityLedger<'a> {
    pub fn new(instance: &'a AllocationInstance) -> Self {
        let municipalities = instance.municipalities();
        CapacityLedger {
            instance,
            supply: municipalities.iter().map(|m| m.supply).collect(),
            industrial: municipalities.iter().map(|m| m.industrial_demand).collect(),
            residential: municipalities.iter().map(|m| m.residential_demand).collect(),
        }
    }

    #[inline]
    pub fn remaining_supply(&self, origin: usize) -> f64 {
        self.supply[origin]
    }

    #[inline]
    pub fn remaining_demand(&self, destination: usize, demand_type: DemandType) -> f64 {
        self.demand(demand_type)[destination]
    }

    fn demand(&self, demand_type: DemandType) -> &[f64] {
        match demand_type {
            DemandType::Industrial => &self.industrial,
            DemandType::Residential => &self.residential,
        }
    }

    /// Move `amount` from `origin`'s supply to `destination`'s demand.
    ///
    /// Both sides are checked before either is touched, so a failed call
    /// leaves the ledger unchanged.
    pub fn consume(
        &mut self,
        origin: usize,
        destination: usize,
        demand_type: DemandType,
        amount: f64,
    ) -> Result<()> {
        let available = self.remaining_supply(origin);
        let needed = self.remaining_demand(destination, demand_type);
        let limit = available.min(needed);

        if !(amount >= 0.0 && amount <= limit) {
            return Err(AllocationError::Capacity {
                origin: self.instance.name(origin).to_string(),
                destination: self.instance.name(destination).to_string(),
                demand_type,
                requested: amount,
                available: limit,
            });
        }

        self.supply[origin] = available - amount;
        match demand_type {
            DemandType::Industrial => self.industrial[destination] = needed - amount,
            DemandType::Residential => self.residential[destination] = needed - amount,
        }
        Ok(())
    }

    /// Copy of every origin's remaining supply
    pub fn supply_snapshot(&self) -> Vec<f64> {
        self.supply.clone()
    }
}
