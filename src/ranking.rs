//! Distance ranking of OD pairs.
//!
//! The allocator visits OD pairs closest first. Pairs with equal distance keep
//! the order they had in the OD matrix, so identical inputs always produce the
//! same visiting order.

use crate::instance::OdPair;
use ordered_float::OrderedFloat;

/// Ascending-distance view over an OD matrix, optionally limited by a cutoff
#[derive(Debug, Clone)]
pub struct OdRanker<'a> {
    pairs: &'a [OdPair],
    order: Vec<usize>,
    cutoff_km: Option<f64>,
}

impl<'a> OdRanker<'a> {
    /// Rank `pairs`, keeping only those with `distance_km <= cutoff_km`
    pub fn new(pairs: &'a [OdPair], cutoff_km: Option<f64>) -> Self {
        let mut order: Vec<usize> = (0..pairs.len())
            .filter(|&i| cutoff_km.map_or(true, |cutoff| pairs[i].distance_km <= cutoff))
            .collect();

        // sort_by_key is stable: ties stay in input order
        order.sort_by_key(|&i| OrderedFloat(pairs[i].distance_km));

        OdRanker {
            pairs,
            order,
            cutoff_km,
        }
    }

    /// Iterate the ranked pairs. Each call starts again from the closest pair.
    pub fn iter(&self) -> impl Iterator<Item = &'a OdPair> + '_ {
        let pairs = self.pairs;
        self.order.iter().map(move |&i| &pairs[i])
    }

    /// Number of pairs surviving the cutoff
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cutoff_km(&self) -> Option<f64> {
        self.cutoff_km
    }
}
