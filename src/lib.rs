//! Firewood Allocator Library
//!
//! Allocates municipal firewood supply to industrial and residential demand
//! over a road-network origin-destination (OD) distance matrix.
//!
//! # Features
//!
//! - Validated loading of the demand/supply table and the OD matrix
//!   (semicolon or comma delimited, header aliases, decimal commas)
//! - Greedy distance-first allocation: industrial demand first, then
//!   residential demand from whatever supply is left
//! - Optional maximum travel distance
//! - Summary of allocated volume and weighted transport cost per demand type
//! - CSV (UTF-8 with BOM) and JSON export
//!
//! # Example
//!
//! ```no_run
//! use firewood_allocator::allocator::{AllocationConfig, AllocationHeuristic, GreedyAllocator};
//! use firewood_allocator::instance::AllocationInstance;
//! use firewood_allocator::output::export_allocation_csv;
//!
//! let instance = AllocationInstance::from_files("demand_supply.csv", "OD_matrix_cleaned.csv").unwrap();
//!
//! let allocator = GreedyAllocator::new(AllocationConfig::with_cutoff(Some(50.0)));
//! let allocation = allocator.allocate(&instance).unwrap();
//!
//! export_allocation_csv("firewood_allocation_result.csv", &allocation.records).unwrap();
//! println!("{}", allocation.summary());
//! ```

pub mod error;
pub mod instance;
pub mod validation;
pub mod ranking;
pub mod ledger;
pub mod allocation;
pub mod allocator;
pub mod summary;
pub mod output;

pub use allocation::{Allocation, AllocationRecord};
pub use allocator::{AllocationConfig, AllocationHeuristic, GreedyAllocator};
pub use error::{AllocationError, Result};
pub use instance::{AllocationInstance, DemandType};
pub use summary::AllocationSummary;
