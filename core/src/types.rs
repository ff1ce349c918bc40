//! Shared primitive types used across the entire simulator.

/// Employee identifier as it appears in the roster (`ba_id` upstream).
pub type EmployeeId = u64;

/// Numeric content identifier. Rendered with digit grouping in artifacts.
pub type ContentId = u64;

/// The canonical run identifier.
pub type RunId = String;
