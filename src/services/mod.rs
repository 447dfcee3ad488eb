pub mod conflicts;
pub mod intervals;
pub mod kpi;
pub mod money;
pub mod occupancy;
pub mod platform_rules;
pub mod recognition;
pub mod waterfall;
