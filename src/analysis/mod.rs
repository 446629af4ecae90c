pub mod age_group;
pub mod clubs;
pub mod insights;
pub mod meets;
pub mod orchestrator;
pub mod personal_bests;
pub mod reducer;
pub mod timing;

pub use orchestrator::analyze;
