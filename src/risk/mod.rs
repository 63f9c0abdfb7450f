//! Risk fusion.

mod engine;

pub use engine::{Decision, RiskEngine, RiskScore};
