//! Fuses sensitivity label and anomaly flag into a score; buckets the score into a decision tier.

use crate::config::{RiskConfig, TierThresholds};
use crate::error::{AssessError, AssessResult};
use crate::model::{AnomalyFlag, SensitivityLabel};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "LOW RISK")]
    Low,
    #[serde(rename = "MEDIUM RISK")]
    Medium,
    #[serde(rename = "HIGH RISK")]
    High,
}

impl Decision {
    /// Tiers are checked high to low; each threshold is inclusive.
    pub fn from_score(score: u32, thresholds: &TierThresholds) -> Self {
        if score >= thresholds.high {
            Decision::High
        } else if score >= thresholds.medium {
            Decision::Medium
        } else {
            Decision::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Low => "LOW RISK",
            Decision::Medium => "MEDIUM RISK",
            Decision::High => "HIGH RISK",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u32,
    pub decision: Decision,
}

pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn base_risk(&self, label: SensitivityLabel) -> AssessResult<u32> {
        self.config
            .base_risk_table
            .get(&label)
            .copied()
            .ok_or_else(|| {
                AssessError::Configuration(format!(
                    "no base risk configured for label {}",
                    label
                ))
            })
    }

    pub fn behavior_risk(&self, flag: AnomalyFlag) -> u32 {
        match flag {
            AnomalyFlag::Anomalous => self.config.behavior_risk_increment,
            AnomalyFlag::Normal => 0,
        }
    }

    /// A label missing from the base-risk table is an error, never a zero.
    pub fn fuse(&self, label: SensitivityLabel, flag: AnomalyFlag) -> AssessResult<RiskScore> {
        let score = self.base_risk(label)?.saturating_add(self.behavior_risk(flag));
        Ok(RiskScore {
            score,
            decision: Decision::from_score(score, &self.config.tier_thresholds),
        })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}
