//! Readiness scoring for loan applications.
//!
//! Scoring is a pure fold over an ordered rule list: every rule receives the
//! snapshot and the running state and returns the next state. Rule order is
//! significant because later rules may tighten the risk level set earlier.

mod rules;
mod summary;

pub use summary::{degraded_summary, format_amount};

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationForm, EmploymentLength, EmploymentStatus};

pub const BASE_READINESS_SCORE: i16 = 5;
pub const MIN_READINESS_SCORE: u8 = 1;
pub const MAX_READINESS_SCORE: u8 = 10;

/// Applicant fields that feed the scoring rules.
///
/// Keys are accepted in snake_case or the intake form's camelCase; any other
/// key is rejected rather than silently scored as absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationSnapshot {
    #[serde(alias = "monthlyIncome")]
    pub monthly_income: Option<f64>,
    #[serde(alias = "employmentLength")]
    pub employment_length: Option<EmploymentLength>,
    #[serde(alias = "employmentStatus")]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(alias = "downPayment")]
    pub down_payment: Option<f64>,
    #[serde(alias = "vehiclePrice")]
    pub vehicle_price: Option<f64>,
    #[serde(alias = "jobTitle")]
    pub job_title: Option<String>,
    pub employer: Option<String>,
}

impl From<&ApplicationForm> for ApplicationSnapshot {
    fn from(form: &ApplicationForm) -> Self {
        Self {
            monthly_income: form.employment.monthly_income,
            employment_length: form.employment.employment_length,
            employment_status: form.employment.employment_status,
            down_payment: form.vehicle.down_payment,
            vehicle_price: form.vehicle.price,
            job_title: non_blank(&form.employment.job_title),
            employer: non_blank(&form.employment.employer),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Coarse risk tier. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Raises the level to `floor` when it is currently less severe.
    pub fn at_least(self, floor: RiskLevel) -> RiskLevel {
        self.max(floor)
    }
}

/// Which rule produced a score component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFactor {
    MonthlyIncome,
    EmploymentLength,
    EmploymentStatus,
    DownPaymentRatio,
}

/// One triggered rule: its score delta and the insight shown to reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoringFactor,
    pub delta: i16,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub readiness_score: u8,
    pub risk_level: RiskLevel,
    pub insights: Vec<String>,
    pub components: Vec<ScoreComponent>,
    pub summary: String,
}

/// Stateless scorer shared by the intake and admin flows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, snapshot: &ApplicationSnapshot) -> AssessmentResult {
        let state = rules::apply_rules(snapshot);
        let readiness_score = clamp_score(state.score);
        let summary = summary::compose_summary(snapshot, readiness_score, state.risk);
        let insights = state
            .components
            .iter()
            .map(|component| component.insight.clone())
            .collect();

        AssessmentResult {
            readiness_score,
            risk_level: state.risk,
            insights,
            components: state.components,
            summary,
        }
    }
}

pub(crate) fn clamp_score(raw: i16) -> u8 {
    raw.clamp(MIN_READINESS_SCORE as i16, MAX_READINESS_SCORE as i16) as u8
}

#[cfg(test)]
pub(crate) use rules::{
    down_payment_rule, employment_length_rule, employment_status_rule, income_rule, ScoreState,
};
