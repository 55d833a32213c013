use super::super::domain::{EmploymentLength, EmploymentStatus};
use super::{ApplicationSnapshot, RiskLevel, ScoreComponent, ScoringFactor, BASE_READINESS_SCORE};

const HIGH_INCOME_THRESHOLD: f64 = 5000.0;
const MODERATE_INCOME_THRESHOLD: f64 = 3000.0;
const SUBSTANTIAL_DOWN_PAYMENT_PCT: f64 = 20.0;
const LOW_DOWN_PAYMENT_PCT: f64 = 10.0;

/// Running accumulator threaded through the rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreState {
    pub score: i16,
    pub risk: RiskLevel,
    pub components: Vec<ScoreComponent>,
}

impl ScoreState {
    pub(crate) fn baseline() -> Self {
        Self {
            score: BASE_READINESS_SCORE,
            risk: RiskLevel::Medium,
            components: Vec::new(),
        }
    }

    fn record(mut self, factor: ScoringFactor, delta: i16, insight: &str) -> Self {
        self.score += delta;
        self.components.push(ScoreComponent {
            factor,
            delta,
            insight: insight.to_string(),
        });
        self
    }

    fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk = risk;
        self
    }

    fn tighten_to(mut self, floor: RiskLevel) -> Self {
        self.risk = self.risk.at_least(floor);
        self
    }
}

pub(crate) type Rule = fn(&ApplicationSnapshot, ScoreState) -> ScoreState;

pub(crate) const RULES: [Rule; 4] = [
    income_rule,
    employment_length_rule,
    employment_status_rule,
    down_payment_rule,
];

pub(crate) fn apply_rules(snapshot: &ApplicationSnapshot) -> ScoreState {
    RULES
        .iter()
        .fold(ScoreState::baseline(), |state, rule| rule(snapshot, state))
}

/// Income sets the risk level outright, whatever it was before.
pub(crate) fn income_rule(snapshot: &ApplicationSnapshot, state: ScoreState) -> ScoreState {
    let Some(income) = snapshot.monthly_income else {
        return state;
    };

    if income >= HIGH_INCOME_THRESHOLD {
        state
            .record(
                ScoringFactor::MonthlyIncome,
                3,
                "High income indicates strong repayment capability.",
            )
            .with_risk(RiskLevel::Low)
    } else if income >= MODERATE_INCOME_THRESHOLD {
        state
            .record(
                ScoringFactor::MonthlyIncome,
                2,
                "Moderate income suggests adequate repayment capability.",
            )
            .with_risk(RiskLevel::Medium)
    } else {
        state
            .record(
                ScoringFactor::MonthlyIncome,
                -1,
                "Lower income may present repayment challenges.",
            )
            .with_risk(RiskLevel::High)
    }
}

pub(crate) fn employment_length_rule(
    snapshot: &ApplicationSnapshot,
    state: ScoreState,
) -> ScoreState {
    match snapshot.employment_length {
        Some(EmploymentLength::FivePlusYears) => state.record(
            ScoringFactor::EmploymentLength,
            2,
            "Long-term employment indicates stability.",
        ),
        Some(EmploymentLength::ThreeToFiveYears) => state.record(
            ScoringFactor::EmploymentLength,
            1,
            "Established employment history.",
        ),
        Some(EmploymentLength::LessThanOneYear) => state
            .record(
                ScoringFactor::EmploymentLength,
                -1,
                "Short employment history may indicate higher risk.",
            )
            .tighten_to(RiskLevel::Medium),
        Some(EmploymentLength::OneToThreeYears) | None => state,
    }
}

/// Unemployment forces High risk regardless of earlier rules.
pub(crate) fn employment_status_rule(
    snapshot: &ApplicationSnapshot,
    state: ScoreState,
) -> ScoreState {
    match snapshot.employment_status {
        Some(EmploymentStatus::FullTime) => state.record(
            ScoringFactor::EmploymentStatus,
            1,
            "Full-time employment provides income stability.",
        ),
        Some(EmploymentStatus::PartTime | EmploymentStatus::SelfEmployed) => state
            .record(
                ScoringFactor::EmploymentStatus,
                0,
                "Non-traditional employment may require additional verification.",
            )
            .tighten_to(RiskLevel::Medium),
        Some(EmploymentStatus::Unemployed) => state
            .record(
                ScoringFactor::EmploymentStatus,
                -3,
                "Unemployment presents significant repayment risk.",
            )
            .with_risk(RiskLevel::High),
        Some(EmploymentStatus::Retired | EmploymentStatus::Other) | None => state,
    }
}

/// Skipped unless both amounts are present and the price is positive.
pub(crate) fn down_payment_rule(snapshot: &ApplicationSnapshot, state: ScoreState) -> ScoreState {
    let (Some(down_payment), Some(price)) = (snapshot.down_payment, snapshot.vehicle_price) else {
        return state;
    };
    if !(price.is_finite() && price > 0.0) {
        return state;
    }

    let ratio_pct = down_payment / price * 100.0;
    if ratio_pct >= SUBSTANTIAL_DOWN_PAYMENT_PCT {
        state.record(
            ScoringFactor::DownPaymentRatio,
            1,
            "Substantial down payment reduces financing risk.",
        )
    } else if ratio_pct < LOW_DOWN_PAYMENT_PCT {
        state.record(
            ScoringFactor::DownPaymentRatio,
            -1,
            "Low down payment increases financing risk.",
        )
    } else {
        state
    }
}
