use std::fmt::Write as _;

use super::{ApplicationSnapshot, RiskLevel, MAX_READINESS_SCORE};

pub(crate) fn compose_summary(
    snapshot: &ApplicationSnapshot,
    readiness_score: u8,
    risk: RiskLevel,
) -> String {
    let mut summary = income_clause(snapshot.monthly_income);

    if let Some(title) = snapshot.job_title.as_deref() {
        let _ = write!(summary, " as a {title}");
    }
    if let Some(employer) = snapshot.employer.as_deref() {
        let _ = write!(summary, " at {employer}");
    }
    if let Some(length) = snapshot.employment_length {
        let _ = write!(summary, " with {} of employment history", length.label());
    }

    let _ = write!(
        summary,
        ". Based on income verification and document analysis, this application has a readiness score of {}/{} with {} risk level.",
        readiness_score,
        MAX_READINESS_SCORE,
        risk.label()
    );
    summary
}

/// Single-clause summary used when a reviewer touches a record that was
/// never scored.
pub fn degraded_summary(monthly_income: Option<f64>) -> String {
    format!(
        "{} and matches approval guidelines.",
        income_clause(monthly_income)
    )
}

fn income_clause(monthly_income: Option<f64>) -> String {
    match monthly_income {
        Some(income) => format!("This applicant earns ${}/mo", format_amount(income)),
        None => "This applicant has not reported a monthly income".to_string(),
    }
}

/// Renders an amount with thousands separators and at most two decimals,
/// dropping trailing zeros (`5000` -> `5,000`, `1234.5` -> `1,234.5`).
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let rendered = format!("{:.2}", value.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let fraction = fraction.trim_end_matches('0');
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    if value < 0.0 && grouped != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::applications::domain::EmploymentLength;

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(5000.0), "5,000");
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(1234.5), "1,234.5");
        assert_eq!(format_amount(3200.75), "3,200.75");
        assert_eq!(format_amount(-1500.0), "-1,500");
        assert_eq!(format_amount(f64::NAN), "0");
        assert_eq!(format_amount(-0.001), "0");
    }

    #[test]
    fn format_amount_keeps_every_digit_of_large_incomes() {
        assert_eq!(format_amount(1e18), "1,000,000,000,000,000,000");
        assert_eq!(
            format_amount(1e20),
            "100,000,000,000,000,000,000"
        );
        assert_eq!(
            degraded_summary(Some(1e18)),
            "This applicant earns $1,000,000,000,000,000,000/mo and matches approval guidelines."
        );
    }

    #[test]
    fn summary_interpolates_every_field() {
        let snapshot = ApplicationSnapshot {
            monthly_income: Some(5000.0),
            employment_length: Some(EmploymentLength::FivePlusYears),
            job_title: Some("Technician".to_string()),
            employer: Some("Acme Motors".to_string()),
            ..ApplicationSnapshot::default()
        };

        assert_eq!(
            compose_summary(&snapshot, 10, RiskLevel::Low),
            "This applicant earns $5,000/mo as a Technician at Acme Motors with 5+ years of employment history. Based on income verification and document analysis, this application has a readiness score of 10/10 with Low risk level."
        );
    }

    #[test]
    fn summary_omits_missing_clauses_instead_of_rendering_placeholders() {
        let summary = compose_summary(&ApplicationSnapshot::default(), 5, RiskLevel::Medium);

        assert_eq!(
            summary,
            "This applicant has not reported a monthly income. Based on income verification and document analysis, this application has a readiness score of 5/10 with Medium risk level."
        );
        assert!(!summary.contains("undefined"));
    }

    #[test]
    fn degraded_summary_uses_income_clause_only() {
        assert_eq!(
            degraded_summary(Some(4200.0)),
            "This applicant earns $4,200/mo and matches approval guidelines."
        );
        assert_eq!(
            degraded_summary(None),
            "This applicant has not reported a monthly income and matches approval guidelines."
        );
    }
}
