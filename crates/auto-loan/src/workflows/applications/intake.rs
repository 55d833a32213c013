use super::domain::{ApplicationForm, DocumentCategory};

/// Validation errors raised before an application is persisted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("email address '{0}' is not valid")]
    InvalidEmail(String),
    #[error("{field} must be a non-negative amount (found {value})")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("{}", .0.requirement())]
    MissingDocument(DocumentCategory),
}

/// Checks a submitted form against the intake requirements.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    required_documents: Vec<DocumentCategory>,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self {
            required_documents: DocumentCategory::ALL.to_vec(),
        }
    }
}

impl IntakeGuard {
    pub fn new(required_documents: Vec<DocumentCategory>) -> Self {
        Self { required_documents }
    }

    pub fn validate(&self, form: &ApplicationForm) -> Result<(), IntakeViolation> {
        let personal = &form.personal;
        require_text("full name", &personal.full_name)?;
        require_text("email", &personal.email)?;
        if !looks_like_email(&personal.email) {
            return Err(IntakeViolation::InvalidEmail(
                personal.email.trim().to_string(),
            ));
        }
        require_text("phone", &personal.phone)?;
        require_text("address", &personal.address)?;
        require_text("city", &personal.city)?;
        require_text("state", &personal.state)?;
        require_text("zip code", &personal.zip_code)?;

        let employment = &form.employment;
        require_text("employer", &employment.employer)?;
        require_text("job title", &employment.job_title)?;
        if employment.employment_status.is_none() {
            return Err(IntakeViolation::MissingField("employment status"));
        }
        let income = employment
            .monthly_income
            .ok_or(IntakeViolation::MissingField("monthly income"))?;
        require_amount("monthly income", Some(income))?;
        if employment.employment_length.is_none() {
            return Err(IntakeViolation::MissingField("employment length"));
        }

        require_amount("vehicle price", form.vehicle.price)?;
        require_amount("down payment", form.vehicle.down_payment)?;

        for category in &self.required_documents {
            if !form
                .documents
                .iter()
                .any(|document| document.category == *category)
            {
                return Err(IntakeViolation::MissingDocument(*category));
            }
        }

        Ok(())
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), IntakeViolation> {
    if value.trim().is_empty() {
        Err(IntakeViolation::MissingField(field))
    } else {
        Ok(())
    }
}

fn require_amount(field: &'static str, value: Option<f64>) -> Result<(), IntakeViolation> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(IntakeViolation::InvalidAmount {
            field,
            value: amount,
        }),
        _ => Ok(()),
    }
}

fn looks_like_email(value: &str) -> bool {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
