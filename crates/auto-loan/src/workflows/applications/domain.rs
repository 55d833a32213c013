use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a closed-set field receives a value outside its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {field} '{value}'")]
pub struct UnrecognizedValue {
    pub field: &'static str,
    pub value: String,
}

impl UnrecognizedValue {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Employment arrangement reported on the employment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EmploymentStatus {
    FullTime,
    PartTime,
    SelfEmployed,
    Unemployed,
    Retired,
    Other,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 6] = [
        EmploymentStatus::FullTime,
        EmploymentStatus::PartTime,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Unemployed,
        EmploymentStatus::Retired,
        EmploymentStatus::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::FullTime => "Full-time",
            EmploymentStatus::PartTime => "Part-time",
            EmploymentStatus::SelfEmployed => "Self-employed",
            EmploymentStatus::Unemployed => "Unemployed",
            EmploymentStatus::Retired => "Retired",
            EmploymentStatus::Other => "Other",
        }
    }
}

impl FromStr for EmploymentStatus {
    type Err = UnrecognizedValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnrecognizedValue::new("employment status", raw))
    }
}

impl TryFrom<String> for EmploymentStatus {
    type Error = UnrecognizedValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmploymentStatus> for &'static str {
    fn from(value: EmploymentStatus) -> Self {
        value.label()
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time with the current employer, bucketed the way the form collects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum EmploymentLength {
    LessThanOneYear,
    OneToThreeYears,
    ThreeToFiveYears,
    FivePlusYears,
}

impl EmploymentLength {
    pub const ALL: [EmploymentLength; 4] = [
        EmploymentLength::LessThanOneYear,
        EmploymentLength::OneToThreeYears,
        EmploymentLength::ThreeToFiveYears,
        EmploymentLength::FivePlusYears,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentLength::LessThanOneYear => "Less than 1 year",
            EmploymentLength::OneToThreeYears => "1-3 years",
            EmploymentLength::ThreeToFiveYears => "3-5 years",
            EmploymentLength::FivePlusYears => "5+ years",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            EmploymentLength::LessThanOneYear => "<1y",
            EmploymentLength::OneToThreeYears => "1-3y",
            EmploymentLength::ThreeToFiveYears => "3-5y",
            EmploymentLength::FivePlusYears => "5+y",
        }
    }
}

impl FromStr for EmploymentLength {
    type Err = UnrecognizedValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|length| {
                length.label().eq_ignore_ascii_case(trimmed) || length.code() == trimmed
            })
            .ok_or_else(|| UnrecognizedValue::new("employment length", raw))
    }
}

impl TryFrom<String> for EmploymentLength {
    type Error = UnrecognizedValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmploymentLength> for &'static str {
    fn from(value: EmploymentLength) -> Self {
        value.label()
    }
}

impl fmt::Display for EmploymentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Full application as collected across the intake steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
    pub personal: PersonalInfo,
    pub employment: EmploymentInfo,
    #[serde(default)]
    pub vehicle: VehicleInfo,
    #[serde(default)]
    pub documents: Vec<DocumentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmploymentInfo {
    pub employer: String,
    pub job_title: String,
    #[serde(default)]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub employment_length: Option<EmploymentLength>,
}

/// Vehicle step. Price and down payment feed the financing ratio.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleInfo {
    pub has_selected_vehicle: bool,
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub price: Option<f64>,
    pub down_payment: Option<f64>,
}

impl VehicleInfo {
    pub fn description(&self) -> Option<String> {
        if !self.has_selected_vehicle {
            return None;
        }

        let parts: Vec<&str> = [&self.year, &self.make, &self.model]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Uploaded proof kept alongside the application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub category: DocumentCategory,
    pub file_name: String,
    pub storage_path: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    PayStub,
    BankStatement,
    GovernmentId,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::PayStub,
        DocumentCategory::BankStatement,
        DocumentCategory::GovernmentId,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            DocumentCategory::PayStub => "pay_stub",
            DocumentCategory::BankStatement => "bank_statement",
            DocumentCategory::GovernmentId => "government_id",
        }
    }

    /// Folder segment used when storing blobs for this category.
    pub const fn storage_folder(self) -> &'static str {
        match self {
            DocumentCategory::PayStub => "payStubs",
            DocumentCategory::BankStatement => "bankStatements",
            DocumentCategory::GovernmentId => "ids",
        }
    }

    pub const fn requirement(self) -> &'static str {
        match self {
            DocumentCategory::PayStub => "At least one pay stub is required.",
            DocumentCategory::BankStatement => "At least one bank statement is required.",
            DocumentCategory::GovernmentId => "Government-issued ID is required.",
        }
    }
}

impl FromStr for DocumentCategory {
    type Err = UnrecognizedValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| {
                category.slug() == normalized
                    || category.storage_folder().eq_ignore_ascii_case(raw.trim())
            })
            .ok_or_else(|| UnrecognizedValue::new("document category", raw))
    }
}

/// Review state tracked by the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ApplicationStatus {
    New,
    InReview,
    Approved,
    Declined,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::New,
        ApplicationStatus::InReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::InReview => "In Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Declined => "Declined",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnrecognizedValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnrecognizedValue::new("application status", raw))
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnrecognizedValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApplicationStatus> for &'static str {
    fn from(value: ApplicationStatus) -> Self {
        value.label()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dashboard tab selection: everything, or a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnrecognizedValue;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        raw.parse().map(StatusFilter::Only)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = UnrecognizedValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reviewer-side changes applied from the application detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUpdate {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
}
