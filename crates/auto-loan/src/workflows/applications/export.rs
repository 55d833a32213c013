use chrono::NaiveDate;

use super::repository::ApplicationRecord;

pub const EXPORT_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Status",
    "Monthly Income",
    "Submitted Date",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error("csv output was not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Rendered dashboard export ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("applications_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes one row per record, in the order given.
pub fn write_applications_csv(records: &[ApplicationRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;

    for record in records {
        let income = record
            .form
            .employment
            .monthly_income
            .map(|income| income.to_string())
            .unwrap_or_default();
        let submitted = record.created_at.format("%Y-%m-%d").to_string();
        writer.write_record([
            record.id.0.as_str(),
            record.form.personal.full_name.as_str(),
            record.form.personal.email.as_str(),
            record.form.personal.phone.as_str(),
            record.status.label(),
            income.as_str(),
            submitted.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
