use crate::infra::InMemoryApplicationRepository;
use auto_loan::error::AppError;
use auto_loan::workflows::applications::{
    AdminUpdate, ApplicationForm, ApplicationServiceError, ApplicationSnapshot, ApplicationStatus,
    AssessmentResult, DocumentCategory, EmploymentInfo, EmploymentLength, EmploymentStatus,
    InMemoryBlobStore, LoanApplicationService, PersonalInfo, ScoringEngine, StatusFilter,
    VehicleInfo,
};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_BASE_URL: &str = "http://localhost:3000";

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding an application snapshot
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Pretty-print the assessment
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Monthly income reported by the demo applicant
    #[arg(long)]
    pub(crate) monthly_income: Option<f64>,
    /// Review decision applied by the demo reviewer
    #[arg(long)]
    pub(crate) decision: Option<ApplicationStatus>,
    /// Print the CSV export body after the walk-through
    #[arg(long)]
    pub(crate) print_csv: bool,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.input)?;
    let assessment = assess_json(&raw)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&assessment)?
    } else {
        serde_json::to_string(&assessment)?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn assess_json(raw: &str) -> Result<AssessmentResult, AppError> {
    let snapshot: ApplicationSnapshot = serde_json::from_str(raw)?;
    Ok(ScoringEngine::new().assess(&snapshot))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        monthly_income,
        decision,
        print_csv,
    } = args;

    println!("Auto loan intake demo");
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::new(DEMO_BASE_URL));
    let service = LoanApplicationService::new(repository, blobs.clone());

    println!("\nDocument uploads");
    let mut form = demo_application_form(monthly_income);
    for (category, file_name, bytes) in demo_documents() {
        let descriptor = service.upload_document(category, file_name, bytes)?;
        println!("- {} -> {}", descriptor.file_name, descriptor.url);
        form.documents.push(descriptor);
    }

    let record = match service.submit(form) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    let public_view = record.status_view();
    println!(
        "\nReceived application {} -> status {}",
        public_view.application_id, public_view.status
    );
    if let (Some(score), Some(risk)) = (record.readiness_score, record.risk_level) {
        println!("  Readiness score: {}/10 ({} risk)", score, risk.label());
    }
    println!("  Insights:");
    for insight in &record.insights {
        println!("    - {}", insight);
    }
    if let Some(summary) = &record.ai_summary {
        println!("  Summary: {}", summary);
    }

    let decision = decision.unwrap_or(ApplicationStatus::Approved);
    let updated = service.update(
        &record.id,
        AdminUpdate {
            status: decision,
            assigned_to: Some("Demo Reviewer".to_string()),
        },
    )?;
    println!(
        "\nReviewer update: {} -> {} (assigned to {})",
        record.status,
        updated.status,
        updated.assigned_to.as_deref().unwrap_or("nobody")
    );

    let export = service.export_csv(StatusFilter::All)?;
    let stored_documents = blobs.len().map_err(ApplicationServiceError::from)?;
    println!(
        "\nCSV export {} ({} rows, {} stored documents)",
        export.file_name,
        export.body.lines().count().saturating_sub(1),
        stored_documents
    );
    if print_csv {
        print!("{}", export.body);
    }

    Ok(())
}

fn demo_documents() -> Vec<(DocumentCategory, &'static str, Vec<u8>)> {
    vec![
        (
            DocumentCategory::PayStub,
            "paystub-2025-03.pdf",
            b"%PDF-1.7 pay stub".to_vec(),
        ),
        (
            DocumentCategory::BankStatement,
            "statement-q1.pdf",
            b"%PDF-1.7 bank statement".to_vec(),
        ),
        (
            DocumentCategory::GovernmentId,
            "drivers-license.png",
            vec![0x89, b'P', b'N', b'G'],
        ),
    ]
}

fn demo_application_form(monthly_income: Option<f64>) -> ApplicationForm {
    ApplicationForm {
        personal: PersonalInfo {
            full_name: "Riley Morgan".to_string(),
            email: "riley.morgan@example.com".to_string(),
            phone: "319-555-0187".to_string(),
            address: "48 Cedar Lane".to_string(),
            city: "Cedar Rapids".to_string(),
            state: "IA".to_string(),
            zip_code: "52402".to_string(),
        },
        employment: EmploymentInfo {
            employer: "Prairie Health".to_string(),
            job_title: "Registered Nurse".to_string(),
            employment_status: Some(EmploymentStatus::FullTime),
            monthly_income: Some(monthly_income.unwrap_or(5400.0)),
            employment_length: Some(EmploymentLength::FivePlusYears),
        },
        vehicle: VehicleInfo {
            has_selected_vehicle: true,
            vehicle_type: Some("Sedan".to_string()),
            make: Some("Honda".to_string()),
            model: Some("Accord".to_string()),
            year: Some("2023".to_string()),
            price: Some(27_500.0),
            down_payment: Some(6_000.0),
        },
        documents: Vec::new(),
    }
}
