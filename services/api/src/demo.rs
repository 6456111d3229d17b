use clap::Args;
use company_registry::error::AppError;
use company_registry::workflows::registration::{
    DecisionPolicy, InMemoryRegistrationRepository, RegistrationCertificate,
    RegistrationService, RegistrationStatus, RegistrationSubmission,
};
use serde_json::json;
use std::sync::Arc;

const SAMPLE_COMPANIES: [(&str, &str); 6] = [
    ("Harbourline Logistics", "Private Limited"),
    ("Northwind Analytics", "LLC"),
    ("Copperleaf Bakery", "Sole Proprietorship"),
    ("Bluegate Engineering", "Partnership"),
    ("Silverfern Health", "Private Limited"),
    ("Tidewater Foods", "LLC"),
];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of sample registrations to submit (at most 6)
    #[arg(long, default_value_t = 4)]
    pub(crate) companies: usize,
    /// How many of the submitted registrations to approve
    #[arg(long, default_value_t = 2)]
    pub(crate) approve: usize,
    /// Policy for decisions on already-decided registrations (final | overwrite)
    #[arg(long, default_value = "final")]
    pub(crate) policy: DecisionPolicy,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

fn sample_submission(index: usize, name: &str, business_type: &str) -> RegistrationSubmission {
    let slug = name
        .split_whitespace()
        .next()
        .unwrap_or("company")
        .to_ascii_lowercase();
    RegistrationSubmission {
        id: None,
        company_name: name.to_string(),
        registration_number: format!("RN-{:04}", 1001 + index),
        business_type: business_type.to_string(),
        address: format!("{} Market Street", 10 + index),
        contact_person: format!("Contact {}", index + 1),
        email: format!("registry@{slug}.example"),
        phone: format!("+1 555 01{:02}", index),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let output = demo_report(&args).await?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .map_err(|err| AppError::Io(err.into()))?;
    println!("{rendered}");
    Ok(())
}

/// Drive the review workflow end to end and summarize the outcome.
pub(crate) async fn demo_report(args: &DemoArgs) -> Result<serde_json::Value, AppError> {
    let repository = Arc::new(InMemoryRegistrationRepository::default());
    let service = RegistrationService::new(repository, args.policy);

    let mut submitted = Vec::new();
    for (index, (name, business_type)) in SAMPLE_COMPANIES
        .iter()
        .take(args.companies.min(SAMPLE_COMPANIES.len()))
        .enumerate()
    {
        let record = service
            .submit(sample_submission(index, name, business_type))
            .await?;
        submitted.push(record.id);
    }

    let approve_count = args.approve.min(submitted.len());
    for id in &submitted[..approve_count] {
        service.approve(id).await?;
    }
    if let Some(id) = submitted.get(approve_count) {
        service.reject(id).await?;
    }

    // Try to reverse the first decision so the output shows the active policy.
    let reversal = match submitted.first() {
        Some(id) if approve_count > 0 => match service.reject(id).await {
            Ok(record) => json!({ "id": id, "outcome": "applied", "status": record.status }),
            Err(err) => json!({ "id": id, "outcome": "refused", "error": err.to_string() }),
        },
        _ => serde_json::Value::Null,
    };

    let companies = service.list(None).await?;
    let count = |status: RegistrationStatus| {
        companies
            .iter()
            .filter(|record| record.status == status)
            .count()
    };
    let certificates: Vec<String> = companies
        .iter()
        .filter_map(RegistrationCertificate::for_registration)
        .map(|certificate| certificate.file_name())
        .collect();

    Ok(json!({
        "policy": args.policy,
        "summary": {
            "total": companies.len(),
            "pending": count(RegistrationStatus::Pending),
            "approved": count(RegistrationStatus::Approved),
            "rejected": count(RegistrationStatus::Rejected),
        },
        "reversal": reversal,
        "certificates": certificates,
        "companies": companies,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(policy: DecisionPolicy) -> DemoArgs {
        DemoArgs {
            companies: 4,
            approve: 2,
            policy,
            pretty: false,
        }
    }

    #[tokio::test]
    async fn final_policy_refuses_reversal() {
        let report = demo_report(&args(DecisionPolicy::Final))
            .await
            .expect("demo runs");

        assert_eq!(
            report["summary"],
            json!({ "total": 4, "pending": 1, "approved": 2, "rejected": 1 })
        );
        assert_eq!(report["reversal"]["outcome"], "refused");
        assert_eq!(report["certificates"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["policy"], "final");
    }

    #[tokio::test]
    async fn overwrite_policy_applies_reversal() {
        let report = demo_report(&args(DecisionPolicy::Overwrite))
            .await
            .expect("demo runs");

        assert_eq!(report["reversal"]["outcome"], "applied");
        assert_eq!(report["reversal"]["status"], "rejected");
        assert_eq!(report["summary"]["approved"], 1);
        assert_eq!(report["summary"]["rejected"], 2);
    }
}
