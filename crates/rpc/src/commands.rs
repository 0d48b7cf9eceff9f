//! CLI commands

use std::path::Path;

use clearance_auth::{generate_seed_hex, AuthConfig, SIGNING_KEY_ENV};
use clearance_core::{ClearanceStatus, Department};
use clearance_workflow::{IssuanceOutcome, RequestFilter, StatusView};

use crate::context::AppContext;

/// Register a subject
pub fn register(
    ctx: &mut AppContext,
    id: &str,
    name: &str,
    contact: &str,
) -> Result<(), anyhow::Error> {
    let subject = ctx.register(id, name, contact)?;
    println!("✅ Registered {} ({})", subject.id, subject.name);
    Ok(())
}

/// Open a clearance request for one department
pub async fn submit(ctx: &mut AppContext, subject_id: &str, department: &str) -> Result<(), anyhow::Error> {
    let request = ctx.submit(subject_id, department).await?;
    println!(
        "✅ Request {} sent to {} for {}",
        request.id, request.department, request.subject_id
    );
    Ok(())
}

/// Approve or reject a request
pub async fn resolve(ctx: &mut AppContext, request_id: &str, decision: &str) -> Result<(), anyhow::Error> {
    let resolution = ctx.resolve(request_id, decision).await?;
    let request = &resolution.request;

    println!(
        "✅ {} clearance for {} {}",
        request.department, request.subject_id, request.status
    );

    match &resolution.issuance {
        Some(IssuanceOutcome::Issued { artifact }) => {
            println!("🎓 All departments approved; certificate issued");
            println!("   Location: {}", artifact.location);
            if let Some(fingerprint) = &artifact.fingerprint {
                println!("   SHA-256:  {}", fingerprint);
            }
        }
        Some(IssuanceOutcome::Failed { reason }) => {
            println!("⚠️  All departments approved but certificate generation failed: {}", reason);
        }
        None => {
            let outstanding = resolution.subject.outstanding();
            if !outstanding.is_empty() {
                let names: Vec<&str> = outstanding.iter().map(|d| d.name()).collect();
                println!("   Outstanding: {}", names.join(", "));
            }
        }
    }
    Ok(())
}

/// Show a subject's clearance status
pub fn status(ctx: &AppContext, subject_id: &str) -> Result<(), anyhow::Error> {
    let view = ctx.workflow.status(subject_id)?;
    print_status(&view);
    Ok(())
}

/// Show the status of the subject a token belongs to
pub fn mine(ctx: &AppContext, token: &str) -> Result<(), anyhow::Error> {
    let auth = AuthConfig::from_env()?;
    let view = ctx.my_status(&auth, token)?;
    print_status(&view);
    Ok(())
}

fn print_status(view: &StatusView) {
    println!("Clearance status for {} ({}):", view.name, view.subject_id);
    println!("{:-<48}", "");
    for department in &view.departments {
        println!(
            "{:<14} | {:<20} | {}",
            department.department,
            department.describe(),
            department.request_id.as_deref().unwrap_or("-")
        );
    }
    println!("{:-<48}", "");
    if view.artifact_issued {
        println!("🎓 Certificate issued");
    } else {
        println!("Certificate not issued");
    }
}

/// List requests, optionally filtered
pub fn requests(
    ctx: &AppContext,
    subject: Option<&str>,
    department: Option<&str>,
    status: Option<&str>,
) -> Result<(), anyhow::Error> {
    let mut filter = RequestFilter::new();
    if let Some(subject) = subject {
        filter = filter.subject(subject);
    }
    if let Some(department) = department {
        filter = filter.department(Department::parse(department)?);
    }
    if let Some(status) = status {
        filter = filter.status(ClearanceStatus::parse(status)?);
    }

    let requests = ctx.workflow.requests(&filter);
    if requests.is_empty() {
        println!("No requests found");
        return Ok(());
    }

    println!("Requests ({}):", requests.len());
    println!("{:-<80}", "");
    println!(
        "{:<16} | {:<10} | {:<14} | {:<8} | {}",
        "ID", "Subject", "Department", "Status", "Created"
    );
    println!("{:-<80}", "");
    for request in &requests {
        println!(
            "{:<16} | {:<10} | {:<14} | {:<8} | {}",
            request.id,
            request.subject_id,
            request.department,
            request.status,
            request.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Compare every subject's snapshot against the ledger
pub fn verify(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let ids = ctx.workflow.registry().ids();
    let mut diverged = 0;

    for id in &ids {
        let divergences = ctx.workflow.verify(id)?;
        for d in &divergences {
            println!(
                "❌ {} {}: ledger says {}, snapshot says {}",
                id, d.department, d.derived, d.snapshot
            );
        }
        if !divergences.is_empty() {
            diverged += 1;
        }
    }

    if diverged == 0 {
        println!("✅ {} subjects consistent with the ledger", ids.len());
    } else {
        println!("❌ {} of {} subjects diverged", diverged, ids.len());
    }
    Ok(())
}

/// Request counts by status
pub fn stats(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let stats = ctx.workflow.stats();
    println!("Subjects: {}", ctx.workflow.registry().len());
    println!("Requests: {}", stats.total());
    println!("  pending:  {}", stats.pending);
    println!("  approved: {}", stats.approved);
    println!("  rejected: {}", stats.rejected);
    Ok(())
}

/// Generate a token signing key
pub fn keygen(output: Option<&Path>) -> Result<(), anyhow::Error> {
    let seed = generate_seed_hex();

    if let Some(output) = output {
        std::fs::write(output, &seed)?;
        println!("✅ Generated signing key");
        println!("   Saved to: {}", output.display());
    } else {
        println!("✅ Generated signing key");
    }
    println!();
    println!("To use: export {}={}", SIGNING_KEY_ENV, seed);
    Ok(())
}

/// Issue an identity token for a subject
pub fn token(ctx: &AppContext, subject_id: &str) -> Result<(), anyhow::Error> {
    let auth = AuthConfig::from_env()?;
    let token = ctx.issue_token(&auth, subject_id)?;
    println!("{}", token);
    Ok(())
}
