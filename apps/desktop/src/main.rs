use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::DiagnosisClient;
use shared::domain::SymptomId;

/// One-shot consultation runner for scripted smoke checks against a
/// running diagnosis service.
#[derive(Parser, Debug)]
#[command(about = "Command-line consultation runner for the diagnosis service")]
struct Args {
    /// Base URL of the diagnosis service.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    /// Print the symptom catalog and exit.
    #[arg(long)]
    list_symptoms: bool,
    /// Print the knowledge-base rules and exit.
    #[arg(long)]
    list_rules: bool,
    /// Comma-separated symptom ids to diagnose, e.g. --symptoms Q2,Q8
    #[arg(long, value_delimiter = ',')]
    symptoms: Vec<String>,
    /// Emit the raw service payload as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let client = DiagnosisClient::new(args.server_url);

    if args.list_symptoms {
        let symptoms = client
            .fetch_symptoms()
            .await
            .context("failed to fetch symptom catalog")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&symptoms)?);
            return Ok(());
        }
        for symptom in &symptoms {
            println!("{}: {}", symptom.id, symptom.name);
        }
        return Ok(());
    }

    if args.list_rules {
        let rules = client
            .fetch_rules()
            .await
            .context("failed to fetch knowledge-base rules")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&rules)?);
            return Ok(());
        }
        for rule in &rules {
            println!(
                "{}: IF {} THEN {} (CF {:.2}%)",
                rule.id,
                rule.conditions.join(" AND "),
                rule.conclusion,
                rule.cf * 100.0
            );
        }
        return Ok(());
    }

    if args.symptoms.is_empty() {
        bail!("nothing to do: pass --symptoms, --list-symptoms, or --list-rules");
    }

    let ids: Vec<SymptomId> = args
        .symptoms
        .iter()
        .map(|raw| SymptomId::new(raw.trim()))
        .collect();
    let consultation = client
        .diagnose(&ids)
        .await
        .context("diagnosis request failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&consultation)?);
        return Ok(());
    }

    if consultation.total_diagnoses == 0 {
        println!("No matching diagnosis for the given symptoms.");
        return Ok(());
    }

    println!("Found {} possible diagnosis(es):", consultation.total_diagnoses);
    for (rank, diagnosis) in consultation.diagnoses.iter().enumerate() {
        println!(
            "\n#{} {} - {}% confidence [{}]",
            rank + 1,
            diagnosis.name,
            diagnosis.confidence,
            diagnosis.risk_level
        );
        if !diagnosis.description.is_empty() {
            println!("   {}", diagnosis.description);
        }
        if !diagnosis.maintenance_time.is_empty() {
            println!("   Estimated maintenance: {}", diagnosis.maintenance_time);
        }
        for cause in &diagnosis.causes {
            println!("   cause: {cause}");
        }
        for (idx, solution) in diagnosis.solutions.iter().enumerate() {
            println!("   step {}: {}", idx + 1, solution);
        }
        if !diagnosis.tools_required.is_empty() {
            println!("   tools: {}", diagnosis.tools_required.join(", "));
        }
    }

    if !consultation.reasoning.is_empty() {
        println!("\nReasoning trace:");
        for step in &consultation.reasoning {
            println!(
                "  {} -> {} (CF {:.2}%): {}",
                step.rule_id,
                step.conclusion,
                step.cf * 100.0,
                step.rule_description
            );
        }
    }

    Ok(())
}
