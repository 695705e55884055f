//! Annuity Reserving CLI
//!
//! Projects one policy from the inforce file and reports its reserve

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use annuity_reserving::{
    policy::load_policies, Assumptions, ProjectionConfig, ProjectionEngine,
};

#[derive(Parser, Debug)]
#[command(version, about = "Expected present value projection for an in-payment annuity")]
struct Args {
    /// Directory holding the assumption CSV files
    #[arg(long, default_value = "data/assumptions")]
    assumptions: PathBuf,

    /// Inforce policy file
    #[arg(long, default_value = "data/policies.csv")]
    policies: PathBuf,

    /// Policy to project (defaults to the first row of the inforce file)
    #[arg(long)]
    policy_id: Option<u32>,

    /// Final projection month
    #[arg(long, default_value_t = 720)]
    horizon: usize,

    /// Product key for the overlay and expense tables
    #[arg(long, default_value = "annuity")]
    product: String,

    /// Write the full monthly projection to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full result as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let assumptions = Assumptions::from_csv_path(&args.assumptions).with_context(|| {
        format!("loading assumptions from {}", args.assumptions.display())
    })?;
    let policies = load_policies(&args.policies)
        .with_context(|| format!("loading policies from {}", args.policies.display()))?;
    info!("Loaded {} policies", policies.len());

    let policy = match args.policy_id {
        Some(id) => policies
            .iter()
            .find(|p| p.policy_id == id)
            .with_context(|| format!("policy {} not found", id))?,
        None => policies.first().context("inforce file is empty")?,
    };

    let config = ProjectionConfig {
        horizon_months: args.horizon,
        product: args.product,
    };
    let engine = ProjectionEngine::new(assumptions, config);
    let result = engine
        .project_policy(policy)
        .with_context(|| format!("projecting policy {}", policy.policy_id))?;

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        result.write_csv(BufWriter::new(file))?;
        info!("Projection written to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Policy {}", policy.policy_id);
    println!("  Age at entry: {}", policy.age_at_entry);
    println!("  Gender: {:?}", policy.gender);
    println!("  Annual annuity: {:.2}", policy.initial_annuity);
    println!("  Escalation: {:?}", policy.escalation);
    println!("  Duration in force: {} months", policy.duration_if);
    println!();

    println!(
        "{:>5} {:>4} {:>10} {:>12} {:>12} {:>14}",
        "t", "Age", "DeathRt", "InForce", "ExpPayment", "EPV_liability"
    );
    println!("{}", "-".repeat(62));
    for row in result.rows.iter().take(24) {
        println!(
            "{:>5} {:>4} {:>10.6} {:>12.8} {:>12.2} {:>14.2}",
            row.t,
            row.current_age,
            row.death_rate,
            row.expected_number_of_policies_if,
            row.expected_annuity_payment,
            row.epv_liability,
        );
    }
    if result.rows.len() > 24 {
        println!("... ({} more months)", result.rows.len() - 24);
    }

    let first = &result.rows[0];
    println!();
    println!("EPV annuity benefit:     {:>14.2}", first.epv_annuity_benefit);
    println!("EPV renewal expenses:    {:>14.2}", first.epv_renewal_expenses);
    println!("EPV investment expenses: {:>14.2}", first.epv_investment_expenses);
    println!("Liability:               {:>14.2}", result.liability);

    Ok(())
}
