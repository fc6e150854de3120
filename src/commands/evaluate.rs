use anyhow::Result;

use crate::census::WebhookCensusSource;
use crate::cli::{Cli, EvaluateArgs};
use crate::context::AppContext;
use crate::geocode::NominatimGeocoder;
use crate::pipeline::{Evaluation, EvaluationRequest};

pub fn run(_cli: &Cli, args: &EvaluateArgs) -> Result<()> {
    let ctx = AppContext::load(&args.model, &args.schema, &args.data_dir)?;
    let geocoder = NominatimGeocoder::new()?;
    let census = match &args.census_url {
        Some(url) => WebhookCensusSource::with_base_url(url)?,
        None => WebhookCensusSource::new()?,
    };

    let request = EvaluationRequest {
        loan_size: args.loan_size,
        address: args.address.clone(),
        municipality: args.municipality.clone(),
        region: args.region.clone(),
    };

    match ctx.pipeline(&geocoder, &census).run(&request) {
        Ok(evaluation) => {
            print_evaluation(&evaluation);
            Ok(())
        }
        Err(err) => {
            // Full cause goes to the log; the user sees one generic line.
            tracing::error!(kind = err.kind(), error = %err, "pipeline failed");
            eprintln!("{}", err.user_message());
            std::process::exit(1)
        }
    }
}

fn print_evaluation(evaluation: &Evaluation) {
    let decision = &evaluation.decision;

    println!("Retrieved street name: {}", evaluation.street_name);
    println!("Location: {}", evaluation.coordinate);
    println!("Census sector: {}", evaluation.sector);
    println!();
    println!(
        "Model decision: {} ({:.1}% acceptance probability)",
        if decision.accepted { "Accepted" } else { "Rejected" },
        decision.probability * 100.0
    );

    if decision.top_features.is_empty() {
        return;
    }
    println!();
    println!("Features driving the decision:");

    let name_width = decision
        .top_features
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0);
    let max_importance = decision
        .top_features
        .iter()
        .map(|f| f.importance)
        .fold(f64::EPSILON, f64::max);

    for feature in &decision.top_features {
        let bar = "#".repeat((feature.importance / max_importance * 30.0).round() as usize);
        println!("  {:name_width$}  {:>5.2}  {}", feature.name, feature.importance, bar);
    }
}
