use crate::infra::{parse_setting, InMemoryPropertyStore, InMemoryVerdictSink};
use clap::Args;
use serde::Serialize;
use deal_engine::analysis::{
    format_currency, BatchOptions, BatchSummary, DealAnalysisService, DealVerdict, ExitPlan,
    PropertyRecord,
};
use deal_engine::config::AppConfig;
use deal_engine::error::AppError;
use deal_engine::ingest::PropertyCsvImporter;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Property export to analyse (CSV with a header row)
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Override an analysis setting, e.g. --set hotMinSpread=30000 (repeatable)
    #[arg(long = "set", value_parser = parse_setting)]
    pub(crate) settings: Vec<(String, String)>,
    /// Print the batch summary as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override an analysis setting for the demo run (repeatable)
    #[arg(long = "set", value_parser = parse_setting)]
    pub(crate) settings: Vec<(String, String)>,
    /// Print the batch summary as JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        csv,
        settings,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = DealAnalysisService::new(
        Arc::new(InMemoryPropertyStore::default()),
        Arc::new(InMemoryVerdictSink::default()),
        config.analysis_settings()?,
    );

    let records = PropertyCsvImporter::from_path(&csv)?;
    let summary = service.analyze_records(&records, &settings.into_iter().collect())?;

    if json {
        print_json(&summary);
    } else {
        println!("Deal analysis for {}", csv.display());
        render_summary(&summary, &records);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { settings, json } = args;

    let config = AppConfig::load()?;
    let store = Arc::new(InMemoryPropertyStore::default());
    let sink = Arc::new(InMemoryVerdictSink::default());
    let service = DealAnalysisService::new(store, sink.clone(), config.analysis_settings()?);

    let portfolio = sample_portfolio();
    for record in &portfolio {
        service.register(record.clone())?;
    }

    let overrides: BTreeMap<String, String> = settings.into_iter().collect();
    let report = service.run_stored_batch(&overrides, &BatchOptions::default())?;

    if json {
        print_json(&report);
        return Ok(());
    }

    println!("Deal engine demo ({} sample leads)", portfolio.len());
    render_summary(&report.summary, &portfolio);

    println!("\nSink activity");
    println!("- {} verdict records persisted", report.published);
    for failure in &report.sink_failures {
        println!(
            "- {:?} failed for {}: {}",
            failure.delivery, failure.property_id, failure.message
        );
    }
    let alerts = sink.alerts();
    if alerts.is_empty() {
        println!("- No alerts dispatched");
    } else {
        for alert in alerts {
            let detail = |key: &str| alert.details.get(key).cloned().unwrap_or_default();
            println!(
                "- template={} -> {} (MAO {}, exit {})",
                alert.template,
                alert.property_id,
                detail("maximum_allowable_offer"),
                detail("recommended_exit")
            );
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(report: &T) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("Batch summary unavailable: {}", err),
    }
}

fn render_summary(summary: &BatchSummary, records: &[PropertyRecord]) {
    println!(
        "- {} analysed | {} skipped{}",
        summary.succeeded,
        summary.failed,
        if summary.cancelled {
            format!(" | stopped early, {} not reached", summary.unprocessed)
        } else {
            String::new()
        }
    );

    for verdict in &summary.verdicts {
        let address = records
            .iter()
            .find(|record| record.id == verdict.property_id)
            .map(|record| record.location.address.as_str())
            .unwrap_or_default();
        render_verdict(verdict, address);
    }

    if !summary.failures.is_empty() {
        println!("\nSkipped records");
        for failure in &summary.failures {
            println!(
                "  - {} [{}]: {}",
                failure.property_id,
                failure.stage.label(),
                failure.message
            );
        }
    }
}

fn render_verdict(verdict: &DealVerdict, address: &str) {
    let valuation = &verdict.valuation;
    println!(
        "\n[{}] {} {} | score {} | priority {:?}",
        verdict.classification.label(),
        verdict.property_id,
        address,
        verdict.deal_score,
        verdict.priority
    );
    println!(
        "  MAO {} | spread {} | profit {} ({:.1}%)",
        format_currency(valuation.maximum_allowable_offer),
        format_currency(valuation.spread),
        format_currency(valuation.profit_potential),
        valuation.profit_percent
    );
    if valuation.arv_estimated || valuation.repairs_estimated {
        println!(
            "  Estimated inputs: ARV {} | repairs {}",
            if valuation.arv_estimated { "yes" } else { "no" },
            if valuation.repairs_estimated { "yes" } else { "no" }
        );
    }

    if verdict.risk.triggered_factors.is_empty() {
        println!("  Risk {}/10", verdict.risk.score);
    } else {
        let factors: Vec<_> = verdict
            .risk
            .triggered_factors
            .iter()
            .map(|triggered| format!("{} +{}", triggered.factor.label(), triggered.points))
            .collect();
        println!("  Risk {}/10: {}", verdict.risk.score, factors.join(", "));
    }

    match (verdict.exit.primary, verdict.exit.timeline) {
        (ExitPlan::Strategy(strategy), Some(timeline)) => {
            let alternate = verdict
                .alternate_exit_strategy()
                .map(|alternate| format!(", alternate {}", alternate.label()))
                .unwrap_or_default();
            println!(
                "  Exit: {} ({}) expected {}{}",
                strategy.label(),
                timeline.label(),
                format_currency(verdict.exit.expected_profit),
                alternate
            );
        }
        (plan, _) => println!("  Exit: {}", plan.label()),
    }

    println!("  Actions:");
    for item in &verdict.action_items {
        println!("    - {}", item);
    }
}

fn sample_portfolio() -> Vec<PropertyRecord> {
    let lead = |id: &str,
                address: &str,
                city: &str,
                asking: f64,
                arv: Option<f64>,
                repairs: Option<f64>,
                sqft: u32,
                year_built: u16,
                notes: &str| {
        let mut record = PropertyRecord::new(id);
        record.location.address = address.to_string();
        record.location.city = city.to_string();
        record.location.state = "IA".to_string();
        record.financials.asking_price = Some(asking);
        record.financials.after_repair_value = arv;
        record.financials.repair_estimate = repairs;
        record.financials.square_footage = Some(sqft);
        record.financials.year_built = Some(year_built);
        record.notes = (!notes.is_empty()).then(|| notes.to_string());
        record
    };

    let mut rental = lead(
        "D-104",
        "2210 Forest Ave",
        "Des Moines",
        185_000.0,
        Some(215_000.0),
        Some(6_000.0),
        1_250,
        2001,
        "Tenant-occupied, rent-ready",
    );
    rental.market_volume_score = Some(72.0);
    rental.velocity_score = Some(35.0);

    vec![
        lead(
            "D-100",
            "412 Maple St",
            "Des Moines",
            120_000.0,
            Some(300_000.0),
            Some(20_000.0),
            1_500,
            1998,
            "Motivated seller, vacant",
        ),
        lead(
            "D-101",
            "88 Birch Ln",
            "Ames",
            150_000.0,
            Some(300_000.0),
            Some(20_000.0),
            1_500,
            2005,
            "",
        ),
        lead(
            "D-102",
            "17 Cedar Ct",
            "Ankeny",
            95_000.0,
            None,
            None,
            1_200,
            1940,
            "Inherited; probate pending, foundation settling",
        ),
        lead(
            "D-103",
            "",
            "Urbandale",
            110_000.0,
            Some(210_000.0),
            Some(15_000.0),
            1_300,
            1987,
            "Address withheld by seller",
        ),
        rental,
    ]
}
