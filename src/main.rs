use anyhow::Context;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use normforge::services::encoder::Encoder;
use normforge::{evaluate_detailed, logging, Decoder, EngineConfig, NormSchema, QuantityHeuristic};

const USAGE: &str = "usage: normforge <schema.json> [results.json]";

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config_path = std::env::var("NORMFORGE_CONFIG").ok().map(PathBuf::from);
    let config = EngineConfig::load(config_path.as_deref())?;
    logging::init_logger(&config.log)?;

    let mut args = std::env::args().skip(1);
    let schema_path = args.next().map(PathBuf::from).context(USAGE)?;
    let results_path = args.next().map(PathBuf::from);

    let schema = NormSchema::from_json(&read(&schema_path)?)
        .with_context(|| format!("failed to load norm from {}", schema_path.display()))?;
    tracing::info!(norm = %schema.code(), fields = schema.fields().len(), "norm loaded");

    let payload = match &results_path {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("{} is not valid JSON", path.display()))?,
        None => Value::Null,
    };

    let decoded = Decoder::from_config(&schema, &config).decode_json(&payload)?;
    let evaluation = evaluate_detailed(&schema, &decoded.results);
    let flat = Encoder::new(&schema)
        .with_heuristic(QuantityHeuristic::from_config(&config))
        .encode(&decoded.results);

    tracing::info!(norm = %schema.code(), verdict = %evaluation.verdict, "sample evaluated");

    let report = json!({
        "norm": schema.code(),
        "verdict": evaluation.verdict,
        "missing": evaluation.missing,
        "violations": evaluation.violations,
        "results": decoded.results,
        "flat": flat,
        "notes": decoded.notes,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
