use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use autoviz::{
    ChartStatus, Domain, LogFacade, RenderOptions, Visualizer, VisualizerConfig, load_file,
};

const USAGE: &str = "usage: autoviz <data-file> [domain] [output-dir] [config.json]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(data_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let domain = args
        .next()
        .map(|d| Domain::from_name(&d.to_string_lossy()))
        .unwrap_or(Domain::Generic);
    let output_dir = args.next().map_or_else(|| PathBuf::from("charts"), PathBuf::from);
    let config = match args.next() {
        Some(path) => VisualizerConfig::from_path(path.as_ref())
            .with_context(|| format!("loading config {}", path.to_string_lossy()))?,
        None => VisualizerConfig::default(),
    };

    let dataset = load_file(&data_path)
        .with_context(|| format!("loading {}", data_path.display()))?;
    let vis = Visualizer::with_sink(domain, config, LogFacade::new(log::max_level()))?;
    let report = vis.render(&dataset, &RenderOptions::export_to(output_dir))?;

    for outcome in &report.outcomes {
        match &outcome.status {
            ChartStatus::Rendered { path: Some(path) } => println!("{}", path.display()),
            ChartStatus::Rendered { path: None } => {}
            ChartStatus::Skipped(reason) => {
                println!("skipped {} of {}: {reason}", outcome.kind, outcome.column)
            }
            ChartStatus::Failed(err) => {
                println!("failed {} of {}: {err}", outcome.kind, outcome.column)
            }
        }
    }
    Ok(())
}
