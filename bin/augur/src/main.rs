// SPDX-License-Identifier: AGPL-3.0-only
// Minimal bootstrap; the analysis logic lives in the augur library crates.
use anyhow::{anyhow, Result};
use augur::forecast;
use augur::llm::GeminiClient;
use augur::{AnalysisEngine, OperationState};
use augur_contracts::{Chart, DescriptiveAnalysisResult, RegressionResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "augur", about = "LLM-assisted tabular data analysis and forecasting")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Parse a file and request descriptive statistics and chart suggestions
    Analyze {
        file: PathBuf,
    },

    /// Fit a multivariate linear regression over the chosen variables
    Regress {
        file: PathBuf,
        #[arg(long)]
        dependent: String,
        #[arg(long, value_delimiter = ',')]
        independent: Vec<String>,
    },

    /// Fit a regression, then forecast a point prediction from the inputs
    Forecast {
        file: PathBuf,
        #[arg(long)]
        dependent: String,
        #[arg(long, value_delimiter = ',')]
        independent: Vec<String>,
        /// Override an input value, e.g. --set age=42.5 (defaults to the median)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let value: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((name.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // The client refuses to initialise without credentials.
    let client = GeminiClient::from_env().map_err(|e| anyhow!(e.to_string()))?;
    info!(model = client.model(), "Gemini client initialised");
    let mut engine = AnalysisEngine::new(Arc::new(client));

    match cli.cmd {
        Command::Analyze { file } => run_analyze(&mut engine, &file).await,
        Command::Regress {
            file,
            dependent,
            independent,
        } => run_regress(&mut engine, &file, &dependent, &independent).await,
        Command::Forecast {
            file,
            dependent,
            independent,
            set,
        } => run_forecast(&mut engine, &file, &dependent, &independent, &set).await,
    }
}

async fn run_analyze(engine: &mut AnalysisEngine, file: &PathBuf) -> Result<()> {
    engine.load_file(file).await?;
    print_file_summary(engine);
    print_analysis_state(engine);
    Ok(())
}

async fn run_regress(
    engine: &mut AnalysisEngine,
    file: &PathBuf,
    dependent: &str,
    independent: &[String],
) -> Result<()> {
    engine.load_file(file).await?;
    print_file_summary(engine);

    engine
        .run_regression(dependent, independent)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;

    if let Some(result) = engine.session().regression().value() {
        render_regression(result);
    }
    Ok(())
}

async fn run_forecast(
    engine: &mut AnalysisEngine,
    file: &PathBuf,
    dependent: &str,
    independent: &[String],
    overrides: &[(String, f64)],
) -> Result<()> {
    engine.load_file(file).await?;
    print_file_summary(engine);
    print_analysis_state(engine);

    engine
        .run_regression(dependent, independent)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;

    if let Some(result) = engine.session().regression().value() {
        render_regression(result);
    }

    let variables = engine.session().independent_variables();
    for (name, value) in overrides {
        if !variables.contains(name) {
            return Err(anyhow!("'{name}' is not an independent variable of this model"));
        }
        engine.session_mut().set_forecast_input(name.clone(), *value);
    }

    println!("\nForecast inputs");
    let analysis = engine.session().analysis().value().cloned();
    for (name, value) in engine.session().forecast_inputs() {
        let spec = forecast::slider_spec(analysis.as_ref(), name);
        println!(
            "  {name:<20} {value:>12.4}   (range {:.2}..{:.2}, step {:.2})",
            spec.min, spec.max, spec.step
        );
    }

    match engine.session().predicted_value() {
        Some(prediction) => {
            let dependent_name = engine
                .session()
                .regression()
                .value()
                .map(|r| r.formula.split(' ').next().unwrap_or("value").to_string())
                .unwrap_or_else(|| "value".to_string());
            println!("\nPredicted {dependent_name}: {prediction:.2}");
        }
        None => println!("\nPredicted value: N/A"),
    }
    Ok(())
}

fn print_file_summary(engine: &AnalysisEngine) {
    if let Some(table) = engine.session().upload().value() {
        println!(
            "{}: {} rows, {} columns",
            table.file_name,
            table.dataset.row_count(),
            table.dataset.column_count()
        );
    }
}

fn print_analysis_state(engine: &AnalysisEngine) {
    match engine.session().analysis() {
        OperationState::Succeeded(analysis) => render_analysis(analysis),
        OperationState::Failed(message) => eprintln!("Descriptive analysis failed: {message}"),
        _ => {}
    }
}

fn render_analysis(analysis: &DescriptiveAnalysisResult) {
    println!("\nDescriptive statistics");
    println!(
        "  {:<20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (column, s) in &analysis.statistics {
        println!(
            "  {column:<20} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            s.count, s.mean, s.std, s.min, s.p25, s.p50, s.p75, s.max
        );
    }

    for chart in &analysis.charts {
        println!("\n{} ({} / {})", chart.title(), chart.x_label(), chart.y_label());
        match chart {
            Chart::Histogram { data, .. } => {
                let max = data.iter().map(|b| b.frequency).fold(0.0_f64, f64::max);
                for bin in data {
                    println!("  {:<16} {} {}", bin.range, bar(bin.frequency, max), bin.frequency);
                }
            }
            Chart::Bar { data, .. } => {
                let max = data.iter().map(|e| e.count).fold(0.0_f64, f64::max);
                for entry in data {
                    println!("  {:<16} {} {}", entry.name, bar(entry.count, max), entry.count);
                }
            }
        }
    }
}

fn bar(value: f64, max: f64) -> String {
    const WIDTH: f64 = 40.0;
    let length = if max > 0.0 {
        ((value / max) * WIDTH).round() as usize
    } else {
        0
    };
    "#".repeat(length)
}

fn render_regression(result: &RegressionResult) {
    let quality = &result.model_quality;
    println!("\nRegression model");
    println!("  R-squared:          {:.4}", quality.r_squared);
    println!("  Adjusted R-squared: {:.4}", quality.adjusted_r_squared);
    println!("  F-statistic:        {:.4}", quality.f_statistic);
    println!("  p-value (F):        {:.6}", quality.p_value_f_statistic);
    println!("\n  {}", quality.summary);

    println!("\nCoefficients");
    for (variable, coefficient) in &result.coefficients {
        println!("  {variable:<20} {coefficient:>12.4}");
    }
    println!("\nFormula: {}", result.formula);
}
