use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use hps_distfit::{
    analysis::{compare_methods, parameter_estimates, run_batch},
    fitting::resolve,
    io,
    sampling::expansion_factors,
    visualization::{
        print_comparison_chart, print_comparison_table, print_factors_table, print_fit_table,
        print_strata_table,
    },
    Config,
};

#[derive(Parser)]
#[command(
    name = "hps-distfit",
    about = "HPS Diameter Distribution Fitter - size-biased vs. weighted stand-table fits",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit one distribution to one stratum with both methods
    Fit {
        /// Path to binned tally file (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Species group of the stratum
        #[arg(short, long)]
        species: String,

        /// Cover type of the stratum
        #[arg(short, long)]
        cover: String,

        /// Distribution family: weibull or gamma
        #[arg(short, long, default_value = "weibull")]
        distribution: String,

        /// Basal-area factor of the sampling gauge
        #[arg(short, long, default_value = "2.0")]
        baf: f64,

        /// Moment order of the size bias for the control fit
        #[arg(long, default_value = "2.0")]
        order: f64,

        /// Confidence level for parameter intervals (0.0-1.0)
        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// Show text panels of observed vs. fitted values
        #[arg(long)]
        chart: bool,
    },

    /// Run the configured method comparison and write report tables
    Compare {
        /// Path to a TOML run configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Dataset path, overriding the one in the configuration
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory, overriding the one in the configuration
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write method_comparison.json
        #[arg(long)]
        json: bool,

        /// Also write method_comparison.xlsx
        #[arg(long)]
        xlsx: bool,

        /// Abort on the first stratum or distribution that fails
        #[arg(long)]
        fail_fast: bool,
    },

    /// List the strata in a dataset
    Strata {
        /// Path to binned tally file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print expansion and compression factors for diameters
    Factors {
        /// Diameters in centimetres
        #[arg(short, long, value_delimiter = ',', required = true)]
        dbh: Vec<f64>,

        /// Basal-area factor of the sampling gauge
        #[arg(short, long, default_value = "2.0")]
        baf: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fit {
            input,
            species,
            cover,
            distribution,
            baf,
            order,
            confidence,
            chart,
        } => {
            if !(confidence > 0.0 && confidence < 1.0) {
                anyhow::bail!("Confidence level must be between 0 and 1, got {confidence}");
            }
            let dataset = io::read_dataset(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            let stratum = dataset.stratum(&species, &cover)?;
            let pair = resolve(&distribution)?;

            println!(
                "\n{}",
                format!(
                    "{} fits for {species} / {cover} ({} classes, {} trees)",
                    pair.distribution,
                    stratum.observations.len(),
                    stratum.sample_size()
                )
                .bold()
                .cyan()
            );

            let comparison = compare_methods(&stratum, &distribution, baf, order)?;

            for fit in [&comparison.control, &comparison.test] {
                match parameter_estimates(fit, confidence) {
                    Ok(estimates) => print_fit_table(fit, &estimates),
                    Err(e) => eprintln!("{}: {e}", "Warning".yellow()),
                }
            }

            if chart {
                print_comparison_chart(&comparison);
            }
        }

        Commands::Compare {
            config,
            input,
            output_dir,
            json,
            xlsx,
            fail_fast,
        } => {
            let mut cfg = Config::load(&config)
                .with_context(|| format!("failed to load config {}", config.display()))?;
            if let Some(input) = input {
                cfg.dataset = Some(input);
            }
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            let dataset_path = cfg
                .dataset
                .clone()
                .context("no dataset given in the config or with --input")?;

            let dataset = io::read_dataset(&dataset_path)
                .with_context(|| format!("failed to load {}", dataset_path.display()))?;
            let outcome = run_batch(&dataset, &cfg, fail_fast)?;

            for failure in &outcome.failures {
                eprintln!(
                    "{}: {}/{} {}: {}",
                    "Skipped".yellow(),
                    failure.species_group,
                    failure.cover_type,
                    failure.distribution.as_deref().unwrap_or("-"),
                    failure.reason
                );
            }

            let records = outcome.records();
            print_comparison_table(&records);

            std::fs::create_dir_all(&cfg.output_dir)?;
            let csv_path = cfg.output_dir.join("method_comparison.csv");
            let tex_path = cfg.output_dir.join("method_comparison.tex");
            io::write_report_csv(&records, &csv_path)?;
            io::write_report_latex(&records, &tex_path)?;
            let mut written = vec![csv_path, tex_path];
            if json {
                let path = cfg.output_dir.join("method_comparison.json");
                io::write_json(&records, &path, true)?;
                written.push(path);
            }
            if xlsx {
                let path = cfg.output_dir.join("method_comparison.xlsx");
                io::write_report_excel(&records, &path)?;
                written.push(path);
            }

            println!();
            for path in written {
                println!("{} Wrote {}", "Success:".green().bold(), path.display());
            }
        }

        Commands::Strata { input } => {
            let dataset = io::read_dataset(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            print_strata_table(&dataset);
        }

        Commands::Factors { dbh, baf } => {
            let expansion = expansion_factors(&dbh, baf)?;
            print_factors_table(&dbh, &expansion, baf);
        }
    }

    Ok(())
}
