/// design: build a GLM design matrix from an event table and write it as a
/// JSON design record.
///
/// Inputs (all JSON):
///   --events      [{"condition": "a", "onset": 0.0, "duration": 2.0, "value": 1.0}, …]
///   --config      DesignConfig fields (optional; missing fields use defaults)
///   --confounds   [[f64; N]; ntp]  rows are frames (optional)
///   --regressors  [[f64; N]; ntp]  rows are frames (optional)
///   --artifacts   [bool; ntp]      (optional)
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fmri_design::{DesignConfig, DesignMatrix, Event, GammaParams, HrfSpec};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HrfChoice {
    Gamma,
    Identity,
    Fir,
}

#[derive(Parser, Debug)]
#[command(name = "design", about = "Build an fMRI GLM design matrix")]
struct Args {
    /// Event table (JSON array).
    #[arg(long)]
    events: PathBuf,

    /// Number of acquisitions.
    #[arg(long)]
    ntp: usize,

    /// Design configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the repetition time (s).
    #[arg(long)]
    tr: Option<f64>,

    /// Override the highpass cutoff (s); use --no-hpf to disable.
    #[arg(long, conflicts_with = "no_hpf")]
    hpf: Option<f64>,

    /// Skip the highpass filter.
    #[arg(long)]
    no_hpf: bool,

    /// Hemodynamic model.
    #[arg(long, value_enum, default_value_t = HrfChoice::Gamma)]
    hrf: HrfChoice,

    /// Add temporal-derivative columns (gamma model only).
    #[arg(long)]
    deriv: bool,

    /// Regressors of interest (JSON matrix, frames × columns).
    #[arg(long)]
    regressors: Option<PathBuf>,

    /// Confound regressors (JSON matrix, frames × columns).
    #[arg(long)]
    confounds: Option<PathBuf>,

    /// Reduce confounds with PCA.
    #[arg(long)]
    confound_pca: bool,

    /// Artifact mask (JSON array of booleans).
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Output path for the design record; `-` for stdout.
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let events: Vec<Event> = read_json(&args.events).context("reading event table")?;
    info!("Loaded {} events", events.len());

    let mut cfg: DesignConfig = match &args.config {
        Some(path) => read_json(path).context("reading design config")?,
        None => DesignConfig::default(),
    };
    if let Some(tr) = args.tr {
        cfg.tr = tr;
    }
    if let Some(hpf) = args.hpf {
        cfg.hpf_cutoff = Some(hpf);
    }
    if args.no_hpf {
        cfg.hpf_cutoff = None;
    }
    cfg.confound_pca |= args.confound_pca;

    let model = match args.hrf {
        HrfChoice::Gamma => HrfSpec::GammaDifference(GammaParams {
            temporal_deriv: args.deriv,
            ..GammaParams::default()
        }),
        HrfChoice::Identity => HrfSpec::Identity,
        HrfChoice::Fir => HrfSpec::Fir,
    };
    let hrf = model.build(cfg.tr, cfg.oversampling)?;

    let mut builder = DesignMatrix::builder(&events, hrf.as_ref(), args.ntp).config(cfg);
    if let Some(path) = &args.regressors {
        builder = builder.regressors(read_matrix(path).context("reading regressors")?);
    }
    if let Some(path) = &args.confounds {
        builder = builder.confounds(read_matrix(path).context("reading confounds")?);
    }
    if let Some(path) = &args.artifacts {
        let mask: Vec<bool> = read_json(path).context("reading artifact mask")?;
        builder = builder.artifacts(mask);
    }

    let design = builder.build()?;
    let (ntp, ncols) = design.shape();
    info!("Built design: {ntp} frames × {ncols} columns");

    let json = design.to_record().to_json()?;
    if args.output.as_os_str() == "-" {
        println!("{json}");
    } else {
        std::fs::write(&args.output, json)
            .with_context(|| format!("writing {}", args.output.display()))?;
        info!("Written → {}", args.output.display());
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_matrix(path: &Path) -> Result<Array2<f64>> {
    let rows: Vec<Vec<f64>> = read_json(path)?;
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        bail!("{}: rows have unequal lengths", path.display());
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((n_rows, n_cols), flat)?)
}
