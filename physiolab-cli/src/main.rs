//! PhysioLab CLI — peak indicators and inter-beat intervals from CSV recordings.
//!
//! Commands:
//! - `list` — indicator kinds with their parameters
//! - `compute` — evaluate indicators on one signal column, print JSON
//! - `ibi` — write inter-beat intervals as CSV

mod loader;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use physiolab_core::tools::{inter_beat_intervals, OutlierFilter, PeakDetection};
use physiolab_core::{
    Indicator, IndicatorCache, IndicatorKind, LogSink, ParamMap, ParamValue, Settings,
};
use serde_json::json;
use std::path::{Path, PathBuf};

use loader::{load_signal, separator_byte, write_ibi, CsvLayout};

#[derive(Parser)]
#[command(
    name = "physiolab",
    about = "PhysioLab CLI — peak-based indicators for physiological signals"
)]
struct Cli {
    /// Settings TOML (parameter defaults, columns, sampling rate).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where and how to read the signal.
#[derive(clap::Args)]
struct InputArgs {
    /// CSV file with a header row.
    input: PathBuf,

    /// Signal column name. Overrides the settings file.
    #[arg(long)]
    column: Option<String>,

    /// Time column name (seconds). Overrides the settings file.
    #[arg(long)]
    time_column: Option<String>,

    /// Sampling rate in Hz, used when there is no time column.
    #[arg(long)]
    fs: Option<f64>,

    /// Field separator. Overrides the settings file.
    #[arg(long)]
    separator: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// List indicator kinds and their parameters.
    List,
    /// Evaluate indicators on one signal and print the results as JSON.
    Compute {
        #[command(flatten)]
        input: InputArgs,

        /// Indicators to evaluate (e.g. peaks_num slope_mean). Defaults to all.
        #[arg(long = "indicator", short = 'i')]
        indicators: Vec<String>,

        /// Parameter override NAME=VALUE, applied to every selected indicator
        /// that declares NAME.
        #[arg(long = "param", short = 'p', value_parser = parse_param)]
        params: Vec<(String, ParamValue)>,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the inter-beat intervals of one signal as CSV.
    Ibi {
        #[command(flatten)]
        input: InputArgs,

        /// Minimum peak amplitude. Falls back to `[defaults] delta` in the
        /// settings file.
        #[arg(long)]
        delta: Option<f64>,

        /// Drop implausible intervals (outside 0.4-2.0 s, or more than 25%
        /// off the running mean of the last 50 kept).
        #[arg(long)]
        filter_outliers: bool,

        /// Write CSV here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::List => {
            print_kinds();
            Ok(())
        }
        Commands::Compute {
            input,
            indicators,
            params,
            output,
        } => run_compute(&settings, &input, &indicators, &params, output.as_deref()),
        Commands::Ibi {
            input,
            delta,
            filter_outliers,
            output,
        } => {
            let filter = filter_outliers.then(OutlierFilter::default);
            run_ibi(&settings, &input, delta, filter, output.as_deref())
        }
    }
}

/// Parse `NAME=VALUE`. Integers stay integers; anything non-numeric is text.
fn parse_param(s: &str) -> Result<(String, ParamValue), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    let raw = raw.trim();
    let value = if let Ok(i) = raw.parse::<i64>() {
        ParamValue::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        ParamValue::Float(f)
    } else {
        ParamValue::Text(raw.to_string())
    };
    Ok((name.to_string(), value))
}

fn print_kinds() {
    for kind in IndicatorKind::ALL {
        println!("{:<14} {}", kind.name(), kind.summary());
        for d in kind.descriptors() {
            let default = d
                .default
                .map(|v| format!("default {v}"))
                .unwrap_or_else(|| "required".to_string());
            println!("    {:<10} {:<12} {}", d.name, default, d.description);
        }
    }
}

fn load(settings: &Settings, args: &InputArgs) -> Result<physiolab_core::Signal> {
    let mut layout = CsvLayout::from_settings(&settings.columns)?;
    if let Some(column) = &args.column {
        layout.signal = column.clone();
    }
    if let Some(time) = &args.time_column {
        layout.time = Some(time.clone());
    }
    if let Some(sep) = args.separator {
        layout.separator = separator_byte(sep)?;
    }
    let fs = args.fs.or(settings.sampling_rate);
    load_signal(&args.input, &layout, fs)
        .with_context(|| format!("load signal from {}", args.input.display()))
}

fn selected_kinds(names: &[String]) -> Result<Vec<IndicatorKind>> {
    if names.is_empty() {
        return Ok(IndicatorKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|n| n.parse::<IndicatorKind>().map_err(Into::into))
        .collect()
}

/// Overrides restricted to the names `kind` declares.
fn overrides_for(kind: IndicatorKind, params: &[(String, ParamValue)]) -> ParamMap {
    params
        .iter()
        .filter(|(name, _)| kind.descriptors().iter().any(|d| d.name == name.as_str()))
        .cloned()
        .collect()
}

fn run_compute(
    settings: &Settings,
    args: &InputArgs,
    indicators: &[String],
    params: &[(String, ParamValue)],
    output: Option<&Path>,
) -> Result<()> {
    let kinds = selected_kinds(indicators)?;
    for (name, _) in params {
        let declared = kinds
            .iter()
            .any(|k| k.descriptors().iter().any(|d| d.name == name.as_str()));
        if !declared {
            bail!("no selected indicator accepts parameter '{name}'");
        }
    }

    let built = kinds
        .iter()
        .map(|&kind| {
            settings
                .indicator(kind, &overrides_for(kind, params))
                .with_context(|| format!("configure {kind}"))
        })
        .collect::<Result<Vec<Indicator>>>()?;

    let signal = load(settings, args)?;
    let cache = IndicatorCache::new();
    let mut results = serde_json::Map::new();
    for indicator in &built {
        let out = indicator
            .evaluate(&signal, &cache, &LogSink)
            .with_context(|| format!("evaluate {}", indicator.name()))?;
        results.insert(indicator.name().to_string(), serde_json::to_value(&out)?);
    }

    let report = json!({
        "input": args.input.display().to_string(),
        "samples": signal.len(),
        "indicators": results,
    });
    let text = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => std::fs::write(path, text + "\n")
            .with_context(|| format!("write {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}

fn run_ibi(
    settings: &Settings,
    args: &InputArgs,
    delta: Option<f64>,
    filter: Option<OutlierFilter>,
    output: Option<&Path>,
) -> Result<()> {
    // per-indicator tables never reach ibi
    let delta = match delta {
        Some(d) => d,
        None => settings
            .defaults
            .get("delta")
            .and_then(ParamValue::as_f64)
            .context("no delta: pass --delta or set [defaults] delta in the settings file")?,
    };
    let detection = PeakDetection::new(delta)?;
    let signal = load(settings, args)?;
    let mut ibi = inter_beat_intervals(&signal, &detection, &LogSink);
    log::info!("{} inter-beat intervals from {}", ibi.len(), args.input.display());
    if let Some(filter) = filter {
        let before = ibi.len();
        ibi = filter.filter(&ibi);
        log::info!("outlier filter kept {} of {before}", ibi.len());
    }

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            write_ibi(file, &ibi)
        }
        None => write_ibi(std::io::stdout().lock(), &ibi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_params() {
        assert_eq!(
            parse_param("delta=0.5"),
            Ok(("delta".into(), ParamValue::Float(0.5)))
        );
        assert_eq!(
            parse_param(" pre_max = 2 "),
            Ok(("pre_max".into(), ParamValue::Int(2)))
        );
        assert_eq!(
            parse_param("delta=abc"),
            Ok(("delta".into(), ParamValue::Text("abc".into())))
        );
        assert!(parse_param("delta").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn overrides_only_reach_declaring_kinds() {
        let params = vec![
            ("delta".to_string(), ParamValue::Float(1.0)),
            ("pre_max".to_string(), ParamValue::Float(2.0)),
        ];
        assert_eq!(overrides_for(IndicatorKind::PeaksMax, &params).len(), 1);
        assert_eq!(overrides_for(IndicatorKind::SlopeMax, &params).len(), 2);
    }

    #[test]
    fn kind_selection() {
        assert_eq!(selected_kinds(&[]).unwrap().len(), 10);
        assert_eq!(
            selected_kinds(&["peaks_num".into()]).unwrap(),
            vec![IndicatorKind::PeaksNum]
        );
        assert!(selected_kinds(&["peaks".into()]).is_err());
    }

    #[test]
    fn compute_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rec.csv");
        std::fs::write(&input, "bvp\n0\n2\n0\n3\n0\n5\n0\n1\n0\n").unwrap();
        let out = dir.path().join("out.json");

        let args = InputArgs {
            input,
            column: Some("bvp".into()),
            time_column: None,
            fs: Some(1.0),
            separator: None,
        };
        let params = vec![("delta".to_string(), ParamValue::Float(1.5))];
        run_compute(
            &Settings::default(),
            &args,
            &["peaks_num".into(), "peaks_max".into()],
            &params,
            Some(&out),
        )
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["samples"], 9);
        assert_eq!(report["indicators"]["peaks_num"]["value"], 3.0);
        assert_eq!(report["indicators"]["peaks_max"]["value"], 5.0);
    }

    #[test]
    fn compute_rejects_unused_param() {
        let args = InputArgs {
            input: PathBuf::from("unused.csv"),
            column: None,
            time_column: None,
            fs: Some(1.0),
            separator: None,
        };
        let params = vec![("post_max".to_string(), ParamValue::Float(1.0))];
        let err = run_compute(&Settings::default(), &args, &["peaks_num".into()], &params, None)
            .unwrap_err();
        assert!(err.to_string().contains("post_max"));
    }

    #[test]
    fn ibi_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("rec.csv");
        std::fs::write(&input, "v\n0\n3\n0\n0\n3\n0\n").unwrap();
        let out = dir.path().join("ibi.csv");

        let args = InputArgs {
            input,
            column: Some("v".into()),
            time_column: None,
            fs: Some(2.0),
            separator: None,
        };
        run_ibi(&Settings::default(), &args, Some(1.0), None, Some(&out)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "beat,ibi_s\n1,1.5\n"
        );
    }

    fn pulse_args(dir: &Path, values: &[f64], fs: f64) -> InputArgs {
        let input = dir.join("rec.csv");
        let body: String = values.iter().map(|v| format!("{v}\n")).collect();
        std::fs::write(&input, format!("v\n{body}")).unwrap();
        InputArgs {
            input,
            column: Some("v".into()),
            time_column: None,
            fs: Some(fs),
            separator: None,
        }
    }

    #[test]
    fn ibi_delta_comes_from_global_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let args = pulse_args(dir.path(), &[0.0, 3.0, 0.0, 0.0, 3.0, 0.0], 2.0);
        let out = dir.path().join("ibi.csv");

        // a peaks_num table must not change beat detection
        let settings = Settings::from_toml(
            "[defaults]\ndelta = 1.0\n\n[indicators.peaks_num]\ndelta = 100.0\n",
        )
        .unwrap();
        run_ibi(&settings, &args, None, None, Some(&out)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "beat,ibi_s\n1,1.5\n"
        );

        let only_kind = Settings::from_toml("[indicators.peaks_num]\ndelta = 1.0\n").unwrap();
        let err = run_ibi(&only_kind, &args, None, None, Some(&out)).unwrap_err();
        assert!(err.to_string().contains("no delta"), "{err}");
    }

    #[test]
    fn ibi_filter_drops_extra_beat() {
        // beats at samples 1, 5, 9, 11, 15 with fs = 4 Hz: 1 s, 1 s, 0.5 s, 1 s
        let mut values = vec![0.0; 17];
        for i in [1, 5, 9, 11, 15] {
            values[i] = 3.0;
        }
        let dir = tempfile::tempdir().unwrap();
        let args = pulse_args(dir.path(), &values, 4.0);
        let out = dir.path().join("ibi.csv");

        run_ibi(&Settings::default(), &args, Some(1.0), None, Some(&out)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "beat,ibi_s\n1,1\n2,1\n3,0.5\n4,1\n"
        );

        let filter = Some(OutlierFilter::default());
        run_ibi(&Settings::default(), &args, Some(1.0), filter, Some(&out)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "beat,ibi_s\n1,1\n2,1\n3,1\n"
        );
    }
}
