use sales_chart::api::SelectionSession;
use sales_chart::cache::{ImageCache, ImageCacheConfig};
use sales_chart::core::Row;
use sales_chart::render::NullRenderer;
use sales_chart::settings::{JsonSettingsStore, START_FROM_LAUNCH_DATE_KEY, ViewerSettings};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
struct CliArgs {
    rows_path: PathBuf,
    selected: Vec<usize>,
    settings_path: Option<PathBuf>,
    start_from_launch_date: Option<bool>,
    cache_dir: Option<PathBuf>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ToolOutput {
    x_min: String,
    x_max: String,
    series: Vec<SeriesOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    thumbnails: Vec<ThumbnailOutput>,
}

#[derive(Debug, Serialize)]
struct SeriesOutput {
    key: String,
    color: String,
    points: Vec<(String, u64)>,
}

#[derive(Debug, Serialize)]
struct ThumbnailOutput {
    key: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    if sales_chart::telemetry::init_default_tracing() {
        tracing::debug!("logging to stderr; stdout carries the json output");
    }
    if let Err(err) = run() {
        tracing::error!(error = %err, "chart_request_tool failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.rows_path)
        .map_err(|err| format!("failed to read `{}`: {err}", args.rows_path.display()))?;
    let rows: Vec<Row> =
        serde_json::from_str(&raw).map_err(|err| format!("invalid rows json: {err}"))?;

    let mut settings = match &args.settings_path {
        Some(path) => {
            let store = JsonSettingsStore::load(path.clone()).map_err(|err| err.to_string())?;
            ViewerSettings::from_provider(&store)
        }
        None => ViewerSettings::default(),
    };
    if let Some(flag) = args.start_from_launch_date {
        settings.start_from_launch_date = flag;
    }

    let mut session = SelectionSession::new(NullRenderer::default());
    session.load_rows(rows);
    let request = session
        .on_selection_change(&args.selected, &settings)
        .map_err(|err| err.to_string())?
        .clone();

    let series = request
        .series
        .iter()
        .map(|series| SeriesOutput {
            key: series.key.clone(),
            color: series.rgba.to_hex(),
            points: series
                .points
                .iter()
                .map(|point| (point.date.format("%Y/%m/%d").to_string(), point.value))
                .collect(),
        })
        .collect();

    let mut thumbnails = Vec::new();
    if let Some(cache_dir) = &args.cache_dir {
        let cache = ImageCache::new(
            cache_dir.clone(),
            ImageCacheConfig::default().with_timeout(args.timeout),
        )
        .map_err(|err| err.to_string())?;
        let mut indices = args.selected.clone();
        indices.sort_unstable();
        indices.dedup();
        let selected: Vec<&Row> = indices
            .iter()
            .map(|&index| session.row(index))
            .collect::<Result<_, _>>()
            .map_err(|err| err.to_string())?;
        let urls: Vec<&str> = selected.iter().map(|row| row.image_url.as_str()).collect();
        for (row, outcome) in selected.iter().zip(cache.prefetch(&urls)) {
            let (path, error) = match outcome {
                Ok(path) => (Some(path.display().to_string()), None),
                Err(err) => (None, Some(err.to_string())),
            };
            thumbnails.push(ThumbnailOutput {
                key: row.key.clone(),
                url: row.image_url.clone(),
                path,
                error,
            });
        }
    }

    let output = ToolOutput {
        x_min: request.x_min.format("%Y/%m/%d").to_string(),
        x_max: request.x_max.format("%Y/%m/%d").to_string(),
        series,
        thumbnails,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("failed to serialize output: {err}"))?;
    println!("{json}");
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut rows_path: Option<PathBuf> = None;
    let mut selected: Vec<usize> = Vec::new();
    let mut settings_path: Option<PathBuf> = None;
    let mut start_from_launch_date: Option<bool> = None;
    let mut cache_dir: Option<PathBuf> = None;
    let mut timeout = Duration::from_secs(10);

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--rows" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --rows".to_owned())?;
                rows_path = Some(PathBuf::from(value));
            }
            "--select" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --select".to_owned())?;
                for part in value.split(',').filter(|part| !part.trim().is_empty()) {
                    let index = part
                        .trim()
                        .parse::<usize>()
                        .map_err(|err| format!("invalid row index `{part}`: {err}"))?;
                    selected.push(index);
                }
            }
            "--settings" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --settings".to_owned())?;
                settings_path = Some(PathBuf::from(value));
            }
            "--from-launch-date" => start_from_launch_date = Some(true),
            "--from-earliest-record" => start_from_launch_date = Some(false),
            "--cache-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --cache-dir".to_owned())?;
                cache_dir = Some(PathBuf::from(value));
            }
            "--timeout-secs" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --timeout-secs".to_owned())?;
                let secs = value
                    .parse::<u64>()
                    .map_err(|err| format!("invalid timeout `{value}`: {err}"))?;
                timeout = Duration::from_secs(secs);
            }
            "-h" | "--help" => {
                println!(
                    "Usage: cargo run --bin chart_request_tool -- --rows <rows.json> --select <i,j,...> [--settings <settings.json>] [--from-launch-date | --from-earliest-record] [--cache-dir <dir>] [--timeout-secs <n>]"
                );
                println!("Settings key `{START_FROM_LAUNCH_DATE_KEY}` picks the start-date policy.");
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`"));
            }
        }
    }

    let rows_path = rows_path.ok_or_else(|| "missing required --rows <path>".to_owned())?;
    Ok(CliArgs {
        rows_path,
        selected,
        settings_path,
        start_from_launch_date,
        cache_dir,
        timeout,
    })
}
