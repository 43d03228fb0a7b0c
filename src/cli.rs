//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{load_display_names, CsvAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_strategy_store::load_strategies;
use crate::domain::config_validation::{
    scan_options, strategy_from_config, strategy_ids, validate_scan_config, SCAN_SECTION,
};
use crate::domain::error::ScanError;
use crate::domain::preset::{run_preset, Preset, DEFAULT_MOVER_DAYS};
use crate::domain::scan::{rank_results, scan, ScanResult};
use crate::domain::universe::{load_universe, parse_symbols, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::strategy_store::StrategyStore;

#[derive(Parser, Debug)]
#[command(name = "stockscan", about = "Technical-analysis stock scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe with a strategy defined in the config
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy id, the `<id>` of a `[strategy.<id>]` section
        #[arg(short, long)]
        strategy: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scan the universe with a built-in preset
    Preset {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        preset: String,
        /// Window for TOP_GAINERS / TOP_LOSERS
        #[arg(long)]
        days: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate every strategy section in a file
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List the built-in presets
    Presets,
    /// List symbols available in the configured data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            strategy,
            output,
        } => run_scan(&config, &strategy, output.as_deref()),
        Command::Preset {
            config,
            preset,
            days,
            output,
        } => run_preset_scan(&config, &preset, days, output.as_deref()),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Presets => {
            print!("{}", format_presets());
            Ok(())
        }
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScanError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn data_dir(config: &dyn ConfigPort) -> Result<PathBuf, ScanError> {
    config
        .get_string(SCAN_SECTION, "data_dir")
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| ScanError::ConfigMissing {
            section: SCAN_SECTION.to_string(),
            key: "data_dir".to_string(),
        })
}

/// Symbols from `[scan] symbols`, or every symbol the data source has.
pub fn resolve_symbols(
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, ScanError> {
    match config.get_string(SCAN_SECTION, "symbols") {
        Some(list) => parse_symbols(&list).map_err(|e| ScanError::ConfigInvalid {
            section: SCAN_SECTION.to_string(),
            key: "symbols".to_string(),
            reason: e.to_string(),
        }),
        None => data_port.list_symbols(),
    }
}

/// Load every configured symbol, cut to `lookback_days`, with display names.
pub fn build_universe(config: &dyn ConfigPort, lookback_days: u32) -> Result<Universe, ScanError> {
    let adapter = CsvAdapter::new(data_dir(config)?);
    let symbols = resolve_symbols(config, &adapter)?;
    eprintln!("Loading {} symbols ({} day lookback)", symbols.len(), lookback_days);

    let loaded = load_universe(&adapter, &symbols, Some(lookback_days))?;
    if !loaded.skipped.is_empty() {
        eprintln!(
            "Scanning {} of {} symbols ({} skipped)",
            loaded.universe.len(),
            symbols.len(),
            loaded.skipped.len()
        );
    }

    match config
        .get_string(SCAN_SECTION, "names_file")
        .filter(|s| !s.trim().is_empty())
    {
        Some(path) => {
            let names = load_display_names(Path::new(path.trim()))?;
            Ok(loaded.universe.with_display_names(names))
        }
        None => Ok(loaded.universe),
    }
}

fn output_path(config: &dyn ConfigPort, flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        config
            .get_string(SCAN_SECTION, "output")
            .filter(|s| !s.trim().is_empty())
            .map(|s| PathBuf::from(s.trim()))
    })
}

fn finish(
    mut results: Vec<ScanResult>,
    config: &dyn ConfigPort,
    output: Option<&Path>,
) -> Result<(), ScanError> {
    rank_results(&mut results);
    print!("{}", format_table(&results));
    eprintln!(
        "{} of {} symbols matched",
        results.iter().filter(|r| r.matched).count(),
        results.len()
    );

    if let Some(path) = output_path(config, output) {
        CsvReportAdapter.write(&results, &path.to_string_lossy())?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_scan(config_path: &Path, strategy_id: &str, output: Option<&Path>) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    validate_scan_config(&config)?;

    let store = load_strategies(&config)?;
    let strategy = store
        .get(&strategy_id.to_lowercase())
        .ok_or_else(|| ScanError::UnknownStrategy(strategy_id.to_string()))?;
    eprintln!(
        "Strategy: {} ({} conditions, timeframe {})",
        strategy.name,
        strategy.conditions.len(),
        strategy.timeframe
    );

    let universe = build_universe(&config, strategy.lookback_days())?;
    let results = scan(&strategy, &universe, &scan_options(&config), Utc::now());
    finish(results, &config, output)
}

fn run_preset_scan(
    config_path: &Path,
    preset_name: &str,
    days: Option<usize>,
    output: Option<&Path>,
) -> Result<(), ScanError> {
    let preset = Preset::parse(preset_name, days)?;
    let config = load_config(config_path)?;
    validate_scan_config(&config)?;
    eprintln!("Preset: {}", preset);

    let universe = build_universe(&config, preset.lookback_days())?;
    let results = run_preset(&preset, &universe, &scan_options(&config), Utc::now());
    finish(results, &config, output)
}

fn run_validate(strategy_path: &Path) -> Result<(), ScanError> {
    eprintln!("Validating strategies: {}", strategy_path.display());
    let config = load_config(strategy_path)?;

    let ids = strategy_ids(&config);
    if ids.is_empty() {
        return Err(ScanError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "sections".to_string(),
            reason: "no [strategy.<id>] sections found".to_string(),
        });
    }

    for id in ids {
        let strategy = strategy_from_config(&config, &id)?;
        eprintln!("\n[{}] {} ({})", strategy.id, strategy.name, strategy.timeframe);
        for (i, condition) in strategy.conditions.iter().enumerate() {
            eprintln!("  condition{}: {}", i + 1, condition);
        }
    }

    eprintln!("\nStrategy configuration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), ScanError> {
    let config = load_config(config_path)?;
    let adapter = CsvAdapter::new(data_dir(&config)?);
    let symbols = adapter.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

pub fn format_presets() -> String {
    let mut out = format!("{:<18} {:>8} {:>10}\n", "PRESET", "MIN_BARS", "LOOKBACK");
    for preset in Preset::all(DEFAULT_MOVER_DAYS) {
        out.push_str(&format!(
            "{:<18} {:>8} {:>9}d\n",
            preset.name(),
            preset.min_bars(),
            preset.lookback_days()
        ));
    }
    out
}

/// Fixed-width result table, one row per result in the given order.
pub fn format_table(results: &[ScanResult]) -> String {
    let mut out = format!(
        "{:<12} {:<24} {:<7} {:>10}  {:<18} {}\n",
        "SYMBOL", "NAME", "MATCHED", "PRICE", "CONDITIONS", "INDICATORS"
    );
    for r in results {
        let conditions: String = r
            .conditions_met
            .iter()
            .map(|met| if *met { 'Y' } else { 'n' })
            .collect();
        let indicators = r
            .indicator_values
            .iter()
            .map(|(k, v)| format!("{}={:.2}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "{:<12} {:<24} {:<7} {:>10.2}  {:<18} {}\n",
            r.symbol,
            truncate(&r.display_name, 24),
            if r.matched { "yes" } else { "no" },
            r.current_price,
            conditions,
            indicators
        ));
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width - 1).collect();
        t.push('~');
        t
    }
}
