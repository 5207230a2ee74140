use scrobstat::config::{StatsConfig, parse_offset};
use scrobstat::report::{ReportLimits, build_report};
use scrobstat::stats::{StatsPipeline, multiplays};
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    log: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    offset: Option<String>,
    json: bool,
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = StatsConfig::from_env()?;
    if let Some(log) = args.log {
        config.log_path = log;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }
    if let Some(offset) = args.offset.as_deref() {
        config.utc_offset = parse_offset(offset)?;
    }
    config.ensure_cache_dir()?;
    log::debug!("{config:?}");

    let bundle = StatsPipeline::from_config(&config).compute_statistics()?;

    if args.json {
        println!("{}", serde_json::to_string(&bundle)?);
        return Ok(());
    }

    let tracks = multiplays(&bundle);
    log::info!("{} tracks played more than three times", tracks.len());
    let report = build_report(&tracks, ReportLimits::default())?;
    print!("{report}");
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            flag @ ("--log" | "--cache-dir" | "--offset") => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("{flag} requires a value");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("{flag} cannot be empty");
                }
                let value = value.trim().to_string();
                match flag {
                    "--log" => out.log = Some(PathBuf::from(value)),
                    "--cache-dir" => out.cache_dir = Some(PathBuf::from(value)),
                    _ => out.offset = Some(value),
                }
            }
            "--json" => out.json = true,
            "-v" | "--verbose" => out.verbose = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("scrobstat");
    println!("  --log PATH          Listening log (artist,album,title,timestamp rows)");
    println!("  --cache-dir PATH    Directory holding the cached JSON slots");
    println!("  --offset +HH:MM     UTC offset the log timestamps were written in");
    println!("  --json              Print the statistics bundle as JSON instead of the report");
    println!("  -v, --verbose       Debug logging");
}
