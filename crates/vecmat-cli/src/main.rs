use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

use vecmat_cli::bench::config::{load_bench_config, BenchConfig};
use vecmat_cli::bench::report::{log_timings, write_timings};
use vecmat_cli::bench::{run_suites, Suite};
use vecmat_cli::util::validate_csv_or_tsv_output;
use vecmat_core::Limits;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or(
            "VECMAT_LOG",
            "error,vecmat=info,vecmat_cli=info",
        ))
        .init();

    let matches = Command::new("vecmat")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("vecmat CLI - benchmarks and limits for the dense vector/matrix kernel")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("bench")
                .about("Time the vector and/or matrix kernels")
                .arg(
                    Arg::new("suite")
                        .help("Which benchmark suite to run")
                        .required(true)
                        .value_parser(["vector", "matrix", "all"]),
                )
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON benchmark configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("iterations")
                        .short('n')
                        .long("iterations")
                        .help("Iterations per stage. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for the random input data. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write stage timings (*.tsv or *.csv)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("limits").about("Print the compile-time size limits as JSON"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("bench", sub_m)) => handle_bench(sub_m),
        Some(("limits", _)) => handle_limits(),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_bench(matches: &ArgMatches) -> Result<()> {
    let suite_name: &String = matches
        .get_one("suite")
        .ok_or_else(|| anyhow::anyhow!("Missing benchmark suite"))?;
    let suite = Suite::from_str(suite_name).map_err(anyhow::Error::msg)?;

    let mut config = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        log::info!("[vecmat::bench] Using config: {:?}", config_path);
        load_bench_config(config_path)?
    } else {
        log::info!("[vecmat::bench] No config provided; using defaults.");
        BenchConfig::default()
    };

    if let Some(iterations) = matches.get_one::<usize>("iterations") {
        config.iterations = *iterations;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }

    let output_path: Option<&PathBuf> = matches.get_one("output_file");
    if let Some(path) = output_path {
        validate_csv_or_tsv_output(path)?;
    }

    log::debug!(
        "[vecmat::bench] Effective config:\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );

    let timings = match run_suites(suite, &config) {
        Ok(timings) => timings,
        Err(e) => {
            log::error!("Benchmark failed: {:#}", e);
            std::process::exit(1)
        }
    };
    log_timings(&timings);

    if let Some(path) = output_path {
        write_timings(&timings, path)?;
        log::info!("[vecmat::bench] Wrote {} timings to {:?}", timings.len(), path);
    }
    Ok(())
}

fn handle_limits() -> Result<()> {
    let json = serde_json::to_string_pretty(&Limits::current())?;
    println!("{}", json);
    Ok(())
}
