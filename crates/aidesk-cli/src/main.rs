// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use aidesk_app::AppState;
use aidesk_db::Store;
use anyhow::{Context, Result};
use config::Config;
use runtime::{DbRuntime, OfflineRuntime};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const DEMO_SEED: u64 = 42;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    dotenv::dotenv().ok();

    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `aidesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    if options.check_only {
        open_store(&db_path, options.demo)?;
        return Ok(());
    }

    logging::init(&config)?;
    info!(db = %db_path.display(), demo = options.demo, "starting aidesk");

    let mut state = AppState::starting_at(config.start_dashboard());
    match open_store(&db_path, options.demo) {
        Ok(store) => {
            let mut runtime = DbRuntime::new(&store);
            aidesk_tui::run_app(&mut state, &mut runtime)
        }
        Err(failure) => {
            error!("store unavailable at startup: {failure:#}");
            let mut runtime = OfflineRuntime::new(format!("{failure:#}"));
            aidesk_tui::run_app(&mut state, &mut runtime)
        }
    }
}

fn open_store(db_path: &Path, demo: bool) -> Result<Store> {
    let store = Store::open(db_path)?;
    store.bootstrap()?;
    if demo {
        store.seed_demo_data(DEMO_SEED)?;
    }
    Ok(store)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("aidesk: student aid administration dashboards");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Open and bootstrap the database, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, open_store, parse_cli_args};
    use aidesk_app::{DashboardKind, SearchFilter};
    use anyhow::Result;
    use std::path::{Path, PathBuf};

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/aidesk-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_every_flag() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-path",
                "--print-example-config",
                "--demo",
                "--check",
                "-h",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_db_path);
        assert!(options.print_example);
        assert!(options.demo);
        assert!(options.check_only);
        assert!(options.show_help);
        Ok(())
    }

    #[test]
    fn demo_store_opens_in_memory_with_seeded_rows() -> Result<()> {
        let store = open_store(Path::new(":memory:"), true)?;
        let programs = store.search(DashboardKind::Programs, &SearchFilter::All)?;
        assert!(!programs.is_empty());
        Ok(())
    }

    #[test]
    fn check_creates_schema_in_a_fresh_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("aidesk.db");
        open_store(&path, false)?;
        let reopened = open_store(&path, false)?;
        let users = reopened.search(DashboardKind::Users, &SearchFilter::All)?;
        assert!(users.is_empty());
        Ok(())
    }
}
