// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fintrack::{cli, commands, config::AppConfig, db};

fn init_logging() {
    let filter = EnvFilter::try_from_env("FINTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = AppConfig::from_env()?;
    let table = db::open_or_init(&cfg)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path().display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&table, &cfg, sub)?,
        Some(("stats", sub)) => commands::stats::handle(&table, &cfg, sub)?,
        Some(("months", sub)) => commands::months::handle(&table, &cfg, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&table, sub)?,
        Some(("scan", sub)) => commands::scan::handle(&table, &cfg, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
