use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invadere::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Create,

    Surface {
        #[arg(long)]
        run_idx: usize,

        #[arg(long)]
        comm_idx: Option<usize>,
    },

    Analyze,

    Export {
        #[arg(long)]
        run_idx: usize,
    },

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Create => mgr.create_run()?,
        Command::Surface { run_idx, comm_idx } => mgr.evaluate_surface(run_idx, comm_idx)?,
        Command::Analyze => mgr.analyze_sim()?,
        Command::Export { run_idx } => mgr.export_run(run_idx)?,
        Command::Clean => mgr.clean_sim()?,
    }

    Ok(())
}
