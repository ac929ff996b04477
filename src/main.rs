use clap::Command;

use qmx::command_line::{analyze, featurize, ingest, make_splits};

fn main() -> eyre::Result<()> {
    env_logger::init();

    let matches = Command::new("qmx")
        .about("QM9/QM8 molecular dataset ingestion, featurization and split generation")
        .subcommand_required(true)
        .subcommand(ingest::command())
        .subcommand(featurize::command())
        .subcommand(make_splits::command())
        .subcommand(analyze::command())
        .get_matches();

    match matches.subcommand() {
        Some((ingest::NAME, args)) => {
            ingest::action(args)?;
        }
        Some((featurize::NAME, args)) => {
            featurize::action(args)?;
        }
        Some((make_splits::NAME, args)) => {
            make_splits::action(args)?;
        }
        Some((analyze::NAME, args)) => {
            analyze::action(args)?;
        }
        Some((other, _args)) => return Err(eyre::eyre!("can't handle {}", other)),
        None => unreachable!("subcommand required"),
    }

    Ok(())
}
