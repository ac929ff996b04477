use std::path::{Path, PathBuf};

use crate::command_line::prelude::*;
use crate::dataset::LoadOptions;

pub const NAME: &str = "ingest";

pub fn command() -> Command {
    Command::new(NAME)
        .arg(
            Arg::new("xyz-dir")
                .required(false)
                .long("xyz-dir")
                .num_args(1)
                .help("Directory of structure files; falls back to QM9_DATA_PATH"),
        )
        .arg(
            Arg::new("ep-file")
                .required(false)
                .long("ep-file")
                .num_args(1)
                .help("Electronic-properties file to load alongside the structures"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .long("output")
                .short('o')
                .num_args(1),
        )
        .arg(
            Arg::new("min-heavy-atoms")
                .required(false)
                .long("min-heavy-atoms")
                .num_args(1),
        )
        .arg(
            Arg::new("max-heavy-atoms")
                .required(false)
                .long("max-heavy-atoms")
                .num_args(1),
        )
        .arg(
            Arg::new("keep-zwitter")
                .required(false)
                .long("keep-zwitter")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plain-smiles")
                .required(false)
                .long("plain-smiles")
                .action(ArgAction::SetTrue)
                .help("Keep the as-written SMILES instead of the canonical form"),
        )
        .arg(Arg::new("limit").required(false).long("limit").num_args(1))
}

pub fn action(matches: &ArgMatches) -> eyre::Result<usize> {
    let xyz_dir = matches.get_one::<String>("xyz-dir").map(PathBuf::from);
    let ep_file = matches.get_one::<String>("ep-file").map(PathBuf::from);
    let output = matches.get_one::<String>("output").unwrap();

    let mut options = LoadOptions::default();
    if let Some(min) = matches.get_one::<String>("min-heavy-atoms") {
        options.min_heavy_atoms = min.parse()?;
    }
    if let Some(max) = matches.get_one::<String>("max-heavy-atoms") {
        options.max_heavy_atoms = max.parse()?;
    }
    options.keep_zwitter = matches.get_flag("keep-zwitter");
    options.canonical = !matches.get_flag("plain-smiles");
    if let Some(limit) = matches.get_one::<String>("limit") {
        options.limit = Some(limit.parse()?);
    }

    let mut container = DatasetContainer::new();
    let report = container.load(xyz_dir.as_deref(), &options)?;
    for fault in &report.faults {
        log::warn!("parse fault in {:?}: {}", fault.path, fault.error);
    }

    if let Some(ep_file) = ep_file {
        container.load_electronic_properties(Some(&ep_file), None)?;
    }

    container.write_snapshot(Path::new(output))?;

    log::info!(
        "ingested {} records ({} filtered, {} faults) into {}",
        report.n_kept,
        report.n_filtered,
        report.faults.len(),
        output
    );
    Ok(report.n_kept)
}
