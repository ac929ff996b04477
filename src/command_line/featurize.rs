use std::path::Path;

use crate::command_line::prelude::*;
use crate::dataset::{FeatureConfig, Featurizer, FeaturizeOutput};

pub const NAME: &str = "featurize";

pub fn command() -> Command {
    Command::new(NAME)
        .arg(
            Arg::new("snapshot")
                .required(true)
                .long("snapshot")
                .short('i')
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .long("output")
                .short('o')
                .num_args(1),
        )
        .arg(
            Arg::new("mode")
                .required(true)
                .long("mode")
                .short('m')
                .num_args(1)
                .help("graph-only, electronic-join or scalar-properties"),
        )
        .arg(
            Arg::new("target-indices")
                .required(false)
                .long("target-indices")
                .num_args(1)
                .help("Comma-separated scalar-property indices (scalar-properties mode)"),
        )
        .arg(
            Arg::new("scale-targets")
                .required(false)
                .long("scale-targets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("scaling-output")
                .required(false)
                .long("scaling-output")
                .num_args(1)
                .help("Write the (mean, std) scaling metadata as JSON"),
        )
}

pub fn action(matches: &ArgMatches) -> eyre::Result<usize> {
    let snapshot = matches.get_one::<String>("snapshot").unwrap();
    let output = matches.get_one::<String>("output").unwrap();
    let mode = matches.get_one::<String>("mode").unwrap();
    let scale_targets = matches.get_flag("scale-targets");

    let target_indices: Vec<usize> = match matches.get_one::<String>("target-indices") {
        Some(raw) => raw
            .split(',')
            .map(|tok| tok.trim().parse::<usize>())
            .collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    let featurizer = Featurizer::from_name(mode, target_indices, scale_targets)?;

    let mut container = DatasetContainer::read_snapshot(Path::new(snapshot))?;
    let outcome = container.featurize(&featurizer, &FeatureConfig::default())?;

    let len = match outcome {
        FeaturizeOutput::Graphs { graphs, .. } => graphs.len(),
        FeaturizeOutput::MlData { len, scaling } => {
            if let Some(scaling) = scaling {
                if let Some(path) = matches.get_one::<String>("scaling-output") {
                    std::fs::write(path, serde_json::to_string_pretty(&scaling)?)?;
                    log::info!("wrote scaling metadata to {}", path);
                }
            }
            len
        }
    };

    container.write_snapshot(Path::new(output))?;
    log::info!("featurized {} entries with mode {}", len, mode);
    Ok(len)
}
