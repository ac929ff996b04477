use std::path::Path;

use crate::command_line::prelude::*;

pub const NAME: &str = "analyze";

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
            Arg::new("ring-size")
                .required(false)
                .long("ring-size")
                .num_args(1)
                .help("Count rings of exactly this size; any ring when omitted"),
        )
        .arg(
            Arg::new("output")
                .required(false)
                .long("output")
                .short('o')
                .num_args(1),
        )
}

pub fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let snapshot = matches.get_one::<String>("snapshot").unwrap();
    let ring_size: Option<usize> = matches
        .get_one::<String>("ring-size")
        .map(|n| n.parse())
        .transpose()?;

    let container = DatasetContainer::read_snapshot(Path::new(snapshot))?;
    let counts = container.structure_counts(ring_size);

    log::info!(
        "structure counts over {} records: {:?}",
        container.raw().len(),
        counts
    );
    if let Some(output) = matches.get_one::<String>("output") {
        std::fs::write(output, serde_json::to_string_pretty(&counts)?)?;
    }
    Ok(())
}
