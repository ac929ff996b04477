use std::path::Path;

use crate::command_line::prelude::*;
use crate::sampling::Sampler;

pub const NAME: &str = "make-splits";

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
        .arg(Arg::new("seed").required(false).long("seed").num_args(1))
        .arg(
            Arg::new("p-test")
                .required(false)
                .long("p-test")
                .num_args(1)
                .default_value("0.1"),
        )
        .arg(
            Arg::new("p-valid")
                .required(false)
                .long("p-valid")
                .num_args(1)
                .default_value("0.1"),
        )
        .arg(
            Arg::new("p-train")
                .required(false)
                .long("p-train")
                .num_args(1),
        )
}

pub fn action(matches: &ArgMatches) -> eyre::Result<()> {
    let snapshot = matches.get_one::<String>("snapshot").unwrap();
    let output = matches.get_one::<String>("output").unwrap();

    let seed: u64 = match matches.get_one::<String>("seed") {
        Some(seed) => seed.parse()?,
        None => {
            let seed = rand::random();
            log::warn!(
                "no seed supplied; drew {} — record it or the split is not reproducible",
                seed
            );
            seed
        }
    };

    let p_test: f64 = matches.get_one::<String>("p-test").unwrap().parse()?;
    let p_valid: f64 = matches.get_one::<String>("p-valid").unwrap().parse()?;
    let p_train: Option<f64> = matches
        .get_one::<String>("p-train")
        .map(|p| p.parse())
        .transpose()?;

    let container = DatasetContainer::read_snapshot(Path::new(snapshot))?;
    let n = container.ml_data()?.len();

    let mut sampler = Sampler::new(n);
    sampler.shuffle(seed);
    let split = sampler.split(p_test, p_valid, p_train)?;

    std::fs::write(output, serde_json::to_string_pretty(&split)?)?;
    log::info!(
        "wrote splits (test={}, valid={}, train={}) for seed {} to {}",
        split.test.len(),
        split.valid.len(),
        split.train.len(),
        seed,
        output
    );
    Ok(())
}
