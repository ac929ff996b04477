pub mod analyze;
pub mod featurize;
pub mod ingest;
pub mod make_splits;

pub mod prelude {
    pub use clap::{Arg, ArgAction, ArgMatches, Command};

    pub use crate::dataset::DatasetContainer;
}
