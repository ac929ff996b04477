pub mod structure_matching;
