pub mod feature;
pub mod steps;
pub mod types;

pub use feature::parse_feature_file;
pub use steps::StepParser;
