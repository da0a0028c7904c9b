use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Feature for window {0} was not computed for this series")]
    WindowNotComputed(usize),

    #[error("Invalid series slice: {0}")]
    Slice(#[from] core_types::CoreError),
}
