pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    /// A newer build was started while this one was in flight.
    #[error("build generation {generation} is stale (current generation is {current})")]
    StaleBuild { generation: u64, current: u64 },
    /// The id would collide with a fixed column of the frequency table.
    #[error("pathway id {0:?} is reserved")]
    ReservedPathwayId(String),
}
