use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// The lookup service could not be reached or answered with an error.
    #[error("Song info fetch failed: {0}")]
    SongInfoFetchFailed(String),

    /// The lookup service answered, but not with usable song details.
    #[error("Invalid song info: {0}")]
    InvalidSongInfo(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
