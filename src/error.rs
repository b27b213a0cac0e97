use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("package not found")]
    PackageNotFound,

    #[error("version not found")]
    VersionNotFound,

    #[error("version already exists")]
    VersionExists,

    #[error("version is yanked")]
    VersionYanked,

    #[error("invalid package name: {0}")]
    InvalidName(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("artifact body is empty")]
    EmptyArtifact,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("token expired")]
    TokenExpired,

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
