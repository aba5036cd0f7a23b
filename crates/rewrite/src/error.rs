use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewriteError>;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Detection failed: {0}")]
    Detection(#[from] sense_detect::DetectError),

    #[error("Profile storage failed: {0}")]
    Profile(#[from] sense_profile::ProfileError),
}
