use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectError>;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Empty input text")]
    EmptyInput,

    #[error("Input too long: {len} bytes (max {max})")]
    InputTooLong { len: usize, max: usize },
}
