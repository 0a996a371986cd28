use thiserror::Error;

/// Everything that can go wrong opening an image or querying a decoded view of it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing section `{0}`")]
    MissingSection(&'static str),

    #[error("bad image: {0}")]
    BadImage(String),

    #[error("failed to decode at rodata offset {offset:#x}: {what}")]
    DecodeError { offset: i32, what: String },

    #[error("kind mismatch: expected {expected:?}, got {actual:?}")]
    KindMismatch { expected: &'static str, actual: &'static str },

    #[error("{op}: index {i} out of range (0..{n})")]
    IndexOutOfRange { op: &'static str, i: usize, n: usize },

    #[error("bad argument to {0}")]
    BadArgument(&'static str),

    #[error("no entry point: main.main not found")]
    NoEntryPoint,

    #[error(transparent)]
    Container(#[from] object::read::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
