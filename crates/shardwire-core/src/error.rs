use thiserror::Error;

/// Why a parse call rejected its input.
///
/// Never used for control flow inside the parser itself — only for
/// diagnostics and logging once [`Error::Parse`] has already decided the
/// message is dead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("expected a sigil byte ('*', '$', '+', '-', ':') at the current position")]
    UnexpectedByte,

    #[error("command name does not match the known vocabulary")]
    UnknownCommand,

    #[error("argument count does not match the command's arity")]
    ArityMismatch,

    #[error("declared length was zero or missing where one or more digits were required")]
    EmptyLength,

    #[error("expected CR LF but found something else")]
    MissingCrLf,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("protocol parse error: {0}")]
    Parse(#[from] ParseFailure),

    #[error("frame of {size} bytes exceeds the {max_size} byte limit")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
