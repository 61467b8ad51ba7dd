//! Small local error enums, in the teacher's style: no blanket
//! error-handling crate, just `std::io::Error` where the underlying failure
//! already is one, and purpose-built variants everywhere else.
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Invalid or unreadable configuration; fatal at startup (spec §7).
    Config(String),
    /// Loss of a listening socket at bind time; fatal for the network loop.
    Bind(std::io::Error),
    /// Failure to write a published artifact; the previous file is left in
    /// place and the publisher retries next tick, so this is only ever
    /// logged, never propagated.
    Publish(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Bind(e) => write!(f, "failed to bind listener: {e}"),
            Error::Publish(e) => write!(f, "failed to write published artifact: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(_) => None,
            Error::Bind(e) | Error::Publish(e) => Some(e),
        }
    }
}
