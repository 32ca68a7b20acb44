use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// Clock read failed or a sample pair went backwards.
    Timer(String),
    /// Jitter collector could not be set up or returned a short read.
    JitterSource(String),
    /// Operation not available on this target or not enabled.
    Unsupported(String),
    InvalidGraph(String),
    InvalidArgs(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Timer(msg) => write!(f, "timer error: {}", msg),
            Error::JitterSource(msg) => write!(f, "jitter source error: {}", msg),
            Error::Unsupported(msg) => write!(f, "unsupported operation: {}", msg),
            Error::InvalidGraph(msg) => write!(f, "invalid graph: {}", msg),
            Error::InvalidArgs(msg) => write!(f, "invalid arguments: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let msg = format!("{}", err);
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_display_timer() {
        let err = Error::Timer("clock went backwards".into());
        let msg = format!("{}", err);
        assert!(msg.contains("timer error"));
        assert!(msg.contains("backwards"));
    }

    #[test]
    fn test_display_jitter_source() {
        let err = Error::JitterSource("short read: 3 of 8 bytes".into());
        let msg = format!("{}", err);
        assert!(msg.contains("jitter source error"));
        assert!(msg.contains("short read"));
    }

    #[test]
    fn test_display_unsupported() {
        let err = Error::Unsupported("software interrupt".into());
        let msg = format!("{}", err);
        assert!(msg.contains("unsupported operation"));
        assert!(msg.contains("software interrupt"));
    }

    #[test]
    fn test_display_invalid_graph() {
        let err = Error::InvalidGraph("expected 6 rows, got 5".into());
        assert!(format!("{}", err).contains("invalid graph"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("expected Error::Io"),
        }
    }
}
