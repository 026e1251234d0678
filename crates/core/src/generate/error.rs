use std::fmt;

/// A generate step that did not produce a usable snapshot.
#[derive(Debug)]
pub struct LoadFailure {
    pub source_name: &'static str,
    pub cause: anyhow::Error,
}

impl LoadFailure {
    pub fn new(source_name: &'static str, cause: anyhow::Error) -> Self {
        Self { source_name, cause }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load market data (source={}): {:#}", self.source_name, self.cause)
    }
}

impl std::error::Error for LoadFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}
