use thiserror::Error;

/// Error type for the whole flight-dynamics core.
///
/// Fatal conditions are signalled by `Result` all the way up to the
/// simulation `Manager`, which converts them into the `Stopped` output
/// state in exactly one place. Crash conditions (collision, overspeed,
/// overstress) are *not* errors; they are reported through `DataOut`.
#[derive(Error, Debug)]
pub enum FdmError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("NaN detected in {0}")]
    UnexpectedNaN(String),

    #[error("{context}")]
    Model {
        context: String,
        #[source]
        source: Option<Box<FdmError>>,
    },
}

impl FdmError {
    /// Wrap an error with additional context, preserving the cause chain.
    pub fn context<S: Into<String>>(self, context: S) -> Self {
        FdmError::Model {
            context: context.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Render the full cause chain, outermost first, one cause per line.
    pub fn chain(&self) -> String {
        use std::error::Error;

        let mut out = self.to_string();
        let mut cause: Option<&(dyn Error + 'static)> = self.source();
        while let Some(err) = cause {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_rendering() {
        let err = FdmError::UnexpectedNaN("state vector".into())
            .context("integration failed")
            .context("aircraft step failed");

        let chain = err.chain();
        assert!(chain.starts_with("aircraft step failed"));
        assert!(chain.contains("integration failed"));
        assert!(chain.contains("NaN detected in state vector"));
    }

    #[test]
    fn test_config_error_display() {
        let err = FdmError::Config("missing field: main_rotor.radius".into());
        assert_eq!(
            err.to_string(),
            "Config error: missing field: main_rotor.radius"
        );
    }
}
