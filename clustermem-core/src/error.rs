use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterMemError {
    #[error("Cluster not found: {name}")]
    ClusterNotFound { name: String },

    #[error("Retrieval of {operation} failed")]
    Retrieval {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Serialization operation '{operation}' failed")]
    Serialization {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type ClusterMemResult<T> = std::result::Result<T, ClusterMemError>;

impl ClusterMemError {
    /// Create a retrieval error wrapping the underlying cause
    pub fn retrieval<E: std::error::Error + Send + Sync + 'static>(
        operation: impl Into<String>,
        source: E,
    ) -> Self {
        ClusterMemError::Retrieval {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a retrieval error from a plain message when there is no typed cause
    pub fn retrieval_message(operation: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        ClusterMemError::Retrieval {
            operation: operation.into(),
            source: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ClusterMemError::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClusterMemError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn serialization<E: std::error::Error + Send + Sync + 'static>(
        operation: impl Into<String>,
        source: E,
    ) -> Self {
        ClusterMemError::Serialization {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error came from the inventory rather than from local input
    pub fn is_retrieval(&self) -> bool {
        matches!(self, ClusterMemError::Retrieval { .. })
    }

    /// Process exit status used by the command-line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            ClusterMemError::ClusterNotFound { .. } => 3,
            ClusterMemError::Configuration { .. } | ClusterMemError::InvalidInput { .. } => 64,
            _ => 1,
        }
    }

    /// Render the error followed by every cause in its source chain
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
