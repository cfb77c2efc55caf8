//! Named selection of a lookup strategy.

use optima_core::OptimaError;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which remote lookup strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClientKind {
    /// Registry-resolved client.
    Discovery,
    /// Load-balanced HTTP client.
    #[default]
    LoadBalanced,
    /// Declarative request-template client.
    Declarative,
}

impl ClientKind {
    /// All kinds.
    pub const ALL: [ClientKind; 3] = [Self::Discovery, Self::LoadBalanced, Self::Declarative];

    /// Returns the canonical mode name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::LoadBalanced => "rest",
            Self::Declarative => "feign",
        }
    }

    /// Parses a caller-supplied mode, falling back to [`ClientKind::LoadBalanced`].
    pub fn from_mode_or_default(mode: &str) -> Self {
        mode.parse().unwrap_or_else(|e: OptimaError| {
            warn!("{}; using the load-balanced client", e);
            Self::LoadBalanced
        })
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientKind {
    type Err = OptimaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discovery" => Ok(Self::Discovery),
            "rest" | "load-balanced" | "loadbalanced" => Ok(Self::LoadBalanced),
            "feign" | "declarative" => Ok(Self::Declarative),
            other => Err(OptimaError::validation(format!(
                "Unknown organisation client '{}'",
                other
            ))),
        }
    }
}
