use crate::body::DEFAULT_BODY_LIMIT;
use hirecore::FlowError;
use hirenodes::ServicesConfig;
use hireruntime::{RunnerConfig, RuntimeConfig};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub max_body_bytes: usize,
    pub runtime: RuntimeConfig,
    pub services: ServicesConfig,
}

impl ServerConfig {
    /// Read `BIND_ADDRESS`, `HIRE_MAX_STEPS`, `HIRE_MAX_BODY_BYTES` and the service variables
    pub fn from_env() -> Result<Self, FlowError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

        let mut runner = RunnerConfig::default();
        if let Ok(raw) = std::env::var("HIRE_MAX_STEPS") {
            runner.max_steps = parse_positive("HIRE_MAX_STEPS", &raw)?;
        }
        let max_body_bytes = match std::env::var("HIRE_MAX_BODY_BYTES") {
            Ok(raw) => parse_positive("HIRE_MAX_BODY_BYTES", &raw)?,
            Err(_) => DEFAULT_BODY_LIMIT,
        };

        Ok(Self {
            bind_address,
            max_body_bytes,
            runtime: RuntimeConfig {
                runner,
                ..RuntimeConfig::default()
            },
            services: ServicesConfig::from_env(),
        })
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, FlowError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FlowError::Config(format!(
            "{} must be a positive integer, got {:?}",
            name, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_must_be_positive() {
        assert_eq!(parse_positive("HIRE_MAX_STEPS", " 25 ").unwrap(), 25);
        assert!(parse_positive("HIRE_MAX_STEPS", "0").is_err());

        let err = parse_positive("HIRE_MAX_BODY_BYTES", "lots").unwrap_err();
        assert!(err.to_string().contains("HIRE_MAX_BODY_BYTES"));
    }
}
