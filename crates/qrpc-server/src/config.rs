//! Service and queue configuration.
//!
//! Both configurations are plain builders with a `validate` step, checked
//! once when a handler or queue is created.

use std::time::Duration;

/// Where a service is mounted.
///
/// # Fields
///
/// - `root_address` - Prefix shared by every service of a host (default: none)
/// - `service_address` - Explicit service address; when absent it is derived
///   from the service's annotations or its class name
///
/// # Example
///
/// ```
/// use qrpc_server::ServiceConfig;
///
/// let config = ServiceConfig::new()
///     .with_root_address("api")
///     .with_service_address("calc");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    pub root_address: Option<String>,
    pub service_address: Option<String>,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_address(mut self, root: impl Into<String>) -> Self {
        self.root_address = Some(root.into());
        self
    }

    pub fn with_service_address(mut self, address: impl Into<String>) -> Self {
        self.service_address = Some(address.into());
        self
    }

    /// Addresses may not contain template segments or empty inner segments.
    pub fn validate(&self) -> Result<(), String> {
        for (label, address) in [
            ("root address", &self.root_address),
            ("service address", &self.service_address),
        ] {
            let Some(address) = address else { continue };
            let trimmed = address.trim_matches('/');
            if trimmed.contains('{') || trimmed.contains('}') {
                return Err(format!("{} must not contain template segments (got '{}')", label, address));
            }
            if !trimmed.is_empty() && trimmed.split('/').any(str::is_empty) {
                return Err(format!("{} must not contain empty segments (got '{}')", label, address));
            }
        }
        Ok(())
    }
}

/// Tuning of a [`ServiceQueue`](crate::ServiceQueue).
///
/// # Fields
///
/// - `batch_limit` - Calls dispatched before the `queueLimit` hook fires and
///   the batch ends (default: 64)
/// - `idle_timeout` - Quiet period after which `queueIdle` fires
///   (default: 30 seconds)
/// - `inbound_capacity` - Bound of the inbound call channel (default: 1024)
#[derive(Debug, Clone, PartialEq)]
pub struct QueueConfig {
    pub batch_limit: usize,
    pub idle_timeout: Duration,
    pub inbound_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_limit: 64,
            idle_timeout: Duration::from_secs(30),
            inbound_capacity: 1024,
        }
    }
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    /// # Errors
    ///
    /// Returns an error if:
    /// - Batch limit is zero
    /// - Idle timeout is zero
    /// - Inbound capacity is zero
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_limit == 0 {
            return Err("batch limit must be greater than zero".to_string());
        }
        if self.idle_timeout.is_zero() {
            return Err("idle timeout must be greater than zero".to_string());
        }
        if self.inbound_capacity == 0 {
            return Err("inbound capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}
