use crate::core_network::error::DataConnectionError;
use crate::core_network::passive_ports::PassivePorts;
use crate::core_tls::SslConfiguration;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

pub const DEFAULT_IDLE_TIME_SECS: u64 = 300;
pub const DEFAULT_PASSIVE_PORT_ATTEMPTS: u32 = 2;
pub const DEFAULT_PASSIVE_PORT_WAIT_MS: u64 = 2000;

/// `[data_connection]` section of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConnectionSettings {
    pub idle_time_secs: u64,
    pub active_enabled: bool,
    pub active_ip_check: bool,
    pub active_local_address: Option<IpAddr>,
    pub active_local_port: u16,
    pub passive_address: Option<IpAddr>,
    pub passive_external_address: Option<IpAddr>,
    pub passive_ports: String,
    pub passive_port_attempts: u32,
    pub passive_port_wait_ms: u64,
    pub implicit_ssl: bool,
}

impl Default for DataConnectionSettings {
    fn default() -> Self {
        Self {
            idle_time_secs: DEFAULT_IDLE_TIME_SECS,
            active_enabled: true,
            active_ip_check: false,
            active_local_address: None,
            active_local_port: 0,
            passive_address: None,
            passive_external_address: None,
            passive_ports: String::from("0"),
            passive_port_attempts: DEFAULT_PASSIVE_PORT_ATTEMPTS,
            passive_port_wait_ms: DEFAULT_PASSIVE_PORT_WAIT_MS,
            implicit_ssl: false,
        }
    }
}

impl DataConnectionSettings {
    /// Validates the settings and builds the shared configuration.
    pub fn build(
        &self,
        ssl: Option<SslConfiguration>,
    ) -> Result<DataConnectionConfig, DataConnectionError> {
        let passive_ports = PassivePorts::parse(&self.passive_ports)?;
        if self.passive_port_attempts == 0 {
            warn!("passive_port_attempts is 0, using 1");
        }
        let attempts = self.passive_port_attempts.max(1);
        let passive_port_wait = Duration::from_millis(self.passive_port_wait_ms);
        let passive_port_budget = passive_port_wait
            .checked_mul(attempts - 1)
            .filter(|budget| Instant::now().checked_add(*budget).is_some())
            .ok_or_else(|| {
                DataConnectionError::InvalidSettings(format!(
                    "passive_port_wait_ms {} with {} passive_port_attempts is too long",
                    self.passive_port_wait_ms, attempts
                ))
            })?;

        Ok(DataConnectionConfig {
            idle_time: Duration::from_secs(self.idle_time_secs),
            ssl,
            active_enabled: self.active_enabled,
            active_ip_check: self.active_ip_check,
            active_local_address: self.active_local_address,
            active_local_port: self.active_local_port,
            passive_address: self.passive_address,
            passive_external_address: self.passive_external_address,
            passive_ports: Mutex::new(passive_ports),
            port_released: Notify::new(),
            passive_port_attempts: attempts,
            passive_port_wait,
            passive_port_budget,
            implicit_ssl: self.implicit_ssl,
        })
    }
}

/// Listener-wide data connection policy.
///
/// Everything but the passive port pool is immutable. The pool is guarded by one mutex;
/// waiters for a free port park on `port_released`.
#[derive(Debug)]
pub struct DataConnectionConfig {
    idle_time: Duration,
    ssl: Option<SslConfiguration>,
    active_enabled: bool,
    active_ip_check: bool,
    active_local_address: Option<IpAddr>,
    active_local_port: u16,
    passive_address: Option<IpAddr>,
    passive_external_address: Option<IpAddr>,
    passive_ports: Mutex<PassivePorts>,
    port_released: Notify,
    passive_port_attempts: u32,
    passive_port_wait: Duration,
    passive_port_budget: Duration,
    implicit_ssl: bool,
}

impl DataConnectionConfig {
    pub fn idle_time(&self) -> Duration {
        self.idle_time
    }

    pub fn ssl_configuration(&self) -> Option<&SslConfiguration> {
        self.ssl.as_ref()
    }

    pub fn is_active_enabled(&self) -> bool {
        self.active_enabled
    }

    pub fn is_active_ip_check(&self) -> bool {
        self.active_ip_check
    }

    pub fn active_local_address(&self) -> Option<IpAddr> {
        self.active_local_address
    }

    pub fn active_local_port(&self) -> u16 {
        self.active_local_port
    }

    pub fn passive_address(&self) -> Option<IpAddr> {
        self.passive_address
    }

    pub fn passive_external_address(&self) -> Option<IpAddr> {
        self.passive_external_address
    }

    pub fn is_implicit_ssl(&self) -> bool {
        self.implicit_ssl
    }

    pub fn passive_port_attempts(&self) -> u32 {
        self.passive_port_attempts
    }

    pub fn passive_port_wait(&self) -> Duration {
        self.passive_port_wait
    }

    /// The configured passive port set in range/list notation.
    pub fn passive_ports(&self) -> String {
        self.lock_ports().describe()
    }

    pub fn free_passive_ports(&self) -> usize {
        self.lock_ports().free_count()
    }

    fn lock_ports(&self) -> MutexGuard<'_, PassivePorts> {
        // The pool holds plain flags, a panic while holding the lock cannot leave it
        // half-updated.
        self.passive_ports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserves a passive port, waiting for a release when the pool is exhausted.
    ///
    /// The first try never waits. Each further attempt allows `passive_port_wait` for a
    /// release, so the caller blocks at most `passive_port_wait * (attempts - 1)`. Within
    /// that window every release notification triggers another try. A waiter registers
    /// on the notification before the pool lock is dropped, so a release right after a
    /// failed try still wakes it. Dropping the returned future abandons the wait
    /// without side effects.
    pub async fn acquire_passive_port(
        self: &Arc<Self>,
    ) -> Result<PortReservation, DataConnectionError> {
        let budget = self.passive_port_budget;
        let deadline = Instant::now() + budget;

        loop {
            let notified = self.port_released.notified();
            tokio::pin!(notified);

            {
                let mut ports = self.lock_ports();
                if let Some(port) = ports.try_reserve() {
                    debug!("Reserved passive port {}", port);
                    return Ok(PortReservation {
                        config: Arc::clone(self),
                        port,
                        released: false,
                    });
                }
                notified.as_mut().enable();
            }

            if Instant::now() >= deadline {
                break;
            }

            debug!("No free passive port, waiting for a release");
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                debug!("No passive port released within {:?}", budget);
            }
        }

        warn!(
            "Passive port pool {} exhausted after waiting {:?}",
            self.passive_ports(),
            budget
        );
        Err(DataConnectionError::PortUnavailable)
    }

    /// Returns a port to the pool and wakes one waiter.
    pub fn release_passive_port(&self, port: u16) {
        let released = {
            let mut ports = self.lock_ports();
            ports.release(port)
        };
        if released {
            debug!("Released passive port {}", port);
            self.port_released.notify_one();
        }
    }
}

/// A passive port held by one data connection.
///
/// The port goes back to the pool exactly once, either through `release` or when the
/// reservation is dropped.
#[derive(Debug)]
pub struct PortReservation {
    config: Arc<DataConnectionConfig>,
    port: u16,
    released: bool,
}

impl PortReservation {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.config.release_passive_port(self.port);
        }
    }
}

impl Drop for PortReservation {
    fn drop(&mut self) {
        self.release_once();
    }
}
