//! The scoped session and its process-wide lock.

use core::ops::{Deref, Range};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::properties;

/// The property holding the driver port of the current session.
pub const DRIVER_PORT_KEY: &str = "session.driver.port";

/// The property holding the `host:port` address of the current session.
pub const HOST_PORT_KEY: &str = "session.host_port";

/// The port given to the first session in the process.
const FIRST_DRIVER_PORT: u16 = 7077;

/// Held for the whole lifetime of a session.
static SESSION_LOCK: Mutex<()> = Mutex::new(());

/// The port for the next session.
static NEXT_DRIVER_PORT: AtomicU16 = AtomicU16::new(FIRST_DRIVER_PORT);

/// The configuration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The name used for the session's worker threads.
    pub app_name: String,
    /// The host published in the session address.
    pub host: String,
    /// The number of worker threads. `0` lets the pool decide.
    pub num_threads: usize,
    /// The number of partitions `Session::parallelize` creates.
    pub default_parallelism: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: "sparsegen".to_string(),
            host: "localhost".to_string(),
            num_threads: 0,
            default_parallelism: 4,
        }
    }
}

/// A local session that runs partitioned work on a dedicated thread pool.
#[derive(Debug)]
pub struct Session {
    /// The configuration the session was created with.
    config: SessionConfig,
    /// The worker threads.
    pool: rayon::ThreadPool,
    /// The port published for this session.
    driver_port: u16,
}

impl Session {
    /// Starts a session, blocking until no other session exists in the
    /// process.
    ///
    /// The returned guard ends the session when dropped.
    ///
    /// # Errors
    ///
    /// * If `default_parallelism` is zero.
    /// * If the thread pool could not be built.
    /// * If the process has run out of driver ports.
    ///
    /// # Deadlocks
    ///
    /// * If the calling thread already holds a session. The lock is not
    ///   reentrant, so sessions must not be nested.
    pub fn acquire(config: &SessionConfig) -> Result<SessionGuard, String> {
        if config.default_parallelism == 0 {
            return Err("The default parallelism must be positive.".to_string());
        }

        // Poisoned only by a panicking body, whose guard already cleaned up.
        let lock = SESSION_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let app_name = config.app_name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .thread_name(move |i| format!("{app_name}-worker-{i}"))
            .build()
            .map_err(|e| e.to_string())?;

        let driver_port = allocate_port(&NEXT_DRIVER_PORT)?;
        properties::set(DRIVER_PORT_KEY, driver_port.to_string());
        properties::set(HOST_PORT_KEY, format!("{}:{driver_port}", config.host));

        ftlog::info!(
            "Started session {} on port {driver_port} with {} threads.",
            config.app_name,
            pool.current_num_threads()
        );

        Ok(SessionGuard {
            session: Self {
                config: config.clone(),
                pool,
                driver_port,
            },
            _lock: lock,
        })
    }

    /// The configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The port published for this session.
    #[must_use]
    pub const fn driver_port(&self) -> u16 {
        self.driver_port
    }

    /// The number of worker threads.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Splits `0..count` into `default_parallelism` contiguous partitions.
    #[must_use]
    pub fn parallelize(&self, count: usize) -> Vec<Range<usize>> {
        self.parallelize_with(count, self.config.default_parallelism)
    }

    /// Splits `0..count` into `num_partitions` contiguous partitions.
    /// Partition `i` covers `i * count / n .. (i + 1) * count / n`.
    ///
    /// # Panics
    ///
    /// * If `num_partitions` is zero.
    #[must_use]
    pub fn parallelize_with(&self, count: usize, num_partitions: usize) -> Vec<Range<usize>> {
        sparsegen::partition_ranges(count, num_partitions)
    }

    /// Runs `f` on every partition in the session's thread pool and
    /// concatenates the results in partition order.
    ///
    /// `f` receives the partition index and the partition's indices.
    pub fn map_partitions_with_index<T, I, F>(&self, partitions: Vec<Range<usize>>, f: F) -> Vec<T>
    where
        T: Send,
        I: IntoIterator<Item = T>,
        F: Fn(usize, Range<usize>) -> I + Send + Sync,
    {
        ftlog::debug!("Mapping {} partitions...", partitions.len());

        self.pool
            .install(|| {
                partitions
                    .into_par_iter()
                    .enumerate()
                    .map(|(i, indices)| f(i, indices).into_iter().collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Takes the next port from `counter`, failing once the counter reaches
/// `u16::MAX` instead of wrapping around to port 0.
fn allocate_port(counter: &AtomicU16) -> Result<u16, String> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |port| port.checked_add(1))
        .map_err(|port| format!("No driver ports left after port {port}."))
}

/// Ends its session when dropped, on normal exit and on unwinding.
///
/// Dropping removes the session properties, shuts the thread pool down and
/// then releases the process-wide lock.
#[derive(Debug)]
pub struct SessionGuard {
    /// The running session.
    session: Session,
    /// Released after `session` is dropped.
    _lock: MutexGuard<'static, ()>,
}

impl Deref for SessionGuard {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        properties::remove(DRIVER_PORT_KEY);
        properties::remove(HOST_PORT_KEY);
        ftlog::info!(
            "Stopped session {} on port {}.",
            self.session.config.app_name,
            self.session.driver_port
        );
    }
}

/// Runs `body` inside a new session and returns its result.
///
/// The session ends before this returns, and also if `body` panics.
///
/// # Errors
///
/// * If the session could not be started. See `Session::acquire`.
///
/// # Deadlocks
///
/// * If called from inside another session's `body` on the same thread.
pub fn with_session<T, F: FnOnce(&Session) -> T>(config: &SessionConfig, body: F) -> Result<T, String> {
    let guard = Session::acquire(config)?;
    Ok(body(&guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_sequential() {
        let counter = AtomicU16::new(FIRST_DRIVER_PORT);
        assert_eq!(allocate_port(&counter), Ok(FIRST_DRIVER_PORT));
        assert_eq!(allocate_port(&counter), Ok(FIRST_DRIVER_PORT + 1));
    }

    #[test]
    fn ports_do_not_wrap() {
        let counter = AtomicU16::new(u16::MAX - 1);
        assert_eq!(allocate_port(&counter), Ok(u16::MAX - 1));
        assert!(allocate_port(&counter).is_err());
        assert!(allocate_port(&counter).is_err());
        assert_eq!(counter.load(Ordering::Relaxed), u16::MAX);
    }
}
