use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crossbeam::channel::{bounded, never, tick, Receiver, Sender};
use crossbeam::select;
use parking_lot::{Mutex, RwLock};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::store::asset_store::AssetStore;

/// Periodic housekeeping a background loop can drive. Implementors take
/// their own locks.
pub trait Maintainable: Send + Sync {
    fn persist_if_dirty(&self) -> Result<bool>;
    fn rebuild(&self) -> Result<usize>;
    fn reset_stats(&self);
    fn cleanup_orphans(&self) -> Result<usize>;
    fn name(&self) -> String;
}

impl Maintainable for RwLock<AssetStore> {
    fn persist_if_dirty(&self) -> Result<bool> {
        self.write().persist_if_dirty()
    }

    fn rebuild(&self) -> Result<usize> {
        self.write().rebuild_index()
    }

    fn reset_stats(&self) {
        self.write().reset_rolling_counters();
    }

    fn cleanup_orphans(&self) -> Result<usize> {
        self.write().cleanup_orphans()
    }

    fn name(&self) -> String {
        format!("user {}", self.read().user_id())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaintenanceSchedule {
    pub save: Duration,
    pub rebuild: Duration,
    pub stats: Duration,
    pub cleanup: Duration,
}

impl MaintenanceSchedule {
    pub fn from_config(config: &Config) -> Self {
        MaintenanceSchedule {
            save: config.save_interval,
            rebuild: config.rebuild_interval,
            stats: config.stats_interval,
            cleanup: config.cleanup_interval,
        }
    }
}

// A zero interval disables that timer.
fn ticker(every: Duration) -> Receiver<std::time::Instant> {
    if every.is_zero() {
        never()
    } else {
        tick(every)
    }
}

/// Background thread running one `select!` over the maintenance timers.
///
/// Stopping is deterministic: the loop is told to exit, joined, and the
/// target's dirty index is flushed before `stop` returns.
pub struct MaintenanceHandle {
    shutdown: Sender<()>,
    thread: Mutex<Option<JoinHandle<()>>>,
    target: Arc<dyn Maintainable>,
}

impl MaintenanceHandle {
    pub fn start(target: Arc<dyn Maintainable>, schedule: MaintenanceSchedule) -> Self {
        let (shutdown, shutdown_rx) = bounded::<()>(1);
        let worker_target = target.clone();

        let thread = thread::spawn(move || {
            Self::run(worker_target, schedule, shutdown_rx);
        });

        MaintenanceHandle {
            shutdown,
            thread: Mutex::new(Some(thread)),
            target,
        }
    }

    fn run(target: Arc<dyn Maintainable>, schedule: MaintenanceSchedule, shutdown: Receiver<()>) {
        let save = ticker(schedule.save);
        let rebuild = ticker(schedule.rebuild);
        let stats = ticker(schedule.stats);
        let cleanup = ticker(schedule.cleanup);

        loop {
            select! {
                recv(shutdown) -> _ => break,
                recv(save) -> _ => {
                    if let Err(e) = target.persist_if_dirty() {
                        log::warn!("Index save failed for {}: {}", target.name(), e);
                    }
                }
                recv(rebuild) -> _ => {
                    if let Err(e) = target.rebuild() {
                        log::warn!("Index rebuild failed for {}: {}", target.name(), e);
                    }
                }
                recv(stats) -> _ => target.reset_stats(),
                recv(cleanup) -> _ => {
                    match target.cleanup_orphans() {
                        Ok(0) => {}
                        Ok(n) => log::info!("Cleaned {} orphans for {}", n, target.name()),
                        Err(e) => log::warn!("Orphan cleanup failed for {}: {}", target.name(), e),
                    }
                }
            }
        }
        log::debug!("Maintenance loop for {} stopped", target.name());
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Idempotent. Joins the loop, then flushes the target synchronously.
    pub fn stop(&self) -> Result<()> {
        let Some(handle) = self.thread.lock().take() else {
            return Ok(());
        };
        let _ = self.shutdown.try_send(());
        if handle.join().is_err() {
            log::warn!("Maintenance thread for {} panicked", self.target.name());
        }
        self.target.persist_if_dirty()?;
        Ok(())
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Final index flush failed for {}: {}", self.target.name(), e);
        }
    }
}
