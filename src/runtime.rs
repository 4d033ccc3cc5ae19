//! Background-thread driver for the arena combat variant
//!
//! The simulation runs on its own named thread at a fixed step. Three things
//! cross the boundary: the latest [`HudSnapshot`] behind a mutex (refreshed
//! at most at [`crate::consts::SNAPSHOT_INTERVAL`]), an atomic stop flag
//! polled once per tick, and a completion channel carrying the final
//! [`SessionResult`]. Input never crosses threads as shared state; the
//! caller supplies a closure that is invoked on the simulation thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::consts::{SIM_DT, SNAPSHOT_INTERVAL};
use crate::session::SessionResult;
use crate::sim::{HudSnapshot, InputState, ShooterSim, TickStatus};
use crate::stats::GameId;

/// Session start failed before the first tick.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("{0:?} has no threaded simulation")]
    UnsupportedGame(GameId),
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The simulation thread missed its shutdown deadline.
///
/// The thread is never force-killed; `fallback` is a defaulted aborted
/// result so the session can still be recorded.
#[derive(Debug, Error)]
#[error("simulation thread missed the {timeout:?} shutdown deadline")]
pub struct StopTimeout {
    pub timeout: Duration,
    pub fallback: SessionResult,
}

/// Handle to a running off-thread simulation.
pub struct CombatRuntime {
    game: GameId,
    session_id: u64,
    stop_flag: Arc<AtomicBool>,
    snapshot: Arc<Mutex<HudSnapshot>>,
    result_rx: mpsc::Receiver<SessionResult>,
    handle: Option<JoinHandle<()>>,
    started: Instant,
}

impl CombatRuntime {
    /// Spawn the simulation thread. `input` is called once per tick on that
    /// thread to sample the player's controls.
    pub fn start<F>(game: GameId, seed: u64, input: F) -> Result<Self, StartError>
    where
        F: FnMut() -> InputState + Send + 'static,
    {
        let sim = ShooterSim::new(game, seed).ok_or(StartError::UnsupportedGame(game))?;
        let session_id = sim.session_id();
        let snapshot = Arc::new(Mutex::new(sim.snapshot()));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (result_tx, result_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("sim-{}", game.key()))
            .spawn({
                let snapshot = Arc::clone(&snapshot);
                let stop_flag = Arc::clone(&stop_flag);
                move || sim_loop(sim, input, snapshot, stop_flag, result_tx)
            })
            .map_err(StartError::Spawn)?;

        log::info!("session {session_id} started for {}", game.key());
        Ok(Self {
            game,
            session_id,
            stop_flag,
            snapshot,
            result_rx,
            handle: Some(handle),
            started: Instant::now(),
        })
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Copy of the most recently published HUD state.
    pub fn snapshot(&self) -> HudSnapshot {
        match self.snapshot.lock() {
            Ok(slot) => *slot,
            // A poisoned lock means the sim thread panicked mid-publish;
            // the stale copy it left is still readable.
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Whether the simulation has produced its final result.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Request shutdown and wait up to `timeout` for the final result.
    pub fn stop(self, timeout: Duration) -> Result<SessionResult, StopTimeout> {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.join(timeout)
    }

    /// Wait up to `timeout` for the simulation to end on its own.
    pub fn wait(self, timeout: Duration) -> Result<SessionResult, StopTimeout> {
        self.join(timeout)
    }

    fn join(mut self, timeout: Duration) -> Result<SessionResult, StopTimeout> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                Ok(result)
            }
            Err(_) => {
                log::error!(
                    "simulation thread for {} missed the shutdown deadline",
                    self.game.key()
                );
                // Detach rather than block in Drop on a wedged thread.
                drop(self.handle.take());
                Err(StopTimeout {
                    timeout,
                    fallback: SessionResult::aborted_default(
                        self.game,
                        self.session_id,
                        self.started.elapsed().as_secs_f64(),
                    ),
                })
            }
        }
    }
}

impl Drop for CombatRuntime {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn sim_loop<F>(
    mut sim: ShooterSim,
    mut input: F,
    snapshot: Arc<Mutex<HudSnapshot>>,
    stop_flag: Arc<AtomicBool>,
    result_tx: mpsc::Sender<SessionResult>,
) where
    F: FnMut() -> InputState,
{
    let step = Duration::from_secs_f32(SIM_DT);
    let mut last_publish = Instant::now();
    loop {
        let tick_start = Instant::now();
        let mut controls = input();
        if stop_flag.load(Ordering::Relaxed) {
            controls.stop = true;
        }
        let status = sim.tick(&controls, SIM_DT);

        if status == TickStatus::Over || last_publish.elapsed().as_secs_f32() >= SNAPSHOT_INTERVAL
        {
            if let Ok(mut slot) = snapshot.lock() {
                *slot = sim.snapshot();
            }
            last_publish = Instant::now();
        }

        if status == TickStatus::Over {
            // The sim froze its result inside tick(); the flag is only a
            // fallback for an unreachable not-yet-finished state.
            let _ = result_tx.send(sim.finish(controls.stop));
            return;
        }
        if let Some(rest) = step.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn board_variant_has_no_threaded_runtime() {
        let err = CombatRuntime::start(GameId::FallingBlock, 1, InputState::default)
            .err()
            .unwrap();
        assert!(matches!(err, StartError::UnsupportedGame(GameId::FallingBlock)));
    }

    #[test]
    fn stop_yields_an_aborted_result() {
        let runtime = CombatRuntime::start(GameId::Combat3d, 42, InputState::default).unwrap();
        thread::sleep(Duration::from_millis(50));
        let result = runtime.stop(Duration::from_secs(5)).unwrap();
        assert!(result.aborted);
        assert_eq!(result.game, GameId::Combat3d);
        assert_eq!(result.armor, 3, "stopped before taking damage");
        assert!(result.duration > 0.0);
    }

    #[test]
    fn input_provider_runs_on_the_sim_thread() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let runtime = CombatRuntime::start(GameId::Combat3d, 7, move || {
            counter.fetch_add(1, Ordering::Relaxed);
            InputState::default()
        })
        .unwrap();
        thread::sleep(Duration::from_millis(100));
        runtime.stop(Duration::from_secs(5)).unwrap();
        assert!(calls.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn snapshot_is_readable_while_running() {
        let runtime = CombatRuntime::start(GameId::Combat3d, 3, InputState::default).unwrap();
        thread::sleep(Duration::from_millis(250));
        let snapshot = runtime.snapshot();
        assert_eq!(snapshot.game, GameId::Combat3d);
        assert!(snapshot.elapsed > 0.0);
        runtime.stop(Duration::from_secs(5)).unwrap();
    }
}
