//! End-to-end flow: simulate a session, freeze its result, record it, and
//! read the stats back.

use arcade_lab::achievements::AchievementTracker;
use arcade_lab::persistence::{JsonFileStore, MemoryStore};
use arcade_lab::{BoardSim, GameId, InputState, ShooterSim, TickStatus};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn idle_shooter_defeat_flows_into_stats() {
    init_logs();
    let mut sim = ShooterSim::new(GameId::WaveShooterEp1, 11).unwrap();
    let idle = InputState::default();
    let mut ticks = 0u32;
    while sim.tick(&idle, 1.0 / 60.0) == TickStatus::Running {
        ticks += 1;
        assert!(ticks < 200_000, "an idle player must eventually be overrun");
    }
    let result = sim.finish(false);
    assert!(!result.aborted);
    assert_eq!(result.armor, 0);
    assert!(result.duration > 0.0);

    let mut tracker = AchievementTracker::new(Box::new(MemoryStore::default()));
    let unlocked = tracker.record_session(&result);
    assert!(unlocked.iter().any(|a| a.id == "wave1_first_wave"));
    // Handing the same result over again changes nothing.
    assert!(tracker.record_session(&result).is_empty());
    assert_eq!(tracker.stats(GameId::WaveShooterEp1).unwrap().sessions, 1);
}

#[test]
fn board_top_out_flows_into_stats() {
    init_logs();
    let mut board = BoardSim::new(3);
    let mut drops = 0u32;
    while board.is_running() {
        board.hard_drop();
        drops += 1;
        assert!(drops < 10_000, "stacking without clears must top out");
    }
    let result = board.finish(false);
    assert_eq!(result.game, GameId::FallingBlock);
    assert!(result.score > 0, "lock bonuses accumulate");

    let mut tracker = AchievementTracker::new(Box::new(MemoryStore::default()));
    let unlocked = tracker.record_session(&result);
    assert!(unlocked.iter().any(|a| a.id == "block_first_shift"));
}

#[test]
fn stats_persist_across_tracker_restarts_on_disk() {
    init_logs();
    let dir = std::env::temp_dir().join(format!("arcade-lab-it-{}", std::process::id()));
    let path = dir.join("stats.json");
    {
        let mut tracker = AchievementTracker::new(Box::new(JsonFileStore::new(&path)));
        let mut sim = ShooterSim::new(GameId::Combat3d, 5).unwrap();
        tracker.record_session(&sim.finish(true));
    }
    let tracker = AchievementTracker::new(Box::new(JsonFileStore::new(&path)));
    let stats = tracker.stats(GameId::Combat3d).unwrap();
    assert_eq!(stats.sessions, 1);
    assert!(stats.last_aborted);
    let _ = std::fs::remove_dir_all(&dir);
}
