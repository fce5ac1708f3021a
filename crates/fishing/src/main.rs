//! Headless runner: plays a seeded session with auto-shoot and auto-aim on,
//! cycling through the skills, and logs what happened.

use std::time::Duration;

use anyhow::{Context, Result};
use fishing::{CoreEvent, GameCatalog, GamePhase, Intent, Session, SkillKind};

const FRAME: Duration = Duration::from_millis(16);
/// Frames between skill activations.
const SKILL_EVERY: u64 = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let catalog_path = args
        .next()
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.ron").to_string());
    let seed: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid seed {:?}", s))?,
        None => 7,
    };
    let seconds: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid duration {:?}", s))?,
        None => 120,
    };

    let catalog = GameCatalog::load(&catalog_path).with_context(|| format!("loading catalog {}", catalog_path))?;
    log::info!("Simulating {}s of play with seed {}", seconds, seed);

    let mut session = Session::new(catalog, seed);
    session.handle_intent(Intent::FinishLoading)?;
    session.handle_intent(Intent::ToggleAutoShoot)?;
    session.handle_intent(Intent::ToggleAutoAim)?;

    let mut skills = SkillKind::ALL.iter().copied().cycle();
    let frames = seconds * 1000 / FRAME.as_millis() as u64;
    for frame in 1..=frames {
        session.update(FRAME);

        if frame % SKILL_EVERY == 0 {
            if let Some(skill) = skills.next() {
                // Refusals are logged by the session.
                let _ = session.handle_intent(Intent::ActivateSkill(skill));
            }
        }

        for event in session.drain_events() {
            match event {
                CoreEvent::BossSpawned { .. }
                | CoreEvent::BossDefeated { .. }
                | CoreEvent::JackpotWon { .. }
                | CoreEvent::ChainReaction { .. }
                | CoreEvent::MissionCompleted { .. }
                | CoreEvent::AchievementUnlocked { .. } => log::info!("{:?}", event),
                _ => log::trace!("{:?}", event),
            }
        }

        if session.phase() == GamePhase::GameOver {
            log::warn!("Game over at {:.1}s", session.now().as_secs_f32());
            break;
        }
    }

    let hud = session.snapshot();
    log::info!(
        "Done: score {} coins {} | caught {} bosses {} | accuracy {:.1}% max combo {}",
        hud.score,
        hud.coins,
        hud.fish_caught,
        hud.bosses_killed,
        hud.accuracy,
        hud.max_combo
    );
    log::info!(
        "Bet {} total, won {} | jackpot pool {}",
        session.wallet().total_bet(),
        session.wallet().total_win(),
        hud.jackpot
    );
    Ok(())
}
