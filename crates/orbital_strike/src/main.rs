//! Headless Orbital Strike session
//!
//! Walks through the tutorial, then lets both players take turns firing at
//! each other until a planet falls or the turn limit is reached.
//!
//! Usage: `orbital_strike [config.toml|config.ron]`

use std::path::PathBuf;

use log::{info, warn};
use orbit_engine::config::Config;
use orbit_engine::foundation::{logging, math::Vec2};
use orbital_strike::prelude::*;

/// Wall-clock length of one frame
const FRAME_MS: f32 = 16.0;

/// Turns played before the session gives up
const MAX_TURNS: usize = 40;

const WEAPON_KEYS: [Key; 4] = [Key::Num1, Key::Num2, Key::Num3, Key::Num4];

fn release(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        action: Action::Release,
        modifiers: Modifiers::empty(),
    }
}

/// Position of the planet the current player is shooting at
fn opponent_position(sim: &Simulation) -> GameResult<Option<Vec2>> {
    let player = sim.phase()?.player;
    let registry = sim.registry();
    let opponent = registry.planets.entity_of((player + 1) % 2);
    Ok(opponent
        .and_then(|planet| registry.motions.try_get(planet))
        .map(|motion| motion.position))
}

fn play_turn(sim: &mut Simulation, turn: usize) -> GameResult<()> {
    sim.handle_event(release(WEAPON_KEYS[turn % WEAPON_KEYS.len()]))?;

    if let Some(target) = opponent_position(sim)? {
        let cursor = sim.camera().cursor_for_world(target);
        sim.handle_event(InputEvent::CursorMoved { position: cursor })?;
    }
    sim.handle_event(InputEvent::MouseButton {
        button: MouseButton::Left,
        action: Action::Release,
        modifiers: Modifiers::empty(),
    })?;

    loop {
        sim.frame(FRAME_MS)?;
        let phase = sim.phase()?;
        if phase.phase == WorldPhase::End || !phase.simulation {
            return Ok(());
        }
    }
}

fn main() -> Result<(), GameError> {
    logging::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GameConfig::load_or_default(config_path.as_deref())?;
    let mut sim = Simulation::headless(&config)?;

    while sim.phase()?.phase != WorldPhase::Game {
        sim.handle_event(release(Key::Space))?;
        sim.frame(FRAME_MS)?;
    }

    for turn in 0..MAX_TURNS {
        let player = sim.phase()?.player;
        info!("Turn {turn}: player {player}");
        play_turn(&mut sim, turn)?;

        if sim.phase()?.phase == WorldPhase::End {
            break;
        }
    }

    let lives: Vec<f32> = sim.registry().planets.components().iter().map(|planet| planet.life).collect();
    if sim.phase()?.phase == WorldPhase::End {
        info!("Match over, planet lives: {lives:?}");
    } else {
        warn!("No planet fell within {MAX_TURNS} turns, planet lives: {lives:?}");
    }
    info!(
        "Sounds played: {} launches, {} impacts",
        sim.audio().count(SoundEffect::MissileFire),
        sim.audio().count(SoundEffect::MissileDestroyed)
    );
    Ok(())
}
