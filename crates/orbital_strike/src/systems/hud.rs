//! HUD visibility

use crate::components::Hide;
use crate::error::GameResult;
use crate::registry::Registry;

/// Hide HUD elements whose phase set excludes the current phase
///
/// Recomputed every frame from the current phase.
pub fn update_visibility(registry: &mut Registry) -> GameResult<()> {
    let phase = registry.phase()?.phase;
    let Registry { huds, hidden, .. } = registry;

    for (entity, hud) in huds.iter() {
        if hud.phases.includes(phase) {
            hidden.remove(entity);
        } else if !hidden.has(entity) {
            hidden.insert(entity, Hide)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{PhaseSet, RenderRequest, TextureId, WorldPhase};
    use crate::factory;
    use orbit_engine::prelude::*;

    #[test]
    fn test_visibility_follows_phase() {
        let mut registry = Registry::new();
        factory::create_phase(&mut registry).unwrap();
        let key = factory::create_hud_component(
            &mut registry,
            Vec2::zeros(),
            Vec2::new(30.0, 30.0),
            RenderRequest::sprite(TextureId::Key1),
            PhaseSet::GAME | PhaseSet::TUT2,
        )
        .unwrap();

        update_visibility(&mut registry).unwrap();
        assert!(registry.hidden.has(key));
        update_visibility(&mut registry).unwrap();
        assert_eq!(registry.hidden.len(), 1);

        registry.phase_mut().unwrap().phase = WorldPhase::Tut2;
        update_visibility(&mut registry).unwrap();
        assert!(!registry.hidden.has(key));
    }
}
