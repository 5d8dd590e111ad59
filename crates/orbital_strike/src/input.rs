//! Input translation
//!
//! Raw window events are matched against a table of bindings and turned into
//! [`Command`]s. Each binding only fires in the phases listed in its
//! [`PhaseSet`]; the simulation driver executes the resulting commands.

use bitflags::bitflags;
use orbit_engine::prelude::*;

use crate::components::{MissileVariant, PhaseSet, WorldPhase};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// R key
    R,
    /// D key
    D,
    /// Space key
    Space,
    /// 1 key
    Num1,
    /// 2 key
    Num2,
    /// 3 key
    Num3,
    /// 4 key
    Num4,
    /// Comma key
    Comma,
    /// Period key
    Period,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Key or button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Went down
    Press,
    /// Went up
    #[default]
    Release,
    /// Held down long enough to auto-repeat
    Repeat,
}

bitflags! {
    /// Modifier keys held during a key or button event
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Event delivered by the window layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Keyboard key
    Key {
        /// Which key
        key: Key,
        /// Transition
        action: Action,
        /// Held modifiers
        modifiers: Modifiers,
    },
    /// Mouse button
    MouseButton {
        /// Which button
        button: MouseButton,
        /// Transition
        action: Action,
        /// Held modifiers
        modifiers: Modifiers,
    },
    /// Cursor moved, normalized to the window with the origin top-left
    CursorMoved {
        /// New position
        position: Vec2,
    },
    /// Scroll wheel
    Scrolled {
        /// Vertical offset
        offset: f32,
    },
}

/// What a matched binding asks the game to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start a new match
    Restart,
    /// Advance the narrative phase
    ShiftPhase,
    /// Toggle between planning and simulating
    ShiftStage,
    /// Select a weapon
    SelectWeapon(MissileVariant),
    /// Fire the selected weapon towards the cursor
    Fire,
    /// Turn debug markers on or off
    SetDebug(bool),
    /// Change the simulation speed by the given amount
    ChangeSpeed(f32),
    /// Point the aimer at the cursor
    Aim(Vec2),
    /// Pan the camera when the cursor touches an edge
    EdgePan(Vec2),
    /// Zoom the camera
    Zoom(f32),
}

impl Command {
    /// Fill the command's payload from the event that triggered it
    fn with_event(self, event: &InputEvent) -> Self {
        match (self, event) {
            (Self::Aim(_), InputEvent::CursorMoved { position }) => Self::Aim(*position),
            (Self::EdgePan(_), InputEvent::CursorMoved { position }) => Self::EdgePan(*position),
            (Self::Zoom(_), InputEvent::Scrolled { offset }) => Self::Zoom(*offset),
            (command, _) => command,
        }
    }
}

/// Event source a binding listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Keyboard key
    Key(Key),
    /// Mouse button
    MouseButton(MouseButton),
    /// Any cursor movement
    CursorMoved,
    /// Any scrolling
    Scrolled,
}

/// One entry of the binding table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    /// Event source
    pub trigger: Trigger,
    /// Required transition (keys and buttons only)
    pub action: Action,
    /// Required modifiers, matched exactly (keys and buttons only)
    pub modifiers: Modifiers,
    /// Phases in which the binding is active
    pub phases: PhaseSet,
    /// Command issued on a match
    pub command: Command,
}

impl Binding {
    /// Binding on key release without modifiers, active in the match
    pub fn new(trigger: Trigger, command: Command) -> Self {
        Self {
            trigger,
            action: Action::default(),
            modifiers: Modifiers::empty(),
            phases: PhaseSet::default(),
            command,
        }
    }

    /// Require a different transition
    pub fn on(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Require modifiers
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Restrict to other phases
    pub fn in_phases(mut self, phases: PhaseSet) -> Self {
        self.phases = phases;
        self
    }

    fn matches(&self, event: &InputEvent) -> bool {
        match (self.trigger, event) {
            (Trigger::Key(expected), InputEvent::Key { key, action, modifiers }) => {
                expected == *key && self.action == *action && self.modifiers == *modifiers
            }
            (Trigger::MouseButton(expected), InputEvent::MouseButton { button, action, modifiers }) => {
                expected == *button && self.action == *action && self.modifiers == *modifiers
            }
            (Trigger::CursorMoved, InputEvent::CursorMoved { .. }) | (Trigger::Scrolled, InputEvent::Scrolled { .. }) => {
                true
            }
            _ => false,
        }
    }
}

/// Binding table
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    bindings: Vec<Binding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let weapon = |key, variant| Binding::new(Trigger::Key(key), Command::SelectWeapon(variant));
        Self::new(vec![
            Binding::new(Trigger::Key(Key::R), Command::Restart),
            Binding::new(Trigger::Key(Key::Space), Command::ShiftPhase).in_phases(PhaseSet::ALL_BUT_GAME),
            weapon(Key::Num1, MissileVariant::Standard),
            weapon(Key::Num2, MissileVariant::Cluster),
            weapon(Key::Num3, MissileVariant::Fast),
            weapon(Key::Num4, MissileVariant::Gravity),
            Binding::new(Trigger::MouseButton(MouseButton::Left), Command::Fire),
            Binding::new(Trigger::Key(Key::D), Command::SetDebug(true)).on(Action::Press),
            Binding::new(Trigger::Key(Key::D), Command::SetDebug(false)),
            Binding::new(Trigger::Key(Key::Comma), Command::ChangeSpeed(-0.1)).with_modifiers(Modifiers::SHIFT),
            Binding::new(Trigger::Key(Key::Period), Command::ChangeSpeed(0.1)).with_modifiers(Modifiers::SHIFT),
            Binding::new(Trigger::CursorMoved, Command::Aim(Vec2::zeros())),
            Binding::new(Trigger::CursorMoved, Command::EdgePan(Vec2::zeros())),
            Binding::new(Trigger::Scrolled, Command::Zoom(0.0)),
        ])
    }
}

impl KeyBindings {
    /// Table with the given bindings, matched in order
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Append a binding
    pub fn bind(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Bindings in match order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Commands triggered by `event` in `phase`
    pub fn translate(&self, event: &InputEvent, phase: WorldPhase) -> Vec<Command> {
        self.bindings
            .iter()
            .filter(|binding| binding.phases.includes(phase) && binding.matches(event))
            .map(|binding| binding.command.with_event(event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, action: Action, modifiers: Modifiers) -> InputEvent {
        InputEvent::Key { key, action, modifiers }
    }

    #[test]
    fn test_weapon_keys_only_in_game() {
        let bindings = KeyBindings::default();
        let event = key(Key::Num3, Action::Release, Modifiers::empty());

        assert_eq!(
            bindings.translate(&event, WorldPhase::Game),
            vec![Command::SelectWeapon(MissileVariant::Fast)]
        );
        assert!(bindings.translate(&event, WorldPhase::Tut2).is_empty());
        assert!(bindings.translate(&key(Key::Num3, Action::Press, Modifiers::empty()), WorldPhase::Game).is_empty());
    }

    #[test]
    fn test_space_outside_game_only() {
        let bindings = KeyBindings::default();
        let event = key(Key::Space, Action::Release, Modifiers::empty());

        for phase in [WorldPhase::Welcome, WorldPhase::Tut1, WorldPhase::Tut3, WorldPhase::End] {
            assert_eq!(bindings.translate(&event, phase), vec![Command::ShiftPhase]);
        }
        assert!(bindings.translate(&event, WorldPhase::Game).is_empty());
    }

    #[test]
    fn test_modifiers_match_exactly() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.translate(&key(Key::Period, Action::Release, Modifiers::SHIFT), WorldPhase::Game),
            vec![Command::ChangeSpeed(0.1)]
        );
        assert!(bindings
            .translate(&key(Key::Period, Action::Release, Modifiers::empty()), WorldPhase::Game)
            .is_empty());
        assert!(bindings
            .translate(&key(Key::Comma, Action::Release, Modifiers::SHIFT | Modifiers::CONTROL), WorldPhase::Game)
            .is_empty());
    }

    #[test]
    fn test_debug_follows_key_state() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.translate(&key(Key::D, Action::Press, Modifiers::empty()), WorldPhase::Game),
            vec![Command::SetDebug(true)]
        );
        assert_eq!(
            bindings.translate(&key(Key::D, Action::Release, Modifiers::empty()), WorldPhase::Game),
            vec![Command::SetDebug(false)]
        );
    }

    #[test]
    fn test_cursor_and_scroll_carry_payload() {
        let bindings = KeyBindings::default();
        let moved = InputEvent::CursorMoved { position: Vec2::new(0.25, 0.75) };
        assert_eq!(
            bindings.translate(&moved, WorldPhase::Game),
            vec![Command::Aim(Vec2::new(0.25, 0.75)), Command::EdgePan(Vec2::new(0.25, 0.75))]
        );
        assert_eq!(
            bindings.translate(&InputEvent::Scrolled { offset: -2.0 }, WorldPhase::Game),
            vec![Command::Zoom(-2.0)]
        );
        assert!(bindings.translate(&moved, WorldPhase::Welcome).is_empty());
    }

    #[test]
    fn test_custom_binding() {
        let mut bindings = KeyBindings::new(Vec::new());
        bindings.bind(
            Binding::new(Trigger::MouseButton(MouseButton::Right), Command::Restart)
                .on(Action::Press)
                .in_phases(PhaseSet::END),
        );
        let click = InputEvent::MouseButton {
            button: MouseButton::Right,
            action: Action::Press,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(bindings.translate(&click, WorldPhase::End), vec![Command::Restart]);
        assert!(bindings.translate(&click, WorldPhase::Game).is_empty());
        assert_eq!(bindings.bindings().len(), 1);
    }
}
