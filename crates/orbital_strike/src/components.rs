//! Game-specific components

use bitflags::bitflags;
use orbit_engine::prelude::*;

/// Kinematic state shared by every visible body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// World position
    pub position: Vec2,

    /// Linear velocity, or the orbit centre for [`AngularMotion`] bodies
    pub velocity: Vec2,

    /// Non-uniform scale, also the render half-extent
    pub scale: Vec2,

    /// Facing angle in radians, or angular velocity for [`AngularMotion`] bodies
    pub angle: f32,

    /// Gravitational mass
    pub mass: f32,

    /// Collision radius
    pub radius: f32,
}

impl Component for Motion {}

impl Default for Motion {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            scale: Vec2::new(10.0, 10.0),
            angle: 0.0,
            mass: 1.0,
            radius: 0.0,
        }
    }
}

macro_rules! tag_components {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl Component for $name {}
        )*
    };
}

tag_components! {
    /// Position is a fixed rotation about a centre rather than integrated
    AngularMotion,
    /// Excluded from gravity and from missile collision
    IgnorePhysics,
    /// Drifting hazard
    Asteroid,
    /// Owner of the turn state
    Player,
    /// Central star
    Sun,
    /// Short-lived missile exhaust
    SmokeParticle,
    /// One end of the wormhole pair
    Wormhole,
    /// Not drawn this frame
    Hide,
    /// Carries a planet label
    PlanetName,
    /// Diagnostic marker, cleared at the start of every world step
    DebugComponent,
}

/// Missile flavours, numbered as on the weapon keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissileVariant {
    /// 50 damage
    #[default]
    Standard = 1,
    /// Fan of three small missiles, 25 damage each
    Cluster = 2,
    /// Triple speed, 40 damage
    Fast = 3,
    /// Heavy missile that bends its neighbours' paths
    Gravity = 4,
}

impl MissileVariant {
    /// All variants in key order
    pub const ALL: [Self; 4] = [Self::Standard, Self::Cluster, Self::Fast, Self::Gravity];

    /// Key number of the variant (1 to 4)
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Geometry the variant is drawn with
    pub const fn geometry(self) -> GeometryId {
        match self {
            Self::Standard => GeometryId::Missile,
            Self::Cluster => GeometryId::ClusterMissile,
            Self::Fast => GeometryId::FastMissile,
            Self::Gravity => GeometryId::GravityMissile,
        }
    }
}

/// Self-propelled projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Missile {
    /// Life taken from a planet on impact
    pub damage: f32,

    /// Flavour
    pub variant: MissileVariant,
}

impl Component for Missile {}

/// A player's home world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    /// Life before the last hit, drives the damage animation
    pub old_life: f32,

    /// Milliseconds since the last hit
    pub time_since_change: f32,

    /// Authoritative health
    pub life: f32,

    /// Tint
    pub color: Color,
}

impl Component for Planet {}

impl Default for Planet {
    fn default() -> Self {
        Self {
            old_life: 100.0,
            time_since_change: 0.0,
            life: 100.0,
            color: Color::new(0.0, 0.0, 1.0),
        }
    }
}

/// Narrative stages of a session, each double the previous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum WorldPhase {
    /// Title screen
    #[default]
    Welcome = 1,
    /// First tutorial page
    Tut1 = 2,
    /// Second tutorial page
    Tut2 = 4,
    /// Third tutorial page
    Tut3 = 8,
    /// Match in progress
    Game = 16,
    /// A planet has fallen
    End = 32,
}

impl WorldPhase {
    /// Phase reached by doubling, saturating at [`WorldPhase::End`]
    pub const fn next(self) -> Self {
        match self {
            Self::Welcome => Self::Tut1,
            Self::Tut1 => Self::Tut2,
            Self::Tut2 => Self::Tut3,
            Self::Tut3 => Self::Game,
            Self::Game | Self::End => Self::End,
        }
    }

    /// Bitmask value
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Single-member phase set
    pub fn as_set(self) -> PhaseSet {
        PhaseSet::from_bits_truncate(self.bits())
    }
}

bitflags! {
    /// Set of phases, used to gate bindings and HUD visibility
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PhaseSet: u32 {
        const WELCOME = 1;
        const TUT1 = 1 << 1;
        const TUT2 = 1 << 2;
        const TUT3 = 1 << 3;
        const GAME = 1 << 4;
        const END = 1 << 5;

        const ALL_BUT_GAME = Self::WELCOME.bits() | Self::TUT1.bits() | Self::TUT2.bits()
            | Self::TUT3.bits() | Self::END.bits();
    }
}

impl PhaseSet {
    /// Whether `phase` belongs to the set
    pub fn includes(self, phase: WorldPhase) -> bool {
        self.contains(phase.as_set())
    }
}

impl Default for PhaseSet {
    fn default() -> Self {
        Self::GAME
    }
}

/// Turn state, owned by exactly one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Phase {
    /// Index of the planning player (0 or 1)
    pub player: usize,

    /// Physics running (true) or planning (false)
    pub simulation: bool,

    /// Narrative stage
    pub phase: WorldPhase,
}

impl Component for Phase {}

/// Countdown in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    /// Only ticks while the simulation runs
    pub simulation: bool,

    /// Remaining milliseconds
    pub ms: f32,

    /// Destroy the owner on expiry instead of just the timer
    pub death: bool,
}

impl Component for Timer {}

impl Default for Timer {
    fn default() -> Self {
        Self {
            simulation: true,
            ms: 1000.0,
            death: false,
        }
    }
}

impl Timer {
    /// Non-lethal simulation timer of `ms` milliseconds
    pub fn new(ms: f32) -> Self {
        Self { ms, ..Self::default() }
    }

    /// Simulation timer that destroys its owner after `ms` milliseconds
    pub fn death(ms: f32) -> Self {
        Self { ms, death: true, ..Self::default() }
    }
}

/// Decaying launch boost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedUp {
    /// Displacement multiplier
    pub boost: f32,

    /// Remaining milliseconds
    pub ms: f32,

    /// Boost lost per step
    pub decay_factor: f32,
}

impl Component for SpeedUp {}

impl Default for SpeedUp {
    fn default() -> Self {
        Self {
            boost: 2.3,
            ms: 5000.0,
            decay_factor: 0.05,
        }
    }
}

/// Directed contact event, recorded in both directions and cleared every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    /// The entity touched
    pub other_entity: Entity,
}

impl Component for Collision {}

/// Screen-space element shown only in some phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudComponent {
    /// Phases in which the element is visible
    pub phases: PhaseSet,
}

impl Component for HudComponent {}

/// RGB tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Component for Color {}

impl Color {
    /// Tint from components
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }
}

/// Sprite-sheet animation state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Animation {
    /// Milliseconds played so far
    pub total_elapsed: f32,

    /// Milliseconds per frame
    pub frame_duration: f32,

    /// Columns in the sheet
    pub nx_frame: f32,

    /// Rows in the sheet
    pub ny_frame: f32,

    /// Restart after the last frame
    pub does_loop: bool,

    /// Currently playing
    pub is_active: bool,

    /// Mirrored horizontally
    pub is_flipped: bool,
}

impl Component for Animation {}

impl Animation {
    /// Looping sheet of `nx` by `ny` frames at 100 ms per frame
    pub fn looping(nx: f32, ny: f32) -> Self {
        Self {
            frame_duration: 100.0,
            nx_frame: nx,
            ny_frame: ny,
            does_loop: true,
            ..Self::default()
        }
    }
}

/// Textures known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    /// Planet surface
    Ice,
    /// Star surface
    Sun,
    /// Weapon key 1
    Key1,
    /// Weapon key 2
    Key2,
    /// Weapon key 3
    Key3,
    /// Weapon key 4
    Key4,
    /// Asteroid, first variant
    Asteroid,
    /// Asteroid, second variant
    Asteroid2,
    /// Asteroid, third variant
    Asteroid3,
    /// Star field
    Background,
    /// Wormhole swirl
    Wormhole,
    /// Weapon selection frame
    Highlight,
}

/// Shader effects known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectId {
    /// Per-vertex colour
    Coloured,
    /// Pebble shading
    Pebble,
    /// Tinted missile shading
    Missile,
    /// Exhaust puff
    Smoke,
    /// Plain texture
    Textured,
    /// Sprite-sheet animation
    Animated,
    /// Full-screen post effect
    Water,
}

/// Geometry buffers known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryId {
    /// Standard missile hull
    Missile,
    /// Fast missile hull
    FastMissile,
    /// Cluster missile hull
    ClusterMissile,
    /// Gravity missile hull
    GravityMissile,
    /// Exhaust quad
    Smoke,
    /// Textured unit quad
    Sprite,
    /// Pebble
    Pebble,
    /// Debug line segment
    DebugLine,
    /// Full-screen triangle
    ScreenTriangle,
}

impl GeometryId {
    /// Every geometry buffer
    pub const ALL: [Self; 9] = [
        Self::Missile,
        Self::FastMissile,
        Self::ClusterMissile,
        Self::GravityMissile,
        Self::Smoke,
        Self::Sprite,
        Self::Pebble,
        Self::DebugLine,
        Self::ScreenTriangle,
    ];
}

/// What and how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    /// Texture, if any
    pub texture: Option<TextureId>,

    /// Shader effect
    pub effect: EffectId,

    /// Geometry buffer
    pub geometry: GeometryId,
}

impl Component for RenderRequest {}

impl RenderRequest {
    /// Request with explicit parts
    pub const fn new(texture: Option<TextureId>, effect: EffectId, geometry: GeometryId) -> Self {
        Self { texture, effect, geometry }
    }

    /// Textured sprite
    pub const fn sprite(texture: TextureId) -> Self {
        Self::new(Some(texture), EffectId::Textured, GeometryId::Sprite)
    }

    /// Animated sprite
    pub const fn animated(texture: TextureId) -> Self {
        Self::new(Some(texture), EffectId::Animated, GeometryId::Sprite)
    }
}

/// Collision mesh an entity is tested with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRef(pub GeometryId);

impl Component for MeshRef {}

/// Full-screen state read by the post effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenState {
    /// Darkening strength; negative disables it
    pub screen_darken_factor: f32,
}

impl Component for ScreenState {}

impl Default for ScreenState {
    fn default() -> Self {
        Self { screen_darken_factor: -1.0 }
    }
}
