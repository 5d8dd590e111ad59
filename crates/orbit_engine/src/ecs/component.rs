//! Component trait

/// Marker trait for component data stored in a [`super::ComponentContainer`]
pub trait Component: 'static {}

impl Component for crate::foundation::math::Vec2 {}
impl Component for crate::foundation::math::Vec3 {}
