//! The [`Particle`] trait: the only view the cache has of a particle.

/// A simulated particle stored in a frame state.
///
/// The cache treats particles as opaque except for their trail length,
/// which it aggregates into a frame state's `max_trail`. Position,
/// velocity, lifetime and any other attributes belong to the simulation
/// algorithm.
///
/// `Send + 'static` is required because frame states are moved into
/// render worker threads together with their slot table.
pub trait Particle: Send + 'static {
    /// Number of past positions this particle remembers for motion
    /// streaks. Negative values are permitted and never win against
    /// the `-1` "no trail" baseline.
    fn trail(&self) -> i32;
}

impl Particle for i32 {
    fn trail(&self) -> i32 {
        *self
    }
}
