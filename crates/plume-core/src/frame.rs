//! Frame-number conventions.
//!
//! Frame numbers are signed so that effects may start before frame zero.
//! The minimum representable value is reserved as "no frame computed yet".

/// Sentinel frame number meaning no frame has been computed.
///
/// A state carrying this value must be simulated from its initial,
/// empty particle set. It is never a real frame number.
pub const UNCOMPUTED_FRAME: i32 = i32::MIN;

/// Whether `frame` denotes an actually computed frame.
pub const fn is_computed_frame(frame: i32) -> bool {
    frame != UNCOMPUTED_FRAME
}
