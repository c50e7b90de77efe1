//! Shared primitive types used across the engine.

/// Human-readable complaint identifier (`CMP-1001`, ...). Unique, issued
/// once at creation from the store's sequence, never changed.
pub type ComplaintId = String;

/// Stable identifier of a staff member, admin, or citizen. Citizen ids are
/// opaque to the engine (notification recipients only); staff and admin ids
/// must exist in the staff directory.
pub type UserId = String;

/// Administrative/geographic zone used to route complaints to local staff
/// and admins.
pub type Locality = String;
