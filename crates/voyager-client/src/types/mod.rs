//! Identity and wire types for the Voyager API.

mod identity;
mod invite;

pub use identity::{IdKind, ProfileIdentity};
pub use invite::{InvitePayload, InviteResponse, ProfileLookup};
