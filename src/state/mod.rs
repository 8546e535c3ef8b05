//! State Module - Registrierungs- und Anrufzustand
//!
//! - Datenmodell ([`ApplicationState`], [`Session`], ...)
//! - Reiner Reducer `(state, event) -> state`
//! - Store mit Subscriptions für das Frontend
//!

mod model;
mod reducer;
mod store;

pub use model::{
    ApplicationState, CallDirection, CallState, ConnectionState, DtmfHandle, ErrorKind, Session,
    SessionInfo,
};
pub use reducer::reduce;
pub use store::{StateStore, SubscriptionId};
