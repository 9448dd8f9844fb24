// store

mod document_store;
mod live_query;

pub use document_store::*;
pub use live_query::*;

pub mod collections;

// identity

mod identity_provider;

pub use identity_provider::*;
