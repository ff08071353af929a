// Adapters layer: concrete implementations for external systems (archives, http, lookup tables).

pub mod archive;
pub mod http;
pub mod names;
