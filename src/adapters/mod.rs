// Adapters layer: concrete implementations of the domain ports (upstream HTTP, downstream message stream).

pub mod http;
pub mod singer;
