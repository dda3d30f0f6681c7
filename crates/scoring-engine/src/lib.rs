pub mod composite;
pub mod entry;
pub mod recommendation;

pub use composite::*;
pub use entry::*;
pub use recommendation::*;
