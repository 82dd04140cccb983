mod clock;
mod credential_store;

pub use clock::*;
pub use credential_store::*;
