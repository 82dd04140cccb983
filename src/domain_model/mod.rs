mod algorithm;
mod claims;
mod token;

pub use algorithm::*;
pub use claims::*;
pub use token::*;
