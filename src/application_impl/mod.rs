mod jwt_signer;
mod token_service_impl;

pub use jwt_signer::*;
pub use token_service_impl::*;
