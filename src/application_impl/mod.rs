mod auth_service_impl;
mod jwt_token_codec;
mod session_service_impl;

pub use auth_service_impl::*;
pub use jwt_token_codec::*;
pub use session_service_impl::*;
