mod login_record;
mod token;
mod user;

pub use login_record::*;
pub use token::*;
pub use user::*;
