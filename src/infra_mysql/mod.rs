mod login_history_mysql;
mod principal_store_mysql;

pub use login_history_mysql::*;
pub use principal_store_mysql::*;

mod util;
