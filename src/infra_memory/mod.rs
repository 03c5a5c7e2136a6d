mod login_history_memory;
mod principal_store_memory;
mod revocation_store_memory;

pub use login_history_memory::*;
pub use principal_store_memory::*;
pub use revocation_store_memory::*;
