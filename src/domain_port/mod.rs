// store

mod revocation_store;

pub use revocation_store::*;

// repo

mod login_history_repo;
mod principal_store;

pub use login_history_repo::*;
pub use principal_store::*;

// time

mod clock;

pub use clock::*;
