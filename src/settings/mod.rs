//! Settings come from a TOML file chosen by `--settings` (or the build
//! profile default) with `LATCHKEY__SECTION__KEY` environment overrides.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
