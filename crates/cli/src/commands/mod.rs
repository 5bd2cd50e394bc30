//! Command implementations.

mod info;
mod list;
mod run;
mod source;
mod validate;

pub use info::run_info;
pub use list::run_list;
pub use run::run_crew;
pub use validate::run_validate;
