//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule.

pub mod generate;
pub mod list;
pub mod verify;

pub use generate::{execute_generate, GenerateOptions};
pub use list::{execute_list, ListOptions};
pub use verify::execute_verify;
