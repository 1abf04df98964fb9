//! Platform-specific helpers.

pub mod paths;

pub use paths::{default_install_root, hook_invocation, hook_script_name};
