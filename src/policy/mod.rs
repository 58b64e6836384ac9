//! Static tag → permission → role policy.

mod builtin;
pub mod table;

pub use table::{PermissionRules, PolicyTable, RoleRule};
