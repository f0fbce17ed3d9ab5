pub mod caller;
pub mod rbac;
