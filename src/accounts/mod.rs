mod dto;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod uniqueness;

pub use dto::PrincipalView;
pub use repo::{AccountStore, PgAccountStore};
pub use repo_types::{IdentityFilter, NewPrincipal, Principal, PrincipalChanges, Role};
