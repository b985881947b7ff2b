pub mod cat;
pub mod user;

pub use cat::{Cat, CatRow, CatWithOwner, CatWithOwnerRow};
pub use user::{User, UserPublic};
