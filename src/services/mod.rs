pub mod cats;
pub mod page;
pub mod users;

pub use cats::CatService;
pub use page::Page;
pub use users::UserService;
