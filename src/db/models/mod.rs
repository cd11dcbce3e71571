mod category;
mod complaint;
mod user;

pub use category::*;
pub use complaint::*;
pub use user::*;
