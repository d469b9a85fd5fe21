pub mod comment;
pub mod post;
pub mod reaction;
pub mod user;

pub use comment::*;
pub use post::*;
pub use reaction::*;
pub use user::*;
