pub mod comment;
pub mod message;
pub mod product;
pub mod product_like;
pub mod profile;

pub use comment::Comment;
pub use message::Message;
pub use product::Product;
pub use product_like::ProductLike;
pub use profile::{Profile, Role};
