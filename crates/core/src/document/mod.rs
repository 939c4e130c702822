pub mod input;
pub mod model;
pub mod projection;
pub mod slug;
