pub mod chat;
pub mod help;
pub mod landing;
pub mod modal;
pub mod session_list;
pub mod transactions;
