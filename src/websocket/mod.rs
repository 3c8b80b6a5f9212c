pub mod dispatch;
pub mod handler;
