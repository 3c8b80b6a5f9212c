pub mod analytics;
pub mod comments;
pub mod diagnostics;
pub mod health;
pub mod projects;
pub mod rooms;
pub mod staged_changes;
pub mod webhooks;

pub use analytics::*;
pub use comments::*;
pub use diagnostics::*;
pub use health::*;
pub use projects::*;
pub use rooms::*;
pub use staged_changes::*;
pub use webhooks::*;
