pub mod api;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod history;
pub mod messages;
pub mod principal;
pub mod project;
pub mod room;
pub mod staged_change;
pub mod tenant;
pub mod webhook;

pub use api::*;
pub use diagnostics::*;
pub use error::*;
pub use health::*;
pub use history::*;
pub use messages::*;
pub use principal::*;
pub use project::*;
pub use room::*;
pub use staged_change::*;
pub use tenant::*;
pub use webhook::*;
