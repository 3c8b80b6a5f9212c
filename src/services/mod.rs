pub mod analytics_service;
pub mod auth_service;
pub mod comment_service;
pub mod content_service;
pub mod history_service;
pub mod line_diff;
pub mod room_service;
pub mod staging_service;
pub mod webhook_service;

pub use analytics_service::{Analytics, AnalyticsEvent};
pub use comment_service::CommentService;
pub use content_service::{ContentChannel, SaveOutcome};
pub use history_service::HistoryLedger;
pub use staging_service::StagingEngine;
pub use webhook_service::WebhookRegistry;
