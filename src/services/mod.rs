pub mod ads;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod dashboard;
pub mod impression;
pub mod pagination;
pub mod payment_methods;
pub mod session;
pub mod shortlink;
pub mod upload;
pub mod video;
pub mod withdrawal;

pub use ads::{AdLink, AdRotation};
pub use auth::AuthService;
pub use cache::VideoCache;
pub use catalog::Catalog;
pub use dashboard::{DashboardService, DashboardSummary, DateRange};
pub use impression::{DedupPolicy, ImpressionOutcome, ImpressionTracker, PlaybackSession};
pub use payment_methods::{PaymentMethodDraft, PaymentMethodService};
pub use session::SessionStore;
pub use upload::{ProgressCallback, UploadProgress, UploadReceipt, UploadSettings, Uploader};
pub use video::{download_file_name, VideoService};
pub use withdrawal::{WithdrawalFlow, WithdrawalOption};
