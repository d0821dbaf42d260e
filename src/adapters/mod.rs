mod halo_client_http;
mod halo_client_retrying;
mod json_history;
mod report_renderer;
mod scaffold;
mod seed_filesystem;
mod task_log_json;

pub use halo_client_http::HttpHaloClient;
pub use halo_client_retrying::{RetryPolicy, RetryingHaloClient};
pub use json_history::JsonHistory;
pub use report_renderer::render_compliance_report;
pub use scaffold::deploy_scaffold;
pub use seed_filesystem::FilesystemSeedStore;
pub use task_log_json::JsonTaskLog;
