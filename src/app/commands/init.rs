use std::path::Path;

use crate::adapters::deploy_scaffold;
use crate::domain::AppError;

/// Execute the init command: scaffold `zantra.toml` plus sample seed data.
pub fn execute(root: &Path) -> Result<Vec<String>, AppError> {
    deploy_scaffold(root)
}
