use crate::errors::AppError;
use crate::models::AppData;
use crate::seed;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// Reads the saved state. Anything short of a readable, valid file yields the demo data.
pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                seed::initial_data()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no saved state, starting from demo data");
            seed::initial_data()
        }
        Err(err) => {
            error!("failed to read data file: {err}");
            seed::initial_data()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!(path = %path.display(), "failed to write data file: {err}");
        AppError::internal(err)
    })?;
    Ok(())
}
