use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use stockroom_infra::{Session, StoreProvider};

use crate::app::errors::{ApiError, ApiResult};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn StoreProvider>,
    list_timeout: Duration,
}

impl AppServices {
    pub fn new(store: Arc<dyn StoreProvider>, list_timeout: Duration) -> Self {
        Self {
            store,
            list_timeout,
        }
    }

    /// Open the request-scoped session.
    ///
    /// Commit it on success; dropping it on an error path rolls it back.
    pub async fn session(&self) -> ApiResult<Box<dyn Session>> {
        Ok(self.store.open().await?)
    }

    /// Run a list operation under the configured deadline.
    pub async fn with_list_timeout<T>(
        &self,
        op: impl Future<Output = ApiResult<T>>,
    ) -> ApiResult<T> {
        tokio::time::timeout(self.list_timeout, op)
            .await
            .map_err(|_| ApiError::Timeout(self.list_timeout))?
    }
}
