use std::sync::Arc;

use crate::config::AppInfo;
use crate::db::Store;
use crate::services::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub info: Arc<AppInfo>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, info: AppInfo) -> Self {
        Self {
            store,
            info: Arc::new(info),
        }
    }

    pub fn gateway(&self) -> Gateway {
        Gateway::new(self.store.clone())
    }
}
