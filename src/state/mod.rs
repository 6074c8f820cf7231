pub(crate) mod block_sync;

use crate::api::ApiClient;
use crate::models::AccountInfo;
use crate::storage::load_user_from_storage;
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
