//! Shared application state for all routes.

use crate::service::UserService;
use crate::store::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(users: UserService) -> Self {
        AppState {
            users: Arc::new(users),
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        self.users.store()
    }
}
