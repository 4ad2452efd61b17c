// Application state shared by every handler

use std::sync::Arc;

use crate::donations::DonationStore;

/// Built once in `main` and handed to the router as an extension
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DonationStore>,
}

impl AppState {
    pub fn new(store: Arc<DonationStore>) -> Self {
        Self { store }
    }
}
