use std::sync::Arc;

use crate::services::{service_b::ServiceBClient, token::TokenSupplier};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<dyn TokenSupplier>,
    pub service_b: Arc<ServiceBClient>,
    pub audience: Arc<str>,
    pub expose_error_detail: bool,
}

impl AppState {
    pub fn new(
        tokens: Arc<dyn TokenSupplier>,
        service_b: Arc<ServiceBClient>,
        audience: impl Into<Arc<str>>,
        expose_error_detail: bool,
    ) -> Self {
        Self {
            tokens,
            service_b,
            audience: audience.into(),
            expose_error_detail,
        }
    }
}
