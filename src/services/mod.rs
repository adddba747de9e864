//! Business logic services

pub mod auth;
pub mod books;
pub mod loans;
pub mod members;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Gateway};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    gateway: Arc<dyn Gateway>,
}

impl Services {
    /// Create all services sharing the given gateway
    pub fn new(gateway: Arc<dyn Gateway>, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(gateway.clone(), auth_config),
            books: books::BooksService::new(gateway.clone()),
            members: members::MembersService::new(gateway.clone()),
            loans: loans::LoansService::new(gateway.clone()),
            gateway,
        }
    }

    /// Check that the backing store answers, for readiness probes
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.gateway.ping().await
    }
}
