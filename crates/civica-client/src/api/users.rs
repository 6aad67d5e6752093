//! Users API.

use crate::client::PortalClient;
use crate::error::Result;
use crate::types::{
    CreateUserRequest, Credentials, LoginResponse, Page, RegisterUserRequest, UpdateUserRequest,
    User,
};

/// Users API client.
pub struct UsersApi {
    client: PortalClient,
}

impl UsersApi {
    pub(crate) fn new(client: PortalClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.client.post("users/login", credentials).await
    }

    /// List all users.
    pub async fn list(&self) -> Result<Vec<User>> {
        self.client.get("users").await
    }

    /// List one page of users.
    pub async fn list_page(&self, page: u32) -> Result<Page<User>> {
        self.client.get(&format!("users/page/{}", page)).await
    }

    /// Create a user (admin-side).
    pub async fn create(&self, request: &CreateUserRequest) -> Result<User> {
        self.client.post("users", request).await
    }

    /// Update a user.
    pub async fn update(&self, id: i64, request: &UpdateUserRequest) -> Result<User> {
        self.client.put(&format!("users/{}", id), request).await
    }

    /// Delete a user.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("users/{}", id)).await
    }

    /// Self-service signup. Distinct from [`create`](Self::create): it is
    /// reachable without a token and records terms acceptance.
    pub async fn register(&self, request: &RegisterUserRequest) -> Result<User> {
        self.client.post("users/registration", request).await
    }
}
