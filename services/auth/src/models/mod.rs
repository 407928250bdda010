//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{
    CreateUserRequest, LoginRequest, NewUser, TokenResponse, UpdateUser, UpdateUserRequest, User,
    UserResponse,
};
