//! Resolver inputs
//!
//! Closed allow-lists of the fields each mutation accepts. Anything else is
//! rejected at the GraphQL layer before a resolver runs.

use validator::Validate;

use crate::domain::{UserChanges, UserRole};

#[derive(Debug, Clone, Validate)]
pub struct SignUpInput {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub roles: Vec<UserRole>,
}

#[derive(Debug, Clone, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    pub roles: Vec<UserRole>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateUserInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub roles: Option<Vec<UserRole>>,
}

impl From<UpdateUserInput> for UserChanges {
    fn from(input: UpdateUserInput) -> Self {
        UserChanges {
            email: input.email,
            name: input.name,
            roles: input.roles,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ChangePasswordInput {
    pub current_password: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}
