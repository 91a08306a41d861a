//! GraphQL object, enum and input types
//!
//! Input objects are closed: a field not listed here fails query validation
//! before any resolver runs. `User.passwordHash` is never exposed.

use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::application::{ChangePasswordInput, CreateUserInput, SignUpInput, UpdateUserInput};
use crate::domain::{AuthPayload, User, UserRole};

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
#[graphql(name = "UserRole")]
pub enum GqlUserRole {
    Admin,
    User,
}

impl From<UserRole> for GqlUserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => GqlUserRole::Admin,
            UserRole::User => GqlUserRole::User,
        }
    }
}

impl From<GqlUserRole> for UserRole {
    fn from(role: GqlUserRole) -> Self {
        match role {
            GqlUserRole::Admin => UserRole::Admin,
            GqlUserRole::User => UserRole::User,
        }
    }
}

fn to_domain_roles(roles: Vec<GqlUserRole>) -> Vec<UserRole> {
    roles.into_iter().map(UserRole::from).collect()
}

#[derive(SimpleObject, Clone)]
#[graphql(name = "User")]
pub struct GqlUser {
    pub id: ID,
    pub email: String,
    pub name: String,
    pub roles: Vec<GqlUserRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for GqlUser {
    fn from(u: User) -> Self {
        Self {
            id: ID(u.id),
            email: u.email,
            name: u.name,
            roles: u.roles.into_iter().map(GqlUserRole::from).collect(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(name = "AuthPayload")]
pub struct GqlAuthPayload {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: GqlUser,
}

impl From<AuthPayload> for GqlAuthPayload {
    fn from(p: AuthPayload) -> Self {
        Self {
            token: p.token,
            token_type: p.token_type,
            expires_in: p.expires_in,
            user: p.user.into(),
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "SignUpInput")]
pub struct GqlSignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[graphql(default)]
    pub roles: Vec<GqlUserRole>,
}

impl From<GqlSignUpInput> for SignUpInput {
    fn from(i: GqlSignUpInput) -> Self {
        Self {
            name: i.name,
            email: i.email,
            password: i.password,
            roles: to_domain_roles(i.roles),
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "CreateUserInput")]
pub struct GqlCreateUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    #[graphql(default)]
    pub roles: Vec<GqlUserRole>,
}

impl From<GqlCreateUserInput> for CreateUserInput {
    fn from(i: GqlCreateUserInput) -> Self {
        Self {
            email: i.email,
            password: i.password,
            name: i.name,
            roles: to_domain_roles(i.roles),
        }
    }
}

#[derive(InputObject, Default)]
#[graphql(name = "UpdateUserInput")]
pub struct GqlUpdateUserInput {
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Option<Vec<GqlUserRole>>,
}

impl From<GqlUpdateUserInput> for UpdateUserInput {
    fn from(i: GqlUpdateUserInput) -> Self {
        Self {
            email: i.email,
            name: i.name,
            roles: i.roles.map(to_domain_roles),
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "ChangePasswordInput")]
pub struct GqlChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

impl From<GqlChangePasswordInput> for ChangePasswordInput {
    fn from(i: GqlChangePasswordInput) -> Self {
        Self {
            current_password: i.current_password,
            new_password: i.new_password,
        }
    }
}
