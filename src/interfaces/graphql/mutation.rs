use async_graphql::{Context, ErrorExtensions, Object, Result as GqlResult, ID};

use super::types::{
    GqlAuthPayload, GqlChangePasswordInput, GqlCreateUserInput, GqlSignUpInput,
    GqlUpdateUserInput, GqlUser,
};
use super::{auth_context, resolvers};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn sign_in(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> GqlResult<GqlAuthPayload> {
        let payload = resolvers(ctx)
            .sign_in(&auth_context(ctx), &email, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(payload.into())
    }

    async fn sign_up(&self, ctx: &Context<'_>, input: GqlSignUpInput) -> GqlResult<GqlAuthPayload> {
        let payload = resolvers(ctx)
            .sign_up(&auth_context(ctx), input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(payload.into())
    }

    /// Admin only. Returns `true` whether or not the user existed.
    async fn remove_user(&self, ctx: &Context<'_>, id: ID) -> GqlResult<bool> {
        resolvers(ctx)
            .remove_user(&auth_context(ctx), &id)
            .await
            .map_err(|e| e.extend())
    }

    /// Admin only.
    async fn create_user(&self, ctx: &Context<'_>, input: GqlCreateUserInput) -> GqlResult<GqlUser> {
        let user = resolvers(ctx)
            .create_user(&auth_context(ctx), input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(user.into())
    }

    /// Admin only. `null` when no user has the given id.
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: GqlUpdateUserInput,
    ) -> GqlResult<Option<GqlUser>> {
        let user = resolvers(ctx)
            .update_user(&auth_context(ctx), &id, input.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(user.map(Into::into))
    }

    async fn change_password(
        &self,
        ctx: &Context<'_>,
        input: GqlChangePasswordInput,
    ) -> GqlResult<bool> {
        resolvers(ctx)
            .change_password(&auth_context(ctx), input.into())
            .await
            .map_err(|e| e.extend())
    }
}
