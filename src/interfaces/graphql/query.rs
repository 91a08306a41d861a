use async_graphql::{Context, ErrorExtensions, Object, Result as GqlResult};

use super::types::GqlUser;
use super::{auth_context, resolvers};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated caller.
    async fn me(&self, ctx: &Context<'_>) -> GqlResult<Option<GqlUser>> {
        let user = resolvers(ctx)
            .me(&auth_context(ctx))
            .await
            .map_err(|e| e.extend())?;
        Ok(user.map(Into::into))
    }
}
