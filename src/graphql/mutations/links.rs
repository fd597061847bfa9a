use super::prelude::*;

#[derive(Default)]
pub struct LinkMutations;

#[Object]
impl LinkMutations {
    /// Share a new link. Requires authentication.
    async fn post(&self, ctx: &Context<'_>, description: String, url: String) -> Result<Link> {
        let service = ctx.data_unchecked::<LinkService>();
        let record = service
            .post(ctx.caller(), description, url)
            .await
            .map_err(|e| e.extend())?;
        Ok(record.into())
    }

    /// Replace the description and url of a link you posted
    async fn update_link(
        &self,
        ctx: &Context<'_>,
        id: i32,
        description: String,
        url: String,
    ) -> Result<Link> {
        let service = ctx.data_unchecked::<LinkService>();
        let record = service
            .update_link(ctx.caller(), id, description, url)
            .await
            .map_err(|e| e.extend())?;
        Ok(record.into())
    }

    /// Delete a link you posted, returning it as it was
    async fn delete_link(&self, ctx: &Context<'_>, id: i32) -> Result<Link> {
        let service = ctx.data_unchecked::<LinkService>();
        let record = service
            .delete_link(ctx.caller(), id)
            .await
            .map_err(|e| e.extend())?;
        Ok(record.into())
    }

    /// Vote for a link. Each user may vote for a link once.
    async fn vote(&self, ctx: &Context<'_>, link_id: i32) -> Result<Link> {
        let service = ctx.data_unchecked::<LinkService>();
        let record = service
            .vote(ctx.caller(), link_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(record.into())
    }
}
