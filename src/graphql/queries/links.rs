use super::prelude::*;

#[derive(Default)]
pub struct LinkQueries;

#[Object]
impl LinkQueries {
    /// List links, optionally filtered by a substring of description or url
    async fn feed(
        &self,
        ctx: &Context<'_>,
        filter: Option<String>,
        skip: Option<i32>,
        take: Option<i32>,
        order_by: Option<Vec<LinkOrderByInput>>,
    ) -> Result<Feed> {
        let service = ctx.data_unchecked::<LinkService>();

        let args = FeedArgs {
            filter,
            skip,
            take,
            order_by: order_by.map(|inputs| inputs.into_iter().map(Into::into).collect()),
        };

        let page = service.feed(args).await.map_err(|e| e.extend())?;

        Ok(Feed {
            links: page.links.into_iter().map(Link::from).collect(),
            count: count_to_int(page.count),
            id: Some(ID(page.id)),
        })
    }

    /// Get a single link by id
    async fn find_one_link(&self, ctx: &Context<'_>, id: i32) -> Result<Link> {
        let service = ctx.data_unchecked::<LinkService>();
        let record = service.find_one(id).await.map_err(|e| e.extend())?;
        Ok(record.into())
    }
}
