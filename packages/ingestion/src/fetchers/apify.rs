//! `ContentFetcher` backed by Apify Instagram actors.

use apify_client::{ApifyClient, InstagramPost, InstagramReel};
use async_trait::async_trait;

use crate::error::{IngestionError, Result};
use crate::traits::fetcher::ContentFetcher;
use crate::types::content::{ItemBody, OwnerSnapshot, ScrapedItem};

/// Scrapes posts and reels through the Apify actor-run API.
#[derive(Clone)]
pub struct ApifyFetcher {
    client: ApifyClient,
}

impl ApifyFetcher {
    pub fn new(client: ApifyClient) -> Self {
        Self { client }
    }
}

fn non_empty(url: String) -> Option<String> {
    (!url.is_empty()).then_some(url)
}

impl From<InstagramPost> for ScrapedItem {
    fn from(post: InstagramPost) -> Self {
        ScrapedItem::Post(ItemBody {
            caption: post.caption,
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            media_url: post.video_url.or(post.display_url),
            permalink: non_empty(post.url),
            timestamp: post.timestamp,
            owner: OwnerSnapshot {
                full_name: post.owner_full_name,
                followers_count: post.followers_count,
                profile_pic_url: post.profile_pic_url,
            },
        })
    }
}

impl From<InstagramReel> for ScrapedItem {
    fn from(reel: InstagramReel) -> Self {
        ScrapedItem::Reel {
            body: ItemBody {
                caption: reel.caption,
                likes_count: reel.likes_count,
                comments_count: reel.comments_count,
                media_url: reel.video_url.or(reel.display_url),
                permalink: non_empty(reel.url),
                timestamp: reel.timestamp,
                owner: OwnerSnapshot {
                    full_name: reel.owner_full_name,
                    followers_count: reel.followers_count,
                    profile_pic_url: reel.profile_pic_url,
                },
            },
            view_count: reel.video_view_count.or(reel.video_play_count),
        }
    }
}

#[async_trait]
impl ContentFetcher for ApifyFetcher {
    async fn fetch_posts(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>> {
        let posts = self
            .client
            .scrape_instagram_posts(handle, limit)
            .await
            .map_err(|e| IngestionError::Fetch(format!("posts for {handle}: {e}")))?;
        Ok(posts.into_iter().map(ScrapedItem::from).collect())
    }

    async fn fetch_reels(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>> {
        let reels = self
            .client
            .scrape_instagram_reels(handle, limit)
            .await
            .map_err(|e| IngestionError::Fetch(format!("reels for {handle}: {e}")))?;
        Ok(reels.into_iter().map(ScrapedItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::content::ContentKind;

    #[test]
    fn reel_maps_view_count_and_owner() {
        let reel = InstagramReel {
            caption: Some("shakshuka".into()),
            owner_full_name: Some("Dana".into()),
            video_play_count: Some(900),
            url: "https://www.instagram.com/reel/abc/".into(),
            ..Default::default()
        };

        let item = ScrapedItem::from(reel);
        assert_eq!(item.kind(), ContentKind::Reel);
        assert_eq!(item.owner().full_name.as_deref(), Some("Dana"));
        assert!(matches!(item, ScrapedItem::Reel { view_count: Some(900), .. }));
    }

    #[test]
    fn post_without_url_has_no_permalink() {
        let item = ScrapedItem::from(InstagramPost::default());
        assert_eq!(item.kind(), ContentKind::Post);
        assert!(item.body().permalink.is_none());
    }
}
