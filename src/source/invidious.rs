//! Invidious mirror API: search, comments and the popular feed.
//!
//! Every function here talks to a single instance; falling back across the
//! mirror pool is up to the caller.

use crate::common::{thumbnail_url, Comment, VideoSummary};
use crate::source::base::{lenient_i64, lenient_opt_string, lenient_string};
use crate::upstream::{Accept, Timeouts, Upstream, UpstreamError};

/// Most popular entries taken from the feed
const POPULAR_LIMIT: usize = 24;

/*
[
  {
    type: "video" | "channel" | "playlist" | "shortVideo",
    title: String,
    videoId: String,
    author: String,
    authorId: String,
    publishedText: String,
    viewCountText: String,
    lengthSeconds: Int32
  }
]
*/
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct InvVideoItem {
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    kind: String,
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    video_id: String,
    #[serde(deserialize_with = "lenient_string")]
    author: String,
    #[serde(deserialize_with = "lenient_string")]
    author_id: String,
    #[serde(deserialize_with = "lenient_string")]
    published_text: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    view_count_text: Option<String>,
    #[serde(deserialize_with = "lenient_i64")]
    length_seconds: i64,
}

impl InvVideoItem {
    fn into_summary(self) -> VideoSummary {
        VideoSummary {
            kind: "video".into(),
            thumbnail: thumbnail_url(&self.video_id, "hqdefault"),
            id: self.video_id,
            title: self.title,
            author: self.author,
            channel_id: self.author_id,
            published: self.published_text,
            views: Some(self.view_count_text.unwrap_or_default()),
            duration: Some(self.length_seconds),
            description: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct InvThumbnail {
    #[serde(deserialize_with = "lenient_string")]
    url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct InvComment {
    #[serde(deserialize_with = "lenient_string")]
    author: String,
    author_thumbnails: Vec<InvThumbnail>,
    #[serde(deserialize_with = "lenient_string")]
    content_html: String,
    #[serde(deserialize_with = "lenient_i64")]
    like_count: i64,
    #[serde(deserialize_with = "lenient_string")]
    published_text: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct InvCommentPage {
    comments: Vec<InvComment>,
}

impl From<InvComment> for Comment {
    fn from(src: InvComment) -> Comment {
        // Largest thumbnail is listed last
        let author_thumbnail = src
            .author_thumbnails
            .last()
            .map(|t| t.url.clone())
            .unwrap_or_default();
        Comment {
            author: src.author,
            author_thumbnail,
            content: src.content_html.replace('\n', "<br>"),
            likes: src.like_count,
            published: src.published_text,
        }
    }
}

/// Search one instance. Only plain videos are kept (no channels or playlists).
pub fn search(
    upstream: &Upstream,
    instance: &str,
    query: &str,
    page: u32,
) -> Result<Vec<VideoSummary>, UpstreamError> {
    let url = format!("{}api/v1/search", instance);
    let page = page.to_string();
    let items: Vec<InvVideoItem> = upstream.get_json(
        &url,
        &[("q", query), ("page", page.as_str()), ("hl", "jp")],
        Timeouts::MIRROR,
        Accept::Ok,
    )?;

    Ok(items
        .into_iter()
        .filter(|i| i.kind == "video")
        .map(|i| i.into_summary())
        .collect())
}

/// Top-level comments for a video from one instance
pub fn comments(
    upstream: &Upstream,
    instance: &str,
    video_id: &str,
) -> Result<Vec<Comment>, UpstreamError> {
    let url = format!("{}api/v1/comments/{}", instance, video_id);
    let page: InvCommentPage = upstream.get_json(&url, &[], Timeouts::MIRROR, Accept::Ok)?;
    Ok(page.comments.into_iter().map(|c| c.into()).collect())
}

/// Popular feed from one instance. An empty feed counts as a failure so the
/// caller moves on.
pub fn popular(upstream: &Upstream, instance: &str) -> Result<Vec<VideoSummary>, UpstreamError> {
    let url = format!("{}api/v1/popular", instance);
    let items: Vec<InvVideoItem> = upstream.get_json(&url, &[], Timeouts::TRENDING, Accept::Ok)?;

    let found: Vec<VideoSummary> = items
        .into_iter()
        .take(POPULAR_LIMIT)
        .filter(|i| i.kind == "video" || i.kind == "shortVideo")
        .map(|i| {
            let mut v = i.into_summary();
            v.duration = None;
            v
        })
        .collect();

    if found.is_empty() {
        return Err(UpstreamError::Empty { url });
    }
    Ok(found)
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use mockito::mock;

    fn instance(name: &str) -> String {
        format!("{}/{}/", mockito::server_url(), name)
    }

    fn upstream() -> Upstream {
        Upstream::new("tubeagg-test")
    }

    #[test]
    fn test_search() -> Result<()> {
        let _m = mock("GET", "/inv-search/api/v1/search?q=cats&page=1&hl=jp")
            .with_body_from_file("testdata/invidious_search.json")
            .create();

        let found = search(&upstream(), &instance("inv-search"), "cats", 1)?;
        // Channel entry is dropped
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "cat00000001");
        assert_eq!(found[0].title, "Cats being cats");
        assert_eq!(found[0].channel_id, "UCcat");
        assert_eq!(found[0].views.as_deref(), Some("1.2M views"));
        assert_eq!(found[0].duration, Some(212));
        assert_eq!(
            found[0].thumbnail,
            "https://i.ytimg.com/vi/cat00000001/hqdefault.jpg"
        );
        assert_eq!(found[1].id, "cat00000002");
        Ok(())
    }

    #[test]
    fn test_search_error_status() {
        let _m = mock("GET", "/inv-search-down/api/v1/search?q=cats&page=1&hl=jp")
            .with_status(502)
            .create();

        let r = search(&upstream(), &instance("inv-search-down"), "cats", 1);
        assert!(r.is_err());
    }

    #[test]
    fn test_comments() -> Result<()> {
        let _m = mock("GET", "/inv-comments/api/v1/comments/abc123")
            .with_body_from_file("testdata/invidious_comments.json")
            .create();

        let found = comments(&upstream(), &instance("inv-comments"), "abc123")?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].author, "@alice");
        assert_eq!(found[0].author_thumbnail, "https://yt3.example/alice-176.jpg");
        assert_eq!(found[0].content, "First!<br>Second line");
        assert_eq!(found[0].likes, 3);
        assert_eq!(found[1].author_thumbnail, "");
        Ok(())
    }

    #[test]
    fn test_popular() -> Result<()> {
        let _m = mock("GET", "/inv-popular/api/v1/popular")
            .with_body_from_file("testdata/invidious_popular.json")
            .create();

        let found = popular(&upstream(), &instance("inv-popular"))?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "pop00000001");
        assert_eq!(found[1].id, "short000001");
        assert_eq!(found[1].views.as_deref(), Some("900K views"));
        Ok(())
    }

    #[test]
    fn test_popular_limit() -> Result<()> {
        let items: Vec<serde_json::Value> = (0..30)
            .map(|n| serde_json::json!({"type": "video", "videoId": format!("vid{}", n), "title": "x"}))
            .collect();
        let _m = mock("GET", "/inv-popular-many/api/v1/popular")
            .with_body(serde_json::to_string(&items)?)
            .create();

        let found = popular(&upstream(), &instance("inv-popular-many"))?;
        assert_eq!(found.len(), 24);
        assert_eq!(found[23].id, "vid23");
        Ok(())
    }

    #[test]
    fn test_popular_empty_is_error() {
        let _m = mock("GET", "/inv-popular-empty/api/v1/popular")
            .with_body("[]")
            .create();

        let r = popular(&upstream(), &instance("inv-popular-empty"));
        assert!(matches!(r, Err(UpstreamError::Empty { .. })));
    }
}
