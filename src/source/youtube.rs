use crate::common::VideoSummary;
use crate::upstream::{Accept, Timeouts, Upstream, UpstreamError};

#[derive(Deserialize, Debug, Clone)]
struct YTSearchListResponse {
    items: Vec<YTSearchResult>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct YTSearchResultId {
    video_id: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct YTThumbnailInfo {
    url: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct YTThumbnailList {
    high: YTThumbnailInfo,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct YTSearchSnippet {
    published_at: String,
    channel_id: String,
    title: String,
    description: String,
    thumbnails: YTThumbnailList,
    channel_title: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct YTSearchResult {
    id: YTSearchResultId,
    snippet: YTSearchSnippet,
}

impl From<YTSearchResult> for VideoSummary {
    fn from(src: YTSearchResult) -> VideoSummary {
        let s = src.snippet;
        VideoSummary {
            kind: "video".into(),
            id: src.id.video_id,
            title: s.title,
            author: s.channel_title,
            channel_id: s.channel_id,
            thumbnail: s.thumbnails.high.url,
            published: s.published_at,
            views: None,
            duration: None,
            description: Some(s.description),
        }
    }
}

/// Search via the YouTube Data API v3. A response with no items is reported
/// as `UpstreamError::Empty` so callers treat it like any other failure.
pub fn search(
    upstream: &Upstream,
    api_url: &str,
    api_key: &str,
    query: &str,
    max_results: u32,
) -> Result<Vec<VideoSummary>, UpstreamError> {
    let url = format!("{prefix}/youtube/v3/search", prefix = api_url);
    let max_results = max_results.to_string();
    let d: YTSearchListResponse = upstream.get_json(
        &url,
        &[
            ("part", "snippet"),
            ("type", "video"),
            ("q", query),
            ("maxResults", max_results.as_str()),
            ("key", api_key),
        ],
        Timeouts::PRIMARY_API,
        Accept::Success,
    )?;

    let found: Vec<VideoSummary> = d.items.into_iter().map(|i| i.into()).collect();
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

    fn upstream() -> Upstream {
        Upstream::new("tubeagg-test")
    }

    #[test]
    fn test_search() -> Result<()> {
        let _m = mock(
            "GET",
            "/yt-ok/youtube/v3/search?part=snippet&type=video&q=cats&maxResults=20&key=testkey",
        )
        .with_body_from_file("testdata/youtube_search.json")
        .create();

        let api = format!("{}/yt-ok", mockito::server_url());
        let found = search(&upstream(), &api, "testkey", "cats", 20)?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "yt000000001");
        assert_eq!(found[0].title, "API cats");
        assert_eq!(found[0].author, "API Channel");
        assert_eq!(found[0].channel_id, "UCapi");
        assert_eq!(
            found[0].thumbnail,
            "https://i.ytimg.com/vi/yt000000001/hqdefault.jpg"
        );
        assert_eq!(found[0].published, "2020-01-01T00:00:00Z");
        assert_eq!(found[0].description.as_deref(), Some("All about cats"));
        Ok(())
    }

    #[test]
    fn test_search_quota_exceeded() {
        let _m = mock(
            "GET",
            "/yt-quota/youtube/v3/search?part=snippet&type=video&q=cats&maxResults=20&key=testkey",
        )
        .with_status(403)
        .with_body(r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#)
        .create();

        let api = format!("{}/yt-quota", mockito::server_url());
        let r = search(&upstream(), &api, "testkey", "cats", 20);
        assert!(matches!(r, Err(UpstreamError::Status { status: 403, .. })));
    }

    #[test]
    fn test_search_no_items() {
        let _m = mock(
            "GET",
            "/yt-empty/youtube/v3/search?part=snippet&type=video&q=cats&maxResults=20&key=testkey",
        )
        .with_body(r#"{"kind": "youtube#searchListResponse", "items": []}"#)
        .create();

        let api = format!("{}/yt-empty", mockito::server_url());
        let r = search(&upstream(), &api, "testkey", "cats", 20);
        assert!(matches!(r, Err(UpstreamError::Empty { .. })));
    }
}
