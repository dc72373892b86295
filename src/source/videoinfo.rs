use crate::common::{thumbnail_url, VideoDetail, VideoSummary};
use crate::source::base::lenient_string;
use crate::upstream::{Accept, Timeouts, Upstream, UpstreamError};

/// Related videos kept on the watch page
const RELATED_LIMIT: usize = 20;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct RawDescription {
    #[serde(deserialize_with = "lenient_string")]
    formatted: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct RawAuthor {
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    #[serde(deserialize_with = "lenient_string")]
    name: String,
    #[serde(deserialize_with = "lenient_string")]
    thumbnail: String,
    #[serde(deserialize_with = "lenient_string")]
    subscribers: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawRelated {
    #[serde(deserialize_with = "lenient_string")]
    video_id: String,
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    channel: String,
    #[serde(deserialize_with = "lenient_string")]
    views: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawVideo {
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    description: RawDescription,
    author: RawAuthor,
    #[serde(deserialize_with = "lenient_string")]
    views: String,
    #[serde(deserialize_with = "lenient_string")]
    likes: String,
    #[serde(deserialize_with = "lenient_string")]
    relative_date: String,
    related: Vec<RawRelated>,
}

impl From<RawRelated> for VideoSummary {
    fn from(src: RawRelated) -> VideoSummary {
        let mut v = VideoSummary::new(&src.video_id, &src.title, &src.channel);
        v.thumbnail = thumbnail_url(&src.video_id, "mqdefault");
        v.views = Some(src.views);
        v
    }
}

impl From<RawVideo> for VideoDetail {
    fn from(src: RawVideo) -> VideoDetail {
        VideoDetail {
            title: src.title,
            description: src.description.formatted,
            author: src.author.name,
            author_id: src.author.id,
            author_thumbnail: src.author.thumbnail,
            views: src.views,
            likes: src.likes,
            subscribers: src.author.subscribers,
            published: src.relative_date,
            related: src
                .related
                .into_iter()
                .take(RELATED_LIMIT)
                .map(|r| r.into())
                .collect(),
        }
    }
}

/// Watch page details for a video from the detail service at `api`
pub fn video_detail(
    upstream: &Upstream,
    api: &str,
    video_id: &str,
) -> Result<VideoDetail, UpstreamError> {
    let url = format!("{}{}", api, video_id);
    let raw: RawVideo = upstream.get_json(&url, &[], Timeouts::VIDEO_INFO, Accept::Success)?;
    Ok(raw.into())
}
