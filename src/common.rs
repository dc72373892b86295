/// Short listing of a video, as shown in search results and trending grids
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VideoSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    pub author: String,
    pub channel_id: String,
    pub thumbnail: String,
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    /// Length in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VideoSummary {
    pub fn new(id: &str, title: &str, author: &str) -> VideoSummary {
        VideoSummary {
            kind: "video".into(),
            id: id.into(),
            title: title.into(),
            author: author.into(),
            channel_id: "".into(),
            thumbnail: thumbnail_url(id, "hqdefault"),
            published: "".into(),
            views: None,
            duration: None,
            description: None,
        }
    }

    pub fn views_str(&self) -> &str {
        self.views.as_deref().unwrap_or("")
    }

    pub fn duration_str(&self) -> String {
        match self.duration {
            Some(d) if d > 0 => format!("{}:{:02}", d / 60, d % 60),
            _ => "".into(),
        }
    }
}

/// Everything shown on the watch page above the comments
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct VideoDetail {
    pub title: String,
    /// HTML formatted
    pub description: String,
    pub author: String,
    pub author_id: String,
    pub author_thumbnail: String,
    pub views: String,
    pub likes: String,
    pub subscribers: String,
    pub published: String,
    pub related: Vec<VideoSummary>,
}

/// Candidate playback URLs for one video. Only `embed` is guaranteed.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StreamBundle {
    pub primary: Option<String>,
    pub fallback: Option<String>,
    pub m3u8: Option<String>,
    pub embed: String,
}

impl StreamBundle {
    pub fn embed_only(video_id: &str) -> StreamBundle {
        StreamBundle {
            primary: None,
            fallback: None,
            m3u8: None,
            embed: embed_url(video_id),
        }
    }

    /// Best directly playable progressive URL, if any
    pub fn progressive(&self) -> Option<&str> {
        self.primary.as_deref().or_else(|| self.fallback.as_deref())
    }

    /// URL for a `<video>` element; `None` means only the embed will work
    pub fn playable(&self) -> Option<&str> {
        self.progressive().or_else(|| self.m3u8.as_deref())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub author_thumbnail: String,
    /// HTML formatted
    pub content: String,
    pub likes: i64,
    pub published: String,
}

pub fn thumbnail_url(video_id: &str, quality: &str) -> String {
    format!(
        "https://i.ytimg.com/vi/{id}/{quality}.jpg",
        id = video_id,
        quality = quality
    )
}

pub fn embed_url(video_id: &str) -> String {
    format!(
        "https://www.youtube-nocookie.com/embed/{id}?autoplay=1",
        id = video_id
    )
}
