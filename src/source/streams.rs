//! Stream resolvers: one service listing progressive formats, another listing
//! adaptive (HLS) manifests.

use crate::source::base::lenient_opt_string;
use crate::upstream::{Accept, Timeouts, Upstream, UpstreamError};

/// 360p combined audio+video
const PROGRESSIVE_ITAG: &str = "18";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct RawFormat {
    itag: serde_json::Value,
    #[serde(deserialize_with = "lenient_opt_string")]
    url: Option<String>,
    #[serde(deserialize_with = "lenient_opt_string")]
    vcodec: Option<String>,
}

impl RawFormat {
    fn is_itag(&self, itag: &str) -> bool {
        match &self.itag {
            serde_json::Value::String(s) => s == itag,
            serde_json::Value::Number(n) => n.to_string() == itag,
            _ => false,
        }
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct RawFormatList {
    formats: Vec<RawFormat>,
}

/// One adaptive manifest variant
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ManifestFormat {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    /// `"WxH"`, e.g. `"1920x1080"`
    #[serde(deserialize_with = "lenient_opt_string")]
    pub resolution: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct RawManifestList {
    m3u8_formats: Vec<ManifestFormat>,
}

/// Progressive URLs. `fallback` is only filled when there is no `primary`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progressive {
    pub primary: Option<String>,
    pub fallback: Option<String>,
}

fn choose_progressive(formats: &[RawFormat]) -> Progressive {
    let primary = formats
        .iter()
        .find(|f| f.is_itag(PROGRESSIVE_ITAG))
        .and_then(|f| f.url().map(|u| u.to_string()));
    if primary.is_some() {
        return Progressive {
            primary,
            fallback: None,
        };
    }

    let fallback = formats
        .iter()
        .find(|f| f.url().is_some() && f.has_video())
        .and_then(|f| f.url().map(|u| u.to_string()));
    Progressive {
        primary: None,
        fallback,
    }
}

/// Height component of a `"WxH"` string. Anything unparseable is 0.
pub fn vertical_resolution(resolution: &str) -> u32 {
    resolution
        .rsplit('x')
        .next()
        .and_then(|h| h.trim().parse().ok())
        .unwrap_or(0)
}

/// Highest vertical resolution wins; on a tie the earliest candidate is kept.
pub fn best_manifest(candidates: &[ManifestFormat]) -> Option<&ManifestFormat> {
    // max_by_key returns the last maximum, so walk backwards
    candidates
        .iter()
        .rev()
        .max_by_key(|c| vertical_resolution(c.resolution.as_deref().unwrap_or("")))
}

/// Ask the progressive resolver at `api` for playable URLs
pub fn progressive(
    upstream: &Upstream,
    api: &str,
    video_id: &str,
) -> Result<Progressive, UpstreamError> {
    let url = format!("{}{}", api, video_id);
    let list: RawFormatList = upstream.get_json(&url, &[], Timeouts::RESOLVER, Accept::Ok)?;
    Ok(choose_progressive(&list.formats))
}

/// Ask the manifest resolver at `api` for the best HLS manifest URL
pub fn manifest(
    upstream: &Upstream,
    api: &str,
    video_id: &str,
) -> Result<Option<String>, UpstreamError> {
    let url = format!("{}{}", api, video_id);
    let list: RawManifestList = upstream.get_json(&url, &[], Timeouts::RESOLVER, Accept::Ok)?;
    Ok(best_manifest(&list.m3u8_formats).and_then(|m| m.url.clone()))
}
