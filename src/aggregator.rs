use std::sync::mpsc;
use std::sync::Mutex;

use log::{debug, info};
use threadpool::ThreadPool;

use crate::common::{Comment, StreamBundle, VideoDetail, VideoSummary};
use crate::config::Config;
use crate::source::base::{absorb, first_success};
use crate::source::{invidious, streams, videoinfo, youtube};
use crate::upstream::{Upstream, UpstreamError};

/// Default number of results asked of the YouTube API
pub const DEFAULT_MAX_RESULTS: u32 = 20;

const RESOLVER_THREADS: usize = 8;

enum Resolved {
    Progressive(Result<streams::Progressive, UpstreamError>),
    Manifest(Result<Option<String>, UpstreamError>),
}

/// Answers every request by querying upstreams. Never fails: an unavailable
/// upstream just means less (or fallback) data.
pub struct Aggregator {
    config: Config,
    upstream: Upstream,
    resolvers: Mutex<ThreadPool>,
}

impl Aggregator {
    pub fn new(config: Config) -> Aggregator {
        let upstream = Upstream::new(&config.user_agent);
        let pool = threadpool::Builder::new()
            .num_threads(RESOLVER_THREADS)
            .thread_name("resolver".into())
            .build();
        Aggregator {
            config,
            upstream,
            resolvers: Mutex::new(pool),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Search via the YouTube API when a key is configured, otherwise (or
    /// when that fails) via the mirrors
    pub fn search(&self, query: &str, max_results: u32) -> Vec<VideoSummary> {
        if let Some(key) = &self.config.youtube_api_key {
            let primary = youtube::search(
                &self.upstream,
                &self.config.youtube_api_url,
                key,
                query,
                max_results,
            );
            match primary {
                Ok(found) => return found,
                Err(e) => info!("YouTube API search failed, using mirrors: {}", e),
            }
        }
        self.mirror_search(query, 1)
    }

    pub fn mirror_search(&self, query: &str, page: u32) -> Vec<VideoSummary> {
        first_success(&self.config.instances, |instance| {
            invidious::search(&self.upstream, instance, query, page)
        })
        .unwrap_or_default()
    }

    /// `None` covers both "no such video" and "detail service unavailable"
    pub fn video_detail(&self, video_id: &str) -> Option<VideoDetail> {
        absorb(
            "video detail",
            videoinfo::video_detail(&self.upstream, &self.config.video_info_api, video_id),
        )
    }

    /// Both resolvers are queried concurrently. The embed URL is always set.
    pub fn stream_bundle(&self, video_id: &str) -> StreamBundle {
        let pool = match self.resolvers.lock() {
            Ok(p) => p.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let (tx, rx) = mpsc::channel();

        {
            let tx = tx.clone();
            let upstream = self.upstream.clone();
            let api = self.config.stream_api.clone();
            let id = video_id.to_string();
            pool.execute(move || {
                let _ = tx.send(Resolved::Progressive(streams::progressive(
                    &upstream, &api, &id,
                )));
            });
        }
        {
            let upstream = self.upstream.clone();
            let api = self.config.m3u8_api.clone();
            let id = video_id.to_string();
            pool.execute(move || {
                let _ = tx.send(Resolved::Manifest(streams::manifest(&upstream, &api, &id)));
            });
        }

        let mut bundle = StreamBundle::embed_only(video_id);
        // Ends once both jobs have dropped their sender
        for resolved in rx.iter() {
            match resolved {
                Resolved::Progressive(r) => {
                    if let Some(p) = absorb("progressive stream", r) {
                        bundle.primary = p.primary;
                        bundle.fallback = p.fallback;
                    }
                }
                Resolved::Manifest(r) => {
                    bundle.m3u8 = absorb("stream manifest", r).flatten();
                }
            }
        }
        debug!("Streams for {}: {:?}", video_id, &bundle);
        bundle
    }

    pub fn comments(&self, video_id: &str) -> Vec<Comment> {
        first_success(&self.config.instances, |instance| {
            invidious::comments(&self.upstream, instance, video_id)
        })
        .unwrap_or_default()
    }

    /// Popular feed from the fast mirrors, or the built-in list
    pub fn trending(&self) -> Vec<VideoSummary> {
        first_success(&self.config.trending_instances, |instance| {
            invidious::popular(&self.upstream, instance)
        })
        .unwrap_or_else(|| {
            info!("Using built-in trending list");
            crate::fallback::TRENDING.clone()
        })
    }
}
