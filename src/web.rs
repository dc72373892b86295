use std::sync::Arc;

use anyhow::Result;
use askama::Template;
use log::{debug, info};
use rouille::{router, Request, Response};

use crate::aggregator::{Aggregator, DEFAULT_MAX_RESULTS};
use crate::common::{Comment, StreamBundle, VideoDetail, VideoSummary};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    videos: &'a Vec<VideoSummary>,
}

fn page_index(agg: &Aggregator) -> Result<Response> {
    let videos = agg.trending();
    let t = IndexTemplate { videos: &videos };
    let html = t.render()?;
    Ok(Response::html(html))
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate<'a> {
    videos: &'a Vec<VideoSummary>,
    query: &'a str,
}

fn page_search(agg: &Aggregator, query: &str) -> Result<Response> {
    let videos = if query.is_empty() {
        vec![]
    } else {
        agg.search(query, DEFAULT_MAX_RESULTS)
    };
    let t = SearchTemplate {
        videos: &videos,
        query,
    };
    let html = t.render()?;
    Ok(Response::html(html))
}

#[derive(Template)]
#[template(path = "watch.html")]
struct WatchTemplate<'a> {
    video_id: &'a str,
    video: Option<&'a VideoDetail>,
    streams: &'a StreamBundle,
    comments: &'a Vec<Comment>,
}

fn page_watch(agg: &Aggregator, video_id: &str) -> Result<Response> {
    let video = agg.video_detail(video_id);
    let streams = agg.stream_bundle(video_id);
    let comments = agg.comments(video_id);

    let t = WatchTemplate {
        video_id,
        video: video.as_ref(),
        streams: &streams,
        comments: &comments,
    };
    let html = t.render()?;
    Ok(Response::html(html))
}

#[derive(Debug, Serialize)]
struct WebVideo<'a> {
    info: Option<VideoDetail>,
    streams: &'a StreamBundle,
}

#[derive(Debug, Serialize)]
struct WebError<'a> {
    error: &'a str,
}

fn api_search(agg: &Aggregator, query: Option<String>, page: Option<u32>) -> Result<Response> {
    let query = match query {
        Some(q) if !q.is_empty() => q,
        _ => {
            return Ok(Response::json(&WebError {
                error: "Query required",
            })
            .with_status_code(400))
        }
    };

    let videos = match page {
        Some(page) if page > 1 => agg.mirror_search(&query, page),
        _ => agg.search(&query, DEFAULT_MAX_RESULTS),
    };
    Ok(Response::json(&videos))
}

fn api_video(agg: &Aggregator, video_id: &str) -> Result<Response> {
    let info = agg.video_detail(video_id);
    let streams = agg.stream_bundle(video_id);
    Ok(Response::json(&WebVideo {
        info,
        streams: &streams,
    }))
}

fn api_comments(agg: &Aggregator, video_id: &str) -> Result<Response> {
    Ok(Response::json(&agg.comments(video_id)))
}

fn api_trending(agg: &Aggregator) -> Result<Response> {
    Ok(Response::json(&agg.trending()))
}

/// Every response is marked uncacheable
fn no_cache(resp: Response) -> Response {
    resp.with_unique_header("Cache-Control", "no-cache, no-store, must-revalidate")
        .with_unique_header("Pragma", "no-cache")
        .with_unique_header("Expires", "0")
}

fn handle_response(request: &Request, agg: &Aggregator) -> Response {
    debug!("{} {}", request.method(), request.raw_url());

    if let Some(request) = request.remove_prefix("/static") {
        let x = match request.url().as_ref() {
            "/script.js" => Some((
                include_str!("../static/script.js"),
                "application/javascript",
            )),
            "/style.css" => Some((include_str!("../static/style.css"), "text/css")),
            _ => None,
        };
        return no_cache(match x {
            None => Response::text("404").with_status_code(404),
            Some((data, t)) => Response::from_data(t, data),
        });
    }

    let resp: Result<Response> = router!(request,
        (GET) ["/"] => {
            page_index(agg)
        },
        (GET) ["/search"] => {
            let query = request.get_param("q").unwrap_or_default();
            page_search(agg, &query)
        },
        (GET) ["/watch/{video_id}", video_id: String] => {
            page_watch(agg, &video_id)
        },
        (GET) ["/api/search"] => {
            let page = request.get_param("page").and_then(|x| x.parse::<u32>().ok());
            api_search(agg, request.get_param("q"), page)
        },
        (GET) ["/api/video/{video_id}", video_id: String] => {
            api_video(agg, &video_id)
        },
        (GET) ["/api/comments/{video_id}", video_id: String] => {
            api_comments(agg, &video_id)
        },
        (GET) ["/api/trending"] => {
            api_trending(agg)
        },
        // Default route
        _ => {
            Ok(Response::text("404 Not found").with_status_code(404))
        }
    );
    no_cache(match resp {
        Ok(r) => r,
        Err(e) => Response::text(&format!("Internal service error: {:?}", e)).with_status_code(500),
    })
}

pub fn serve(agg: Arc<Aggregator>) -> Result<()> {
    let addr = format!("{}:{}", agg.config().web_host, agg.config().web_port);
    info!("Listening on http://{}", &addr);
    let srv = rouille::Server::new(&addr, move |request| handle_response(request, &agg))
        .map_err(|e| anyhow::anyhow!("Failed to listen on {}: {}", &addr, e))?;
    srv.run();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use mockito::mock;
    use std::io::Read;

    const UNREACHABLE: &str = "http://127.0.0.1:9/";

    fn offline() -> Aggregator {
        let mut cfg = Config::default();
        cfg.instances = vec![UNREACHABLE.into()];
        cfg.trending_instances = vec![UNREACHABLE.into()];
        cfg.video_info_api = UNREACHABLE.into();
        cfg.stream_api = UNREACHABLE.into();
        cfg.m3u8_api = UNREACHABLE.into();
        Aggregator::new(cfg)
    }

    fn get(agg: &Aggregator, url: &str) -> (u16, Vec<(String, String)>, String) {
        let req = Request::fake_http("GET", url, vec![], vec![]);
        let resp = handle_response(&req, agg);
        let headers = resp
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let status = resp.status_code;
        let (mut reader, _) = resp.data.into_reader_and_size();
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        (status, headers, body)
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_api_search_requires_query() {
        let agg = offline();
        for url in &["/api/search", "/api/search?q="] {
            let (status, _, body) = get(&agg, url);
            assert_eq!(status, 400);
            let j: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(j, serde_json::json!({"error": "Query required"}));
        }
    }

    #[test]
    fn test_api_search_offline_is_empty() {
        let (status, _, body) = get(&offline(), "/api/search?q=cats");
        assert_eq!(status, 200);
        assert_eq!(body.trim(), "[]");
    }

    #[test]
    fn test_api_search_later_page_uses_mirror() {
        let m = mock("GET", "/web-page/api/v1/search?q=cats&page=2&hl=jp")
            .with_body_from_file("testdata/invidious_search.json")
            .expect(1)
            .create();

        let mut cfg = Config::default();
        cfg.youtube_api_key = Some("testkey".into());
        cfg.youtube_api_url = UNREACHABLE.trim_end_matches('/').into();
        cfg.instances = vec![format!("{}/web-page/", mockito::server_url())];
        let agg = Aggregator::new(cfg);

        let (status, _, body) = get(&agg, "/api/search?q=cats&page=2");
        assert_eq!(status, 200);
        let j: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(j.len(), 2);
        assert_eq!(j[0]["id"], "cat00000001");
        m.assert();
    }

    #[test]
    fn test_api_search_bad_page_is_first_page() {
        let m_yt = mock(
            "GET",
            "/web-badpage-yt/youtube/v3/search?part=snippet&type=video&q=cats&maxResults=20&key=testkey",
        )
        .with_body_from_file("testdata/youtube_search.json")
        .expect(1)
        .create();
        let m_mirror = mock("GET", "/web-badpage/api/v1/search?q=cats&page=1&hl=jp")
            .with_body_from_file("testdata/invidious_search.json")
            .expect(0)
            .create();

        let mut cfg = Config::default();
        cfg.youtube_api_key = Some("testkey".into());
        cfg.youtube_api_url = format!("{}/web-badpage-yt", mockito::server_url());
        cfg.instances = vec![format!("{}/web-badpage/", mockito::server_url())];
        let agg = Aggregator::new(cfg);

        let (status, _, body) = get(&agg, "/api/search?q=cats&page=abc");
        assert_eq!(status, 200);
        let j: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(j.len(), 2);
        assert_eq!(j[0]["id"], "yt000000001");
        m_yt.assert();
        m_mirror.assert();
    }

    #[test]
    fn test_api_video_offline() {
        let (status, _, body) = get(&offline(), "/api/video/abc123");
        assert_eq!(status, 200);
        let j: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(j["info"].is_null());
        assert!(j["streams"]["primary"].is_null());
        assert_eq!(
            j["streams"]["embed"],
            "https://www.youtube-nocookie.com/embed/abc123?autoplay=1"
        );
    }

    #[test]
    fn test_api_comments_offline() {
        let (status, _, body) = get(&offline(), "/api/comments/abc123");
        assert_eq!(status, 200);
        assert_eq!(body.trim(), "[]");
    }

    #[test]
    fn test_api_trending_offline() {
        let (status, _, body) = get(&offline(), "/api/trending");
        assert_eq!(status, 200);
        let j: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(j.len(), 12);
        assert_eq!(j[0]["id"], "dQw4w9WgXcQ");
        assert_eq!(j[0]["type"], "video");
    }

    #[test]
    fn test_no_cache_headers() {
        let agg = offline();
        for url in &["/api/trending", "/api/search", "/nonexistent", "/static/script.js"] {
            let (_, headers, _) = get(&agg, url);
            assert_eq!(
                header(&headers, "Cache-Control"),
                Some("no-cache, no-store, must-revalidate")
            );
            assert_eq!(header(&headers, "Pragma"), Some("no-cache"));
            assert_eq!(header(&headers, "Expires"), Some("0"));
        }
    }

    #[test]
    fn test_html_pages() {
        let agg = offline();

        let (status, _, body) = get(&agg, "/");
        assert_eq!(status, 200);
        assert!(body.contains("Rick Astley - Never Gonna Give You Up"));
        assert!(body.contains("/watch/dQw4w9WgXcQ"));

        let (status, _, body) = get(&agg, "/search");
        assert_eq!(status, 200);
        assert!(!body.contains("/watch/"));

        let (status, _, body) = get(&agg, "/watch/abc123");
        assert_eq!(status, 200);
        assert!(body.contains("www.youtube-nocookie.com"));
        assert!(body.contains("abc123"));
    }

    #[test]
    fn test_search_page_escapes_query() {
        let (status, _, body) = get(&offline(), "/search?q=%3Cscript%3E");
        assert_eq!(status, 200);
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unknown_route() {
        let (status, _, _) = get(&offline(), "/nonexistent");
        assert_eq!(status, 404);
        let (status, _, _) = get(&offline(), "/static/missing.js");
        assert_eq!(status, 404);
    }
}
