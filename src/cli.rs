use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::debug;
use serde::Serialize;

use crate::aggregator::{Aggregator, DEFAULT_MAX_RESULTS};
use crate::common::VideoSummary;
use crate::config::Config;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), value)?;
    println!();
    Ok(())
}

fn load_config() -> Result<Config> {
    debug!("Loading config");
    Config::load().context("Failed to load configuration")
}

/// Overlay `--host` and `--port` onto the loaded config
fn apply_web_args(cfg: &mut Config, sub_m: &ArgMatches) -> Result<()> {
    if let Some(host) = sub_m.value_of("host") {
        cfg.web_host = host.into();
    }
    if let Some(port) = sub_m.value_of("port") {
        cfg.web_port = port
            .parse()
            .with_context(|| format!("Invalid port {:?}", port))?;
    }
    Ok(())
}

/// Serve web interface
fn web(sub_m: &ArgMatches) -> Result<()> {
    let mut cfg = load_config()?;
    apply_web_args(&mut cfg, sub_m)?;
    let agg = Arc::new(Aggregator::new(cfg));
    crate::web::serve(agg)
}

fn parse_page(page: Option<&str>) -> Result<u32> {
    match page {
        Some(p) => p.parse().with_context(|| format!("Invalid page {:?}", p)),
        None => Ok(1),
    }
}

/// Pages past the first only exist on the mirrors
fn search_results(agg: &Aggregator, query: &str, page: u32) -> Vec<VideoSummary> {
    if page > 1 {
        agg.mirror_search(query, page)
    } else {
        agg.search(query, DEFAULT_MAX_RESULTS)
    }
}

fn search(query: &str, page: Option<&str>) -> Result<()> {
    let page = parse_page(page)?;
    let agg = Aggregator::new(load_config()?);
    print_json(&search_results(&agg, query, page))
}

fn trending() -> Result<()> {
    let agg = Aggregator::new(load_config()?);
    print_json(&agg.trending())
}

fn video(video_id: &str) -> Result<()> {
    let agg = Aggregator::new(load_config()?);
    let info = agg.video_detail(video_id);
    let streams = agg.stream_bundle(video_id);
    print_json(&serde_json::json!({
        "info": info,
        "streams": streams,
    }))
}

fn comments(video_id: &str) -> Result<()> {
    let agg = Aggregator::new(load_config()?);
    print_json(&agg.comments(video_id))
}

/// The API key is never included, only whether one is set
fn config_json(cfg: &Config) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(cfg)?;
    value["youtube_api_key_set"] = serde_json::Value::Bool(cfg.has_api_key());
    Ok(value)
}

fn show_config() -> Result<()> {
    let cfg = load_config()?;
    print_json(&config_json(&cfg)?)
}

fn config_logging(verbosity: u64) -> Result<()> {
    // Level for this application
    let internal_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,  // -v
        2 => log::LevelFilter::Debug, // -vv
        _ => log::LevelFilter::Trace, // -vvv
    };

    // Show log output for 3rd party library at -vvv
    let thirdparty_level = match verbosity {
        0..=2 => log::LevelFilter::Warn,
        _ => log::LevelFilter::Debug, // -vvv
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(thirdparty_level)
        .level_for("tubeagg", internal_level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

fn build_app() -> App<'static, 'static> {
    // Web subcommand
    let sc_web = SubCommand::with_name("web")
        .about("serve web interface")
        .arg(
            Arg::with_name("host")
                .long("host")
                .takes_value(true)
                .value_name("HOST"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .value_name("PORT"),
        );

    let sc_search = SubCommand::with_name("search")
        .about("search for videos")
        .arg(Arg::with_name("query").required(true))
        .arg(
            Arg::with_name("page")
                .long("page")
                .takes_value(true)
                .value_name("N"),
        );

    let sc_trending = SubCommand::with_name("trending").about("list trending videos");

    let sc_video = SubCommand::with_name("video")
        .about("show video details and stream URLs")
        .arg(Arg::with_name("id").required(true));

    let sc_comments = SubCommand::with_name("comments")
        .about("list comments on a video")
        .arg(Arg::with_name("id").required(true));

    let sc_config = SubCommand::with_name("config").about("show effective configuration");

    // Main command
    App::new("tubeagg")
        .subcommand(sc_web)
        .subcommand(sc_search)
        .subcommand(sc_trending)
        .subcommand(sc_video)
        .subcommand(sc_comments)
        .subcommand(sc_config)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .takes_value(false)
                .global(true),
        )
}

pub fn main() -> Result<()> {
    let app = build_app();

    // Parse
    let app_m = app.get_matches();

    // Logging levels
    let verbosity = app_m.occurrences_of("verbose");
    config_logging(verbosity)?;

    match app_m.subcommand() {
        ("web", Some(sub_m)) => web(sub_m)?,
        ("search", Some(sub_m)) => search(
            sub_m.value_of("query").unwrap_or_default(),
            sub_m.value_of("page"),
        )?,
        ("trending", Some(_sub_m)) => trending()?,
        ("video", Some(sub_m)) => video(sub_m.value_of("id").unwrap_or_default())?,
        ("comments", Some(sub_m)) => comments(sub_m.value_of("id").unwrap_or_default())?,
        ("config", Some(_sub_m)) => show_config()?,
        _ => {
            return Err(anyhow::anyhow!("Unhandled subcommand"));
        }
    };

    Ok(())
}
