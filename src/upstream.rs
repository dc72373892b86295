use std::time::Duration;

use log::{debug, trace};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: attohttpc::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} returned no usable items")]
    Empty { url: String },
}

/// Connect and read timeouts for one outbound request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    const fn secs(connect: u64, read: u64) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(connect),
            read: Duration::from_secs(read),
        }
    }

    pub const MIRROR: Timeouts = Timeouts::secs(3, 8);
    pub const TRENDING: Timeouts = Timeouts::secs(2, 5);
    pub const VIDEO_INFO: Timeouts = Timeouts::secs(3, 10);
    pub const RESOLVER: Timeouts = Timeouts::secs(5, 10);
    pub const PRIMARY_API: Timeouts = Timeouts::secs(10, 10);
}

/// Which status codes count as an answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accept {
    /// Any 2xx
    Success,
    /// Exactly 200
    Ok,
}

/// Blocking JSON-over-HTTP client shared by every source
#[derive(Debug, Clone)]
pub struct Upstream {
    user_agent: String,
}

impl Upstream {
    pub fn new(user_agent: &str) -> Upstream {
        Upstream {
            user_agent: user_agent.into(),
        }
    }

    /// Single GET, no retries. `params` are appended as an urlencoded query string.
    pub fn get_json<T>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        timeouts: Timeouts,
        accept: Accept,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned + std::fmt::Debug,
    {
        debug!("Retrieving URL {} {:?}", url, params);
        let mut req = attohttpc::get(url)
            .header(attohttpc::header::USER_AGENT, self.user_agent.as_str())
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read);
        for &(k, v) in params {
            req = req.param(k, v);
        }

        let resp = req.send().map_err(|source| UpstreamError::Transport {
            url: url.into(),
            source,
        })?;

        let status = resp.status();
        let answered = match accept {
            Accept::Success => status.is_success(),
            Accept::Ok => status.as_u16() == 200,
        };
        if !answered {
            return Err(UpstreamError::Status {
                url: url.into(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().map_err(|source| UpstreamError::Transport {
            url: url.into(),
            source,
        })?;
        trace!("Raw response: {}", &text);
        let data: T = serde_json::from_str(&text).map_err(|source| UpstreamError::Parse {
            url: url.into(),
            source,
        })?;
        trace!("Raw deserialisation: {:?}", &data);
        Ok(data)
    }
}
