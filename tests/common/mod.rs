//! Shared test harness for integration tests.
//!
//! Provides [`FakeArr`], an in-memory stand-in for a Sonarr or Radarr v3 API
//! that answers the endpoints the hunter uses and logs every request, and
//! [`test_config`] for a config with no pacing delays.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use refresharr::arr::ArrTransport;
use refresharr::config::{ArrConfig, Config};
use refresharr_common::{Error, Result};
use reqwest::Method;
use serde_json::{json, Value};

/// A request received by [`FakeArr`]
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    series: Vec<Value>,
    episodes: HashMap<i64, Vec<Value>>,
    movies: Vec<Value>,
    cutoff_pages: Vec<Vec<Value>>,
    cutoff_total: i64,
    /// Series IDs whose RefreshSeries response has no command id
    refresh_without_id: HashSet<i64>,
    /// Entity IDs whose search command is rejected with a server error
    failing_searches: HashSet<i64>,
    /// `wanted/cutoff` page numbers answered with a server error
    failing_pages: HashSet<i64>,
    /// Every request fails as if the instance were unreachable
    offline: bool,
    next_command_id: i64,
    requests: Vec<Request>,
}

/// In-memory *arr API
#[derive(Default)]
pub struct FakeArr {
    state: Mutex<FakeState>,
}

impl FakeArr {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn transport(self: &Arc<Self>) -> Arc<dyn ArrTransport> {
        self.clone()
    }

    pub fn add_series(&self, id: i64, title: &str, monitored: bool, episodes: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        state
            .series
            .push(json!({ "id": id, "title": title, "monitored": monitored }));
        state.episodes.insert(id, episodes);
    }

    pub fn add_movie(&self, id: i64, title: &str, monitored: bool, has_file: bool) {
        self.state.lock().unwrap().movies.push(json!({
            "id": id,
            "title": title,
            "year": 2016,
            "monitored": monitored,
            "hasFile": has_file,
        }));
    }

    /// Serve `pages` from `wanted/cutoff`, reporting `total_records`
    pub fn set_cutoff_pages(&self, total_records: i64, pages: Vec<Vec<Value>>) {
        let mut state = self.state.lock().unwrap();
        state.cutoff_total = total_records;
        state.cutoff_pages = pages;
    }

    pub fn refresh_without_id(&self, series_id: i64) {
        self.state
            .lock()
            .unwrap()
            .refresh_without_id
            .insert(series_id);
    }

    pub fn fail_search(&self, id: i64) {
        self.state.lock().unwrap().failing_searches.insert(id);
    }

    pub fn fail_cutoff_page(&self, page: i64) {
        self.state.lock().unwrap().failing_pages.insert(page);
    }

    /// Page numbers requested from `wanted/cutoff`, excluding the record count request
    pub fn cutoff_pages_requested(&self) -> Vec<i64> {
        self.requests()
            .iter()
            .filter_map(|r| {
                let (path, query) = split_endpoint(&r.endpoint);
                if path != "wanted/cutoff" || query_i64(&query, "pageSize") == Some(1) {
                    return None;
                }
                query_i64(&query, "page")
            })
            .collect()
    }

    pub fn set_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn was_requested(&self, endpoint: &str) -> bool {
        self.requests().iter().any(|r| r.endpoint == endpoint)
    }

    /// Bodies of the accepted-or-not commands posted with `name`
    pub fn commands(&self, name: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.endpoint == "command")
            .filter_map(|r| r.body)
            .filter(|body| body["name"] == name)
            .collect()
    }

    /// `ids_field` of every `name` command, in the order they were posted
    pub fn command_ids(&self, name: &str, ids_field: &str) -> Vec<Vec<i64>> {
        self.commands(name)
            .iter()
            .map(|body| {
                body[ids_field]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn respond(state: &mut FakeState, method: &Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        if state.offline {
            return Err(Error::remote(format!("{} {}: connection refused", method, endpoint)));
        }
        let (path, query) = split_endpoint(endpoint);

        match (method.as_str(), path) {
            ("GET", "system/status") => Ok(json!({ "version": "4.0.0" })),
            ("GET", "series") => Ok(Value::Array(state.series.clone())),
            ("GET", "movie") => Ok(Value::Array(state.movies.clone())),
            ("GET", "episode") => {
                let series_id = query_i64(&query, "seriesId")
                    .ok_or_else(|| Error::remote("400 missing seriesId"))?;
                Ok(Value::Array(
                    state.episodes.get(&series_id).cloned().unwrap_or_default(),
                ))
            }
            ("GET", "wanted/cutoff") => {
                if query_i64(&query, "pageSize") == Some(1) {
                    return Ok(json!({ "page": 1, "totalRecords": state.cutoff_total, "records": [] }));
                }
                let page = query_i64(&query, "page").unwrap_or(1);
                if state.failing_pages.contains(&page) {
                    return Err(Error::remote(format!("GET {} returned 503 Service Unavailable", endpoint)));
                }
                let records = state
                    .cutoff_pages
                    .get((page - 1).max(0) as usize)
                    .cloned()
                    .unwrap_or_default();
                Ok(json!({ "page": page, "totalRecords": state.cutoff_total, "records": records }))
            }
            ("GET", path) if path.starts_with("series/") => {
                let id: i64 = path["series/".len()..]
                    .parse()
                    .map_err(|_| Error::remote("400 bad series id"))?;
                state
                    .series
                    .iter()
                    .find(|s| s["id"] == id)
                    .cloned()
                    .ok_or_else(|| Error::remote(format!("GET {} returned 404 Not Found", endpoint)))
            }
            ("POST", "command") => {
                let body = body.cloned().unwrap_or(Value::Null);
                let name = body["name"].as_str().unwrap_or_default().to_string();

                if name == "RefreshSeries" {
                    let series_id = body["seriesId"].as_i64().unwrap_or_default();
                    if state.refresh_without_id.contains(&series_id) {
                        return Ok(json!({ "name": name, "status": "queued" }));
                    }
                }
                let targets = body["episodeIds"]
                    .as_array()
                    .or_else(|| body["movieIds"].as_array())
                    .cloned()
                    .unwrap_or_default();
                if name.ends_with("Search")
                    && targets
                        .iter()
                        .filter_map(Value::as_i64)
                        .any(|id| state.failing_searches.contains(&id))
                {
                    return Err(Error::remote("POST command returned 500 Internal Server Error"));
                }

                state.next_command_id += 1;
                Ok(json!({ "id": state.next_command_id, "name": name, "status": "queued" }))
            }
            _ => Err(Error::remote(format!("{} {} returned 404 Not Found", method, endpoint))),
        }
    }
}

#[async_trait::async_trait]
impl ArrTransport for FakeArr {
    async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request {
            method: method.clone(),
            endpoint: endpoint.to_string(),
            body: body.cloned(),
        });
        Self::respond(&mut state, &method, endpoint, body)
    }
}

fn split_endpoint(endpoint: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = endpoint.split_once('?').unwrap_or((endpoint, ""));
    let query = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path, query)
}

fn query_i64(query: &HashMap<String, String>, key: &str) -> Option<i64> {
    query.get(key).and_then(|v| v.parse().ok())
}

/// An episode as returned by `episode?seriesId=`
pub fn episode(id: i64, series_id: i64, monitored: bool, has_file: bool) -> Value {
    json!({
        "id": id,
        "seriesId": series_id,
        "monitored": monitored,
        "hasFile": has_file,
        "seasonNumber": 1,
        "episodeNumber": id % 100,
        "title": format!("Episode {}", id),
    })
}

/// A cutoff-unmet episode with its series embedded
pub fn cutoff_episode(id: i64, series_id: i64, series_monitored: bool) -> Value {
    json!({
        "id": id,
        "seriesId": series_id,
        "monitored": true,
        "hasFile": true,
        "seasonNumber": 2,
        "episodeNumber": id % 100,
        "title": format!("Episode {}", id),
        "series": { "title": format!("Series {}", series_id), "monitored": series_monitored },
    })
}

/// A cutoff-unmet episode without series information
pub fn bare_cutoff_episode(id: i64, series_id: i64) -> Value {
    json!({
        "id": id,
        "seriesId": series_id,
        "monitored": true,
        "hasFile": true,
        "seasonNumber": 2,
        "episodeNumber": id % 100,
        "title": format!("Episode {}", id),
    })
}

/// A cutoff-unmet movie
pub fn cutoff_movie(id: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Movie {}", id),
        "year": 2000 + id,
        "monitored": true,
        "hasFile": true,
    })
}

/// Config with Sonarr and Radarr enabled, sequential selection and no
/// pacing delays, storing state under `state_dir`
pub fn test_config(state_dir: &Path, mode: &str) -> Config {
    let mut config = Config {
        sonarr: Some(ArrConfig::new("http://sonarr.test", "sonarr-key")),
        radarr: Some(ArrConfig::new("http://radarr.test", "radarr-key")),
        ..Config::default()
    };
    config.hunt.mode = mode.to_string();
    config.hunt.random_selection = false;
    config.hunt.refresh_delay_secs = 0;
    config.hunt.failure_delay_secs = 0;
    config.state.dir = state_dir.to_path_buf();
    config
}
