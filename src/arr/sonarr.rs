use super::client::ArrTransport;
use super::types::{
    decode_command, decode_list, decode_page, decode_total_records, EpisodeResource,
    SeriesResource,
};
use crate::candidates::{Episode, Show};
use crate::pagination::PAGE_SIZE;
use refresharr_common::{CommandId, EpisodeId, Error, Result, SeriesId};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Title and monitored state of a series, fetched on its own when an
/// episode record did not embed them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub title: String,
    pub monitored: bool,
}

/// Typed Sonarr v3 operations over an [`ArrTransport`]
#[derive(Clone)]
pub struct SonarrApi {
    transport: Arc<dyn ArrTransport>,
}

impl SonarrApi {
    pub fn new(transport: Arc<dyn ArrTransport>) -> Self {
        Self { transport }
    }

    pub async fn system_status(&self) -> Result<Value> {
        self.transport
            .request(Method::GET, "system/status", None)
            .await
    }

    /// All series in the library
    pub async fn series(&self) -> Result<Vec<Show>> {
        let value = self.transport.request(Method::GET, "series", None).await?;
        let series: Vec<SeriesResource> = decode_list(value, "series")?;
        tracing::debug!("Sonarr returned {} series", series.len());
        Ok(series.into_iter().map(Show::from).collect())
    }

    pub async fn series_by_id(&self, series_id: SeriesId) -> Result<SeriesSummary> {
        let value = self
            .transport
            .request(Method::GET, &format!("series/{}", series_id), None)
            .await?;
        let series: SeriesResource = serde_json::from_value(value).map_err(|e| {
            Error::malformed(format!("series {}: {}", series_id, e))
        })?;

        Ok(SeriesSummary {
            title: series.title.unwrap_or_else(|| "Unknown Series".to_string()),
            monitored: series.monitored,
        })
    }

    /// Episodes of one series
    pub async fn episodes(&self, series_id: SeriesId) -> Result<Vec<Episode>> {
        let value = self
            .transport
            .request(Method::GET, &format!("episode?seriesId={}", series_id), None)
            .await?;
        let episodes: Vec<EpisodeResource> = decode_list(value, "episode")?;
        Ok(episodes.into_iter().map(Episode::from).collect())
    }

    /// Probe `wanted/cutoff` with a single-record page to read its total
    pub async fn cutoff_unmet_total_records(&self) -> Result<i64> {
        let value = self
            .transport
            .request(Method::GET, "wanted/cutoff?page=1&pageSize=1", None)
            .await?;
        decode_total_records(&value)
    }

    /// One page of cutoff-unmet episodes, newest air date first
    pub async fn cutoff_unmet_page(&self, page: u32) -> Result<Vec<Episode>> {
        let endpoint = format!(
            "wanted/cutoff?sortKey=airDateUtc&sortDirection=descending\
             &includeSeriesInformation=true&page={}&pageSize={}",
            page, PAGE_SIZE
        );
        let value = self.transport.request(Method::GET, &endpoint, None).await?;
        let episodes: Vec<EpisodeResource> = decode_page(value, "cutoff-unmet episode")?;
        Ok(episodes.into_iter().map(Episode::from).collect())
    }

    pub async fn refresh_series(&self, series_id: SeriesId) -> Result<CommandId> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RefreshCommand {
            name: &'static str,
            series_id: SeriesId,
        }

        self.post_command(&RefreshCommand {
            name: "RefreshSeries",
            series_id,
        })
        .await
    }

    pub async fn episode_search(&self, episode_ids: &[EpisodeId]) -> Result<CommandId> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SearchCommand<'a> {
            name: &'static str,
            episode_ids: &'a [EpisodeId],
        }

        self.post_command(&SearchCommand {
            name: "EpisodeSearch",
            episode_ids,
        })
        .await
    }

    async fn post_command<T: Serialize>(&self, command: &T) -> Result<CommandId> {
        let body = serde_json::to_value(command)
            .map_err(|e| Error::malformed(e.to_string()))?;
        let value = self
            .transport
            .request(Method::POST, "command", Some(&body))
            .await?;
        decode_command(&value)
    }
}
