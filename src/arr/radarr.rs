use super::client::ArrTransport;
use super::types::{decode_command, decode_list, decode_page, decode_total_records, MovieResource};
use crate::candidates::Movie;
use crate::pagination::PAGE_SIZE;
use refresharr_common::{CommandId, Error, MovieId, Result};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Typed Radarr v3 operations over an [`ArrTransport`]
#[derive(Clone)]
pub struct RadarrApi {
    transport: Arc<dyn ArrTransport>,
}

impl RadarrApi {
    pub fn new(transport: Arc<dyn ArrTransport>) -> Self {
        Self { transport }
    }

    pub async fn system_status(&self) -> Result<Value> {
        self.transport
            .request(Method::GET, "system/status", None)
            .await
    }

    /// All movies in the library
    pub async fn movies(&self) -> Result<Vec<Movie>> {
        let value = self.transport.request(Method::GET, "movie", None).await?;
        let movies: Vec<MovieResource> = decode_list(value, "movie")?;
        tracing::debug!("Radarr returned {} movies", movies.len());
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    pub async fn cutoff_unmet_total_records(&self) -> Result<i64> {
        let value = self
            .transport
            .request(Method::GET, "wanted/cutoff?page=1&pageSize=1", None)
            .await?;
        decode_total_records(&value)
    }

    pub async fn cutoff_unmet_page(&self, page: u32) -> Result<Vec<Movie>> {
        let endpoint = format!(
            "wanted/cutoff?sortKey=movieMetadata.sortTitle&sortDirection=ascending\
             &page={}&pageSize={}",
            page, PAGE_SIZE
        );
        let value = self.transport.request(Method::GET, &endpoint, None).await?;
        let movies: Vec<MovieResource> = decode_page(value, "cutoff-unmet movie")?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    pub async fn refresh_movie(&self, movie_id: MovieId) -> Result<CommandId> {
        self.post_command(&MoviesCommand {
            name: "RefreshMovie",
            movie_ids: vec![movie_id],
        })
        .await
    }

    pub async fn movies_search(&self, movie_ids: &[MovieId]) -> Result<CommandId> {
        self.post_command(&MoviesCommand {
            name: "MoviesSearch",
            movie_ids: movie_ids.to_vec(),
        })
        .await
    }

    async fn post_command(&self, command: &MoviesCommand) -> Result<CommandId> {
        let body = serde_json::to_value(command).map_err(|e| Error::malformed(e.to_string()))?;
        let value = self
            .transport
            .request(Method::POST, "command", Some(&body))
            .await?;
        decode_command(&value)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoviesCommand {
    name: &'static str,
    movie_ids: Vec<MovieId>,
}
