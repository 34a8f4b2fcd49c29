use refresharr_common::{CommandId, Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Sonarr `series` resource (only the fields we act on)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResource {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub monitored: bool,
}

/// Series object embedded in episode records when
/// `includeSeriesInformation=true` is requested
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedSeries {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub monitored: Option<bool>,
}

/// Sonarr `episode` resource, as returned by `episode` and `wanted/cutoff`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResource {
    pub id: i64,
    pub series_id: i64,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub season_number: i32,
    #[serde(default)]
    pub episode_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub series_title: Option<String>,
    #[serde(default)]
    pub series: Option<EmbeddedSeries>,
}

/// Radarr `movie` resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieResource {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
}

/// Decode a JSON array, dropping (and logging) records that do not fit `T`.
///
/// A single odd record must not hide the rest of the library, so only a
/// non-array body is an error.
pub fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(Error::malformed(format!("{} response is not a list", what)));
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping unreadable {} record: {}", what, e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            "Dropped {} of {} {} records that could not be decoded",
            total - decoded.len(),
            total,
            what
        );
    }

    Ok(decoded)
}

/// Decode the `records` array of a paging resource.
pub fn decode_page<T: DeserializeOwned>(mut value: Value, what: &str) -> Result<Vec<T>> {
    match value.get_mut("records").map(Value::take) {
        Some(records @ Value::Array(_)) => decode_list(records, what),
        _ => Err(Error::malformed(format!(
            "{} page has no records array",
            what
        ))),
    }
}

/// Read `totalRecords` from a paging resource.
pub fn decode_total_records(value: &Value) -> Result<i64> {
    value
        .get("totalRecords")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::malformed("paging response has no totalRecords"))
}

/// Read the command identifier from a `command` response.
pub fn decode_command(value: &Value) -> Result<CommandId> {
    value
        .get("id")
        .and_then(Value::as_i64)
        .map(CommandId::new)
        .ok_or_else(|| Error::malformed("command response has no id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_list_skips_bad_records() {
        let value = json!([
            {"id": 1, "title": "Andor", "monitored": true},
            {"title": "no id"},
            {"id": 3}
        ]);
        let series: Vec<SeriesResource> = decode_list(value, "series").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].title.as_deref(), Some("Andor"));
        assert!(!series[1].monitored);
    }

    #[test]
    fn test_decode_list_rejects_non_array() {
        let err = decode_list::<SeriesResource>(json!({"id": 1}), "series").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_page() {
        let value = json!({
            "page": 1,
            "totalRecords": 1,
            "records": [{
                "id": 10,
                "seriesId": 2,
                "monitored": true,
                "hasFile": true,
                "seasonNumber": 1,
                "episodeNumber": 4,
                "series": {"title": "Severance", "monitored": false}
            }]
        });
        let episodes: Vec<EpisodeResource> = decode_page(value, "cutoff").unwrap();
        assert_eq!(episodes.len(), 1);
        let series = episodes[0].series.as_ref().unwrap();
        assert_eq!(series.monitored, Some(false));

        assert!(decode_page::<EpisodeResource>(json!({"page": 1}), "cutoff").is_err());
    }

    #[test]
    fn test_decode_total_records() {
        assert_eq!(decode_total_records(&json!({"totalRecords": 450})).unwrap(), 450);
        assert!(decode_total_records(&json!({"records": []})).is_err());
        assert!(decode_total_records(&json!({"totalRecords": "many"})).is_err());
    }

    #[test]
    fn test_decode_command() {
        assert_eq!(
            decode_command(&json!({"id": 77, "name": "RefreshSeries"})).unwrap(),
            CommandId::new(77)
        );
        assert!(decode_command(&json!({"name": "RefreshSeries"})).is_err());
        assert!(decode_command(&Value::Null).is_err());
    }
}
