use super::{mark_processed, refresh_then_search, ActionOutcome, HuntContext};
use crate::arr::sonarr::SeriesSummary;
use crate::arr::SonarrApi;
use crate::candidates::{Candidate, Eligibility, Episode};
use crate::pagination::{probe_total_pages, PageWalker};
use crate::selection::{select, Quota};
use crate::state::ProcessedStore;
use refresharr_common::{EpisodeId, Result, SeriesId, WorkCategory};
use std::collections::{HashMap, HashSet};

/// Search the missing, monitored episodes of up to `max_missing` shows.
///
/// Shows are recorded by series ID once their search was accepted.
pub(super) async fn hunt_missing(
    api: &SonarrApi,
    store: &mut ProcessedStore,
    ctx: &mut HuntContext<'_>,
) -> Result<usize> {
    tracing::info!("=== Checking for Missing Episodes ===");

    let shows = match api.series().await {
        Ok(shows) => shows,
        Err(e) if e.is_transient() => {
            tracing::error!("Unable to retrieve series data from Sonarr: {}", e);
            return Ok(0);
        }
        Err(e) => return Err(e),
    };

    let monitored_only = ctx.hunt.monitored_only;
    if monitored_only {
        tracing::info!("MONITORED_ONLY=true => only fully monitored shows.");
    } else {
        tracing::info!("MONITORED_ONLY=false => all shows, even if unmonitored.");
    }

    let candidates: Vec<Candidate> = shows.into_iter().map(Candidate::Show).collect();
    if candidates.is_empty() {
        tracing::info!("No shows to process.");
        return Ok(0);
    }

    let quota = ctx.hunt.missing_quota();
    let processed = store.snapshot();
    let selection = select(
        &candidates,
        &processed,
        Quota::Unlimited,
        ctx.hunt.order(),
        &mut *ctx.rng,
        |c| !c.eligibility(WorkCategory::Missing, monitored_only).is_ineligible(),
    );

    let mut searched = 0;
    for candidate in selection {
        if quota.is_reached(searched) {
            break;
        }
        let Candidate::Show(show) = candidate else {
            continue;
        };

        let episodes = match api.episodes(show.id).await {
            Ok(episodes) => episodes,
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    "Could not retrieve episodes for series ID={}, skipping: {}",
                    show.id,
                    e
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        let show = show.clone().with_episodes(episodes);
        let missing: Vec<EpisodeId> = show.missing_monitored_episodes().map(|e| e.id).collect();
        let title = show.title.clone();
        let series_id = show.id;

        if let Eligibility::Ineligible(reason) =
            Candidate::Show(show).eligibility(WorkCategory::Missing, monitored_only)
        {
            tracing::info!("Skipping '{}': {}", title, reason);
            continue;
        }

        tracing::info!(
            "Found {} missing monitored episode(s) for '{}'.",
            missing.len(),
            title
        );

        let outcome = refresh_then_search(
            &format!("'{}' (series ID {})", title, series_id),
            &ctx.pacing,
            api.refresh_series(series_id),
            api.episode_search(&missing),
        )
        .await?;

        if let ActionOutcome::Searched(_) = outcome {
            mark_processed(store, series_id.get());
            searched += 1;
            tracing::info!(
                "Processed {}/{} missing shows this cycle.",
                searched,
                quota
            );
        }
    }

    Ok(searched)
}

/// Search cutoff-unmet episodes one at a time, up to `max_upgrades`.
pub(super) async fn hunt_upgrades(
    api: &SonarrApi,
    store: &mut ProcessedStore,
    ctx: &mut HuntContext<'_>,
) -> Result<usize> {
    tracing::info!("=== Checking for Quality Upgrades (Cutoff Unmet) ===");

    let total_pages = match probe_total_pages(|| api.cutoff_unmet_total_records()).await {
        Ok(pages) => pages,
        Err(e) if e.is_transient() => {
            tracing::error!("Unable to count cutoff-unmet episodes in Sonarr: {}", e);
            return Ok(0);
        }
        Err(e) => return Err(e),
    };
    if total_pages == 0 {
        tracing::info!("No episodes found that need quality upgrades.");
        return Ok(0);
    }
    tracing::info!(
        "Found {} total pages of episodes that need quality upgrades.",
        total_pages
    );

    let quota = ctx.hunt.upgrade_quota();
    let monitored_only = ctx.hunt.monitored_only;
    let order = ctx.hunt.order();
    let mut walker = PageWalker::new(total_pages, order);
    let mut series_cache = SeriesCache::default();
    // Episodes taken from a page this walk, whatever their outcome; a
    // revisited page only counts episodes not tried yet
    let mut attempted: HashSet<i64> = HashSet::new();
    let mut searched = 0;

    while !quota.is_reached(searched) {
        let Some(page) = walker.next_page(&mut *ctx.rng) else {
            break;
        };

        tracing::info!(
            "Retrieving cutoff-unmet episodes (page={} of {})...",
            page,
            total_pages
        );
        let episodes = match api.cutoff_unmet_page(page).await {
            Ok(episodes) => episodes,
            Err(e) if e.is_transient() => {
                tracing::error!(
                    "Unable to retrieve cutoff-unmet data from Sonarr on page {}: {}",
                    page,
                    e
                );
                break;
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            "Found {} episodes on page {} that need quality upgrades.",
            episodes.len(),
            page
        );

        let candidates: Vec<Candidate> = episodes.into_iter().map(Candidate::Episode).collect();
        let mut excluded = store.snapshot();
        excluded.extend(&attempted);
        let selection = select(
            &candidates,
            &excluded,
            Quota::Unlimited,
            order,
            &mut *ctx.rng,
            |c| !c.eligibility(WorkCategory::Upgrade, monitored_only).is_ineligible(),
        );

        let mut fresh = 0;
        for candidate in selection {
            if quota.is_reached(searched) {
                break;
            }
            let Candidate::Episode(episode) = candidate else {
                continue;
            };
            attempted.insert(episode.id.get());

            let mut episode = episode.clone();
            if episode.series_title.is_none()
                || (monitored_only && episode.series_monitored.is_none())
            {
                series_cache.fill(api, &mut episode).await;
            }

            let episode_id = episode.id;
            let series_id = episode.series_id;
            let candidate = Candidate::Episode(episode);
            match candidate.eligibility(WorkCategory::Upgrade, monitored_only) {
                Eligibility::Eligible => {}
                Eligibility::Ineligible(reason) => {
                    tracing::info!("Skipping {}: {}", candidate, reason);
                    continue;
                }
                Eligibility::Deferred(_) => {
                    tracing::info!(
                        "Skipping {}: series monitored state unavailable",
                        candidate
                    );
                    continue;
                }
            }
            fresh += 1;

            tracing::info!(
                "Processing upgrade for {} (Episode ID: {})",
                candidate,
                episode_id
            );
            let outcome = refresh_then_search(
                &format!("episode {} of series {}", episode_id, series_id),
                &ctx.pacing,
                api.refresh_series(series_id),
                api.episode_search(&[episode_id]),
            )
            .await?;

            if let ActionOutcome::Searched(_) = outcome {
                mark_processed(store, episode_id.get());
                searched += 1;
                tracing::info!(
                    "Processed {}/{} upgrade episodes this cycle.",
                    searched,
                    quota
                );
            }
        }

        walker.record_yield(fresh);
        if walker.is_dry() {
            tracing::info!("Recent pages held nothing new to upgrade, stopping.");
        }
    }

    if quota.is_reached(searched) {
        tracing::info!("Reached MAX_UPGRADES={} for this cycle.", quota);
    }
    tracing::info!(
        "Completed processing {} upgrade episodes for this cycle.",
        searched
    );
    Ok(searched)
}

/// Series records fetched during one upgrade hunt, for episodes whose
/// records did not embed their series
#[derive(Default)]
struct SeriesCache {
    /// `None` marks a fetch that failed; it is not retried this cycle and
    /// the series counts as unmonitored
    entries: HashMap<SeriesId, Option<SeriesSummary>>,
}

impl SeriesCache {
    async fn fill(&mut self, api: &SonarrApi, episode: &mut Episode) {
        let summary = match self.entries.get(&episode.series_id) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = match api.series_by_id(episode.series_id).await {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        tracing::warn!(
                            "Could not retrieve series {} for episode {}: {}",
                            episode.series_id,
                            episode.id,
                            e
                        );
                        None
                    }
                };
                self.entries.insert(episode.series_id, fetched.clone());
                fetched
            }
        };

        match summary {
            Some(summary) => {
                episode.series_title.get_or_insert(summary.title);
                episode.series_monitored.get_or_insert(summary.monitored);
            }
            None => {
                episode
                    .series_title
                    .get_or_insert_with(|| "Unknown Series".to_string());
                episode.series_monitored.get_or_insert(false);
            }
        }
    }
}
