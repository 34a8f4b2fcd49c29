use super::{mark_processed, refresh_then_search, ActionOutcome, HuntContext};
use crate::arr::RadarrApi;
use crate::candidates::Candidate;
use crate::pagination::{probe_total_pages, PageWalker};
use crate::selection::{select, Quota};
use crate::state::ProcessedStore;
use refresharr_common::{Result, WorkCategory};
use std::collections::HashSet;

/// Search monitored movies without a file, up to `max_missing`.
pub(super) async fn hunt_missing(
    api: &RadarrApi,
    store: &mut ProcessedStore,
    ctx: &mut HuntContext<'_>,
) -> Result<usize> {
    tracing::info!("=== Checking for Missing Movies ===");

    let movies = match api.movies().await {
        Ok(movies) => movies,
        Err(e) if e.is_transient() => {
            tracing::error!("Unable to retrieve movie data from Radarr: {}", e);
            return Ok(0);
        }
        Err(e) => return Err(e),
    };

    let candidates: Vec<Candidate> = movies.into_iter().map(Candidate::Movie).collect();
    if candidates.is_empty() {
        tracing::info!("No movies to process.");
        return Ok(0);
    }

    let quota = ctx.hunt.missing_quota();
    let monitored_only = ctx.hunt.monitored_only;
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
        let Candidate::Movie(movie) = candidate else {
            continue;
        };

        tracing::info!("Processing missing movie {} (Movie ID: {})", candidate, movie.id);
        let outcome = refresh_then_search(
            &format!("movie {}", movie.id),
            &ctx.pacing,
            api.refresh_movie(movie.id),
            api.movies_search(&[movie.id]),
        )
        .await?;

        if let ActionOutcome::Searched(_) = outcome {
            mark_processed(store, movie.id.get());
            searched += 1;
            tracing::info!("Processed {}/{} missing movies this cycle.", searched, quota);
        }
    }

    if searched == 0 {
        tracing::info!("No missing movies were searched this cycle.");
    }
    Ok(searched)
}

/// Search cutoff-unmet movies one at a time, up to `max_upgrades`.
pub(super) async fn hunt_upgrades(
    api: &RadarrApi,
    store: &mut ProcessedStore,
    ctx: &mut HuntContext<'_>,
) -> Result<usize> {
    tracing::info!("=== Checking for Movie Quality Upgrades (Cutoff Unmet) ===");

    let total_pages = match probe_total_pages(|| api.cutoff_unmet_total_records()).await {
        Ok(pages) => pages,
        Err(e) if e.is_transient() => {
            tracing::error!("Unable to count cutoff-unmet movies in Radarr: {}", e);
            return Ok(0);
        }
        Err(e) => return Err(e),
    };
    if total_pages == 0 {
        tracing::info!("No movies found that need quality upgrades.");
        return Ok(0);
    }
    tracing::info!(
        "Found {} total pages of movies that need quality upgrades.",
        total_pages
    );

    let quota = ctx.hunt.upgrade_quota();
    let monitored_only = ctx.hunt.monitored_only;
    let order = ctx.hunt.order();
    let mut walker = PageWalker::new(total_pages, order);
    let mut attempted: HashSet<i64> = HashSet::new();
    let mut searched = 0;

    while !quota.is_reached(searched) {
        let Some(page) = walker.next_page(&mut *ctx.rng) else {
            break;
        };

        tracing::info!(
            "Retrieving cutoff-unmet movies (page={} of {})...",
            page,
            total_pages
        );
        let movies = match api.cutoff_unmet_page(page).await {
            Ok(movies) => movies,
            Err(e) if e.is_transient() => {
                tracing::error!(
                    "Unable to retrieve cutoff-unmet data from Radarr on page {}: {}",
                    page,
                    e
                );
                break;
            }
            Err(e) => return Err(e),
        };

        let candidates: Vec<Candidate> = movies.into_iter().map(Candidate::Movie).collect();
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
            let Candidate::Movie(movie) = candidate else {
                continue;
            };
            attempted.insert(movie.id.get());
            fresh += 1;

            tracing::info!("Processing upgrade for {} (Movie ID: {})", candidate, movie.id);
            let outcome = refresh_then_search(
                &format!("movie {}", movie.id),
                &ctx.pacing,
                api.refresh_movie(movie.id),
                api.movies_search(&[movie.id]),
            )
            .await?;

            if let ActionOutcome::Searched(_) = outcome {
                mark_processed(store, movie.id.get());
                searched += 1;
                tracing::info!(
                    "Processed {}/{} upgrade movies this cycle.",
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

    tracing::info!(
        "Completed processing {} upgrade movies for this cycle.",
        searched
    );
    Ok(searched)
}
