//! Page walking over paginated cutoff-unmet listings.

use rand::Rng;
use refresharr_common::{Result, SelectionOrder};
use std::future::Future;

/// Records per page requested from `wanted/cutoff`
pub const PAGE_SIZE: u32 = 200;

/// Number of pages needed to hold `total_records`; zero means no work.
pub fn total_pages(total_records: i64) -> u32 {
    if total_records < 1 {
        return 0;
    }
    let pages = (total_records as u64).div_ceil(PAGE_SIZE as u64);
    pages.clamp(1, u32::MAX as u64) as u32
}

/// Run the single-record probe and turn its `totalRecords` into a page count
pub async fn probe_total_pages<F, Fut>(probe: F) -> Result<u32>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<i64>>,
{
    Ok(total_pages(probe().await?))
}

/// Chooses the next page to fetch.
///
/// Sequential walks `1..=total_pages` once. Randomized samples pages with
/// replacement until the caller stops asking, or until a run of pages in a
/// row produced nothing new (`dry_limit`), which means the listing has been
/// worked through.
#[derive(Debug, Clone)]
pub struct PageWalker {
    total_pages: u32,
    order: SelectionOrder,
    next_sequential: u32,
    dry_streak: u32,
    dry_limit: u32,
}

impl PageWalker {
    pub fn new(total_pages: u32, order: SelectionOrder) -> Self {
        Self {
            total_pages,
            order,
            next_sequential: 1,
            dry_streak: 0,
            dry_limit: total_pages.saturating_mul(3).max(3),
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn next_page<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u32> {
        if self.total_pages == 0 {
            return None;
        }

        match self.order {
            SelectionOrder::Sequential => {
                if self.next_sequential > self.total_pages {
                    return None;
                }
                let page = self.next_sequential;
                self.next_sequential += 1;
                Some(page)
            }
            SelectionOrder::Randomized => {
                if self.is_dry() {
                    return None;
                }
                Some(rng.gen_range(1..=self.total_pages))
            }
        }
    }

    /// Report how many new eligible candidates the last page offered.
    pub fn record_yield(&mut self, fresh: usize) {
        if fresh == 0 {
            self.dry_streak += 1;
        } else {
            self.dry_streak = 0;
        }
    }

    /// The randomized walk has stopped finding anything new.
    pub fn is_dry(&self) -> bool {
        self.order == SelectionOrder::Randomized && self.dry_streak >= self.dry_limit
    }
}
