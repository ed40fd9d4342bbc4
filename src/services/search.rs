//! Search and analytics: keyword ranking, view rate, hotspot detection
//!
//! Ranking is computed in process over a full catalog scan, matching the
//! observed behavior exactly: case-insensitive substring occurrences summed
//! over title, description and owner name for every term, ordered by score
//! then by distinct-watcher count. Scoring, sorting, pagination and the
//! hotspot bucketing are pure functions so the contract is testable without
//! a database.

use std::collections::BTreeSet;

use sqlx::PgPool;
use tracing::warn;

use crate::auth;
use crate::domain::videos::SearchRow;
use crate::domain::{danmu, videos, watch};
use crate::error::{ServiceError, ServiceResult};
use crate::models::Credentials;

pub struct SearchService {
    db: PgPool,
}

/// Non-overlapping, case-insensitive substring occurrences of `term_lower`
/// (already lowercased) in `text`.
fn count_occurrences(text: &str, term_lower: &str) -> usize {
    if term_lower.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(term_lower).count()
}

/// Total match count for one video across all fields and all terms.
/// Repeated occurrences and repeated terms all add to the score.
fn score_row(row: &SearchRow, terms_lower: &[String]) -> usize {
    terms_lower
        .iter()
        .map(|term| {
            count_occurrences(&row.title, term)
                + count_occurrences(&row.description, term)
                + row
                    .owner_name
                    .as_deref()
                    .map_or(0, |name| count_occurrences(name, term))
        })
        .sum()
}

/// Order bvs by descending score, ties by descending view count. Sort is
/// stable, so residual ties keep their scan order.
fn rank(mut scored: Vec<(String, usize, i64)>) -> Vec<String> {
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)));
    scored.into_iter().map(|(bv, _, _)| bv).collect()
}

/// 1-based pagination. Invalid parameters (non-positive page size, page
/// start past the end) yield an empty page, never an error.
fn paginate<T: Clone>(items: &[T], page_size: i32, page_num: i32) -> Vec<T> {
    if page_size <= 0 {
        return Vec::new();
    }
    let start = (page_num as i64 - 1) * page_size as i64;
    if start < 0 || start > items.len() as i64 {
        return Vec::new();
    }
    let start = start as usize;
    let end = usize::min(start + page_size as usize, items.len());
    items[start..end].to_vec()
}

/// Average fraction of the video watched: sum(watch_time) / (duration * n).
/// None when nobody has watched it.
fn average_rate(duration: f64, watch_times: &[f64]) -> Option<f64> {
    if watch_times.is_empty() {
        return None;
    }
    let sum: f64 = watch_times.iter().sum();
    Some(sum / (duration * watch_times.len() as f64))
}

/// Peak comment-density buckets. `[0, duration)` splits into fixed 10-second
/// buckets (`floor(duration / 10) + 1` of them); every danmu increments
/// bucket `floor(time / 10)`. When every bucket holds the same count -
/// including the all-zero case - there is no distinguishable peak and the
/// result is empty. Otherwise all buckets at the maximum are returned.
fn hotspot_buckets(duration: f64, times: &[f64]) -> BTreeSet<usize> {
    let bucket_count = (duration / 10.0).floor() as usize + 1;
    let mut counts = vec![0usize; bucket_count];
    for &time in times {
        let idx = (time / 10.0).floor() as usize;
        if idx < bucket_count {
            counts[idx] += 1;
        }
    }

    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    if max == min {
        return BTreeSet::new();
    }
    counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == max)
        .map(|(i, _)| i)
        .collect()
}

impl SearchService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Keyword search over title, description and owner name. Blank keywords
    /// fail validation; pagination problems yield an empty page.
    pub async fn search_video(
        &self,
        creds: &Credentials,
        keywords: &str,
        page_size: i32,
        page_num: i32,
    ) -> ServiceResult<Vec<String>> {
        auth::authenticate(&self.db, creds).await?;
        if keywords.trim().is_empty() {
            warn!("search rejected: blank keywords");
            return Err(ServiceError::ValidationFailed("keywords are blank"));
        }

        let terms_lower: Vec<String> = keywords
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let rows = videos::list_for_search(&self.db).await?;
        let mut scored: Vec<(String, usize, i64)> = Vec::new();
        for row in &rows {
            let score = score_row(row, &terms_lower);
            if score == 0 {
                continue;
            }
            let views = watch::view_count(&self.db, &row.bv).await?;
            scored.push((row.bv.clone(), score, views));
        }

        let ranked = rank(scored);
        Ok(paginate(&ranked, page_size, page_num))
    }

    /// Average fraction of the video watched across all watch records.
    pub async fn get_average_view_rate(&self, bv: &str) -> ServiceResult<f64> {
        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let times = watch::watch_times(&self.db, bv).await?;
        average_rate(video.duration, &times).ok_or_else(|| {
            warn!(bv, "average view rate unavailable: no watch records");
            ServiceError::NotFound
        })
    }

    /// Indices of the 10-second chunks with the highest danmu density.
    pub async fn get_hotspot(&self, bv: &str) -> ServiceResult<BTreeSet<usize>> {
        let video = videos::get_video(&self.db, bv)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let times = danmu::times_for_video(&self.db, bv).await?;
        Ok(hotspot_buckets(video.duration, &times))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bv: &str, title: &str, description: &str, owner: &str) -> SearchRow {
        SearchRow {
            bv: bv.into(),
            title: title.into(),
            description: description.into(),
            owner_name: Some(owner.into()),
        }
    }

    #[test]
    fn occurrences_are_case_insensitive_and_repeated() {
        assert_eq!(count_occurrences("Cat cat CAT", "cat"), 3);
        assert_eq!(count_occurrences("concatenate", "cat"), 1);
        assert_eq!(count_occurrences("dog", "cat"), 0);
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn score_sums_fields_and_terms() {
        let video = row("a", "cat videos", "a cat compilation", "catlady");
        // one term, three fields
        assert_eq!(score_row(&video, &["cat".into()]), 3);
        // a repeated term doubles the score
        assert_eq!(score_row(&video, &["cat".into(), "cat".into()]), 6);
        // unmatched terms add nothing
        assert_eq!(score_row(&video, &["cat".into(), "dog".into()]), 3);
    }

    #[test]
    fn equal_scores_break_ties_by_view_count() {
        // A: "cat" twice in the title; B: "cat" and "Cat" in the description.
        let a = row("a", "cat cat", "", "alice");
        let b = row("b", "", "cat and Cat", "bob");
        let terms = vec!["cat".to_string()];
        let score_a = score_row(&a, &terms);
        let score_b = score_row(&b, &terms);
        assert_eq!(score_a, 2);
        assert_eq!(score_b, 2);

        let ranked = rank(vec![("a".into(), score_a, 10), ("b".into(), score_b, 25)]);
        assert_eq!(ranked, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn zero_score_videos_never_rank() {
        // service filters score == 0 before ranking; rank itself keeps order
        let ranked = rank(vec![("x".into(), 3, 0), ("y".into(), 1, 99)]);
        assert_eq!(ranked, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn pagination_is_one_based_and_forgiving() {
        let items = vec!["a", "b", "c", "d"];
        assert_eq!(paginate(&items, 2, 1), vec!["a", "b"]);
        assert_eq!(paginate(&items, 2, 2), vec!["c", "d"]);
        assert_eq!(paginate(&items, 3, 2), vec!["d"]);
        // invalid parameters give an empty page, never an error
        assert!(paginate(&items, 0, 1).is_empty());
        assert!(paginate(&items, 2, 0).is_empty());
        assert!(paginate(&items, 2, 4).is_empty());
        assert!(paginate(&items, -1, 1).is_empty());
    }

    #[test]
    fn average_rate_is_watched_fraction() {
        assert_eq!(average_rate(100.0, &[50.0, 100.0]), Some(0.75));
        assert_eq!(average_rate(100.0, &[]), None);
    }

    #[test]
    fn hotspot_finds_peak_bucket() {
        // duration 95 -> 10 buckets; three danmus in bucket 0 dominate
        let peaks = hotspot_buckets(95.0, &[5.0, 5.0, 5.0, 12.0, 87.0]);
        assert_eq!(peaks, BTreeSet::from([0]));
    }

    #[test]
    fn hotspot_with_no_danmus_is_empty() {
        assert!(hotspot_buckets(95.0, &[]).is_empty());
    }

    #[test]
    fn hotspot_with_uniform_density_is_empty() {
        // one danmu in each of the two buckets: no distinguishable peak
        assert!(hotspot_buckets(15.0, &[3.0, 12.0]).is_empty());
    }

    #[test]
    fn hotspot_reports_all_tied_peaks() {
        // buckets 0 and 2 each hold two danmus, bucket 1 holds one
        let peaks = hotspot_buckets(25.0, &[1.0, 2.0, 11.0, 21.0, 22.0]);
        assert_eq!(peaks, BTreeSet::from([0, 2]));
    }
}
