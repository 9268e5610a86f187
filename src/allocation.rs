//! Category-weighted selection under a fixed total budget.

use std::collections::BTreeMap;
use tracing::debug;

use crate::article::Article;
use crate::TARGET_DIGEST;

/// Per-category article counts for one digest.
pub type Ratio = BTreeMap<String, usize>;

/// Accepted articles per category, each bucket in score order.
pub type Selection = BTreeMap<String, Vec<Article>>;

/// Select at most `total` articles, distributed by `ratio`.
///
/// Candidates are ranked by score with a stable sort, so equal scores keep
/// their input order. A first walk fills each category up to its ratio; if
/// that leaves the digest short, a second walk over the same ranking adds
/// remaining articles to their own category until `total` is reached.
/// Categories missing from `ratio` are never selected.
pub fn allocate(articles: &[Article], ratio: &Ratio, total: usize) -> Selection {
    let mut ranked: Vec<&Article> = articles.iter().collect();
    ranked.sort_by(|a, b| b.total_score.cmp(&a.total_score));

    let mut buckets: BTreeMap<&str, Vec<&Article>> =
        ratio.keys().map(|c| (c.as_str(), Vec::new())).collect();
    let mut accepted = vec![false; ranked.len()];
    let mut selected = 0;

    for (idx, &article) in ranked.iter().enumerate() {
        if selected >= total {
            break;
        }
        let Some(&quota) = ratio.get(&article.category) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(article.category.as_str()) {
            if bucket.len() < quota {
                bucket.push(article);
                accepted[idx] = true;
                selected += 1;
            }
        }
    }

    if selected < total {
        debug!(target: TARGET_DIGEST, "First pass selected {} of {}, filling remaining slots", selected, total);
        for (idx, &article) in ranked.iter().enumerate() {
            if selected >= total {
                break;
            }
            if accepted[idx] {
                continue;
            }
            if let Some(bucket) = buckets.get_mut(article.category.as_str()) {
                bucket.push(article);
                accepted[idx] = true;
                selected += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(category, bucket)| {
            (
                category.to_string(),
                bucket.into_iter().cloned().collect(),
            )
        })
        .collect()
}

/// Total number of selected articles.
pub fn selection_len(selection: &Selection) -> usize {
    selection.values().map(Vec::len).sum()
}
