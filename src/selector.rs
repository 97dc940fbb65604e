//! Proportional batch selection.
//!
//! A batch is spread across (topic, subtopic) groups in proportion to group
//! size using largest-remainder rounding, sampled uniformly within each
//! group, then backfilled from the leftover pool when small groups cannot
//! cover their allocation. Returned ids are marked used for the tier.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::{Question, QuestionPool};
use crate::progression::Tier;

/// Select up to `batch_size` questions for `tier`, excluding `used` ids.
///
/// Guarantees: no duplicate ids, no id already in `used` before the call,
/// and at most `batch_size` items. The result is smaller than `batch_size`
/// only when the available pool for the tier is smaller. All returned ids
/// are added to `used`.
#[instrument(level = "debug", skip(pool, used, rng), fields(?tier, batch_size, used_before = used.len()))]
pub fn select_batch<R: Rng + ?Sized>(
    pool: &QuestionPool,
    tier: Tier,
    used: &mut HashSet<u32>,
    batch_size: usize,
    rng: &mut R,
) -> Vec<Question> {
    let available: Vec<&Question> = pool
        .iter()
        .filter(|q| tier.matches(&q.difficulty) && !used.contains(&q.id))
        .collect();
    if available.is_empty() || batch_size == 0 {
        return Vec::new();
    }

    // Partition by (topic, subtopic), preserving first-seen group order.
    let mut group_order: Vec<(&str, &str)> = Vec::new();
    let mut groups: HashMap<(&str, &str), Vec<&Question>> = HashMap::new();
    for q in &available {
        let key = (q.topic.as_str(), q.subtopic.as_str());
        if !groups.contains_key(&key) {
            group_order.push(key);
        }
        groups.entry(key).or_default().push(*q);
    }

    // Ideal share per group, floored; leftover slots go to the largest
    // fractional remainders (stable sort keeps first-seen order on ties).
    let total = available.len() as f64;
    let mut allocation: Vec<usize> = Vec::with_capacity(group_order.len());
    let mut fractions: Vec<f64> = Vec::with_capacity(group_order.len());
    for key in &group_order {
        let ideal = batch_size as f64 * groups[key].len() as f64 / total;
        allocation.push(ideal.floor() as usize);
        fractions.push(ideal - ideal.floor());
    }

    let mut remaining = batch_size.saturating_sub(allocation.iter().sum::<usize>());
    let mut by_fraction: Vec<usize> = (0..group_order.len()).collect();
    by_fraction.sort_by(|a, b| {
        fractions[*b]
            .partial_cmp(&fractions[*a])
            .unwrap_or(Ordering::Equal)
    });
    for idx in by_fraction {
        if remaining == 0 {
            break;
        }
        allocation[idx] += 1;
        remaining -= 1;
    }

    // Sample without replacement inside each group.
    let mut selected: Vec<&Question> = Vec::with_capacity(batch_size);
    let mut chosen: HashSet<u32> = HashSet::with_capacity(batch_size);
    for (idx, key) in group_order.iter().enumerate() {
        let group = &groups[key];
        let take = allocation[idx].min(group.len());
        for q in group.choose_multiple(rng, take) {
            selected.push(*q);
            chosen.insert(q.id);
        }
    }

    // Backfill shortfall uniformly from the unselected leftovers.
    if selected.len() < batch_size {
        let leftovers: Vec<&Question> = available
            .iter()
            .copied()
            .filter(|q| !chosen.contains(&q.id))
            .collect();
        let need = batch_size - selected.len();
        for q in leftovers.choose_multiple(rng, need) {
            selected.push(*q);
            chosen.insert(q.id);
        }
    }

    selected.truncate(batch_size);
    for q in &selected {
        used.insert(q.id);
    }
    debug!(target: "quiz", selected = selected.len(), used_after = used.len(), "Batch selected");
    selected.into_iter().cloned().collect()
}
