//! Counting, filtering, and ranking touch events.

use std::collections::HashMap;

use churn_core::{ChurnRanking, ChurnRecord};

/// Minimum number of changes for a file to be reported when nothing is configured.
pub const DEFAULT_MINIMUM_CHURN_COUNT: u64 = 5;

/// Count how many times each path occurs in `events`.
///
/// # Examples
///
/// ```
/// use churn_pulse::aggregate::count_touches;
///
/// let counts = count_touches(["a.rb", "b.rb", "a.rb"]);
/// assert_eq!(counts["a.rb"], 2);
/// assert_eq!(counts["b.rb"], 1);
/// ```
pub fn count_touches<I, S>(events: I) -> HashMap<String, u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for event in events {
        let path = event.as_ref();
        match counts.get_mut(path) {
            Some(count) => *count += 1,
            None => {
                counts.insert(path.to_string(), 1);
            }
        }
    }
    counts
}

/// Build the churn ranking for a stream of touch events.
///
/// Paths changed fewer than `minimum_count` times are dropped. The result is
/// sorted by `times_changed` descending, then by `file_path` ascending, so the
/// same input always yields the same output.
///
/// # Examples
///
/// ```
/// use churn_pulse::aggregate::aggregate;
/// use churn_core::ChurnRecord;
///
/// let events = ["a.rb", "b.rb", "a.rb", "a.rb", "a.rb", "a.rb"];
/// assert_eq!(aggregate(events, 5), vec![ChurnRecord::new("a.rb", 5)]);
/// ```
pub fn aggregate<I, S>(events: I, minimum_count: u64) -> ChurnRanking
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranking: ChurnRanking = count_touches(events)
        .into_iter()
        .filter(|(_, count)| *count >= minimum_count)
        .map(|(file_path, times_changed)| ChurnRecord {
            file_path,
            times_changed,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.times_changed
            .cmp(&a.times_changed)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });

    ranking
}
