use crate::types::{EngagementAverages, FormatStats, PostFormat, Record, StatsSummary};
use std::collections::HashMap;
use tracing::debug;

/// Exact engagement totals for a group of records.
#[derive(Debug, Clone, Copy, Default)]
struct EngagementTotals {
    count: usize,
    likes: u64,
    comments: u64,
    shares: u64,
}

impl EngagementTotals {
    fn add(&mut self, record: &Record) {
        self.count += 1;
        self.likes = self.likes.saturating_add(record.likes);
        self.comments = self.comments.saturating_add(record.comments);
        self.shares = self.shares.saturating_add(record.shares);
    }

    /// Caller guarantees `count > 0`.
    fn averages(&self) -> EngagementAverages {
        let count = self.count as f64;
        EngagementAverages {
            likes: round_one_decimal(self.likes as f64 / count),
            comments: round_one_decimal(self.comments as f64 / count),
            shares: round_one_decimal(self.shares as f64 / count),
        }
    }
}

/// Computes global and per-format engagement averages.
pub struct StatsAggregator;

impl StatsAggregator {
    /// `None` when there are no records, which is the "no data" case.
    pub fn summarize(records: &[Record]) -> Option<StatsSummary> {
        if records.is_empty() {
            debug!("No records to summarize");
            return None;
        }

        let mut overall = EngagementTotals::default();
        let mut per_format: HashMap<PostFormat, EngagementTotals> = HashMap::new();

        for record in records {
            overall.add(record);
            per_format.entry(record.format).or_default().add(record);
        }

        let mut by_format: Vec<(PostFormat, EngagementTotals)> = per_format.into_iter().collect();
        // PostFormat's Ord follows declaration order, which breaks count ties
        by_format.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));

        let by_format = by_format
            .into_iter()
            .map(|(format, totals)| FormatStats {
                format,
                count: totals.count,
                averages: totals.averages(),
            })
            .collect::<Vec<_>>();

        debug!(
            total = overall.count,
            formats = by_format.len(),
            "Summarized engagement"
        );

        Some(StatsSummary {
            total_posts: overall.count,
            averages: overall.averages(),
            by_format,
        })
    }
}

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
