use crate::aggregators::StatsAggregator;
use crate::types::{PostDigest, Record, TopPost, EXCERPT_CHARS, TOP_POSTS_LIMIT};
use crate::utils::text;
use std::cmp::Reverse;
use tracing::debug;

/// Selects the best-performing posts by engagement.
pub struct TopRanker;

impl TopRanker {
    /// Highest-engagement records first, at most `limit` of them.
    ///
    /// Equal engagement goes to the more recent post; posts from the same
    /// day keep their filtered order.
    pub fn rank(records: &[Record], limit: usize) -> Vec<TopPost> {
        let mut indexed: Vec<(usize, &Record, u64)> = records
            .iter()
            .enumerate()
            .map(|(index, record)| (index, record, record.engagement()))
            .collect();

        indexed.sort_by_key(|(index, record, engagement)| (Reverse(*engagement), Reverse(record.date), *index));

        indexed
            .into_iter()
            .take(limit)
            .map(|(_, record, engagement)| TopPost {
                date: record.date,
                format: record.format,
                excerpt: text::excerpt(&record.text, EXCERPT_CHARS),
                likes: record.likes,
                comments: record.comments,
                shares: record.shares,
                engagement,
                url: record.url.clone(),
            })
            .collect()
    }
}

/// Stats and top posts for a filtered batch. `None` when the batch is empty.
pub fn build_digest(records: Vec<Record>) -> Option<PostDigest> {
    let stats = StatsAggregator::summarize(&records)?;
    let top_posts = TopRanker::rank(&records, TOP_POSTS_LIMIT);

    debug!("Built digest with {} top posts out of {}", top_posts.len(), records.len());

    Some(PostDigest {
        stats,
        top_posts,
        posts: records,
    })
}
