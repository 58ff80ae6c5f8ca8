use crate::classifier::FormatClassifier;
use crate::digest::build_digest;
use crate::parser::RecordValidator;
use crate::processing::FilterPipeline;
use crate::types::{AnalysisOutcome, BatchCounts, FilterOptions, RawItem, Record, ValidationError};
use tracing::{debug, info};

/// Validate and classify every item, dropping the ones without a usable date.
pub fn normalize_items(items: &[RawItem]) -> (Vec<Record>, BatchCounts) {
    let mut counts = BatchCounts {
        raw_items: items.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(items.len());

    for (position, item) in items.iter().enumerate() {
        match RecordValidator::validate(item) {
            Ok(record) => records.push(FormatClassifier::apply(record, item)),
            Err(ValidationError::MissingDate) => {
                debug!(position, "Dropping item without a date");
                counts.missing_date += 1;
            }
            Err(ValidationError::InvalidDate(raw)) => {
                debug!(position, raw = %raw, "Dropping item with unparseable date");
                counts.invalid_date += 1;
            }
        }
    }

    counts.valid = records.len();
    (records, counts)
}

/// Raw scrape batch to digest: validate, classify, filter, then summarize
/// and rank.
pub fn analyze_posts(items: &[RawItem], options: &FilterOptions) -> AnalysisOutcome {
    let (records, mut counts) = normalize_items(items);

    let filtered = FilterPipeline::new(options).run(records);
    counts.kept = filtered.len();

    info!(
        raw = counts.raw_items,
        valid = counts.valid,
        kept = counts.kept,
        "Normalized scraped posts"
    );

    match build_digest(filtered) {
        Some(digest) => AnalysisOutcome::Ready { counts, digest },
        None => AnalysisOutcome::NoQualifyingPosts { counts },
    }
}
