use crate::types::{FilterOptions, Record};
use chrono::NaiveDate;
use tracing::debug;

/// One step of the filter pipeline
pub trait FilterStage {
    /// Get the name of this stage
    fn stage_name(&self) -> &'static str;

    /// Keep the records this stage accepts, preserving their order
    fn apply(&self, records: Vec<Record>) -> Vec<Record>;
}

/// Drops records dated outside the inclusive `[start, end]` range. Either
/// bound may be absent.
pub struct DateRangeStage {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRangeStage {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

impl FilterStage for DateRangeStage {
    fn stage_name(&self) -> &'static str {
        "date_range"
    }

    fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.start.is_none() && self.end.is_none() {
            return records;
        }

        records
            .into_iter()
            .filter(|record| self.contains(record.date))
            .collect()
    }
}

/// Drops records with neither text nor likes.
pub struct QualityStage;

impl FilterStage for QualityStage {
    fn stage_name(&self) -> &'static str {
        "quality"
    }

    fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(Record::has_content).collect()
    }
}

/// Keeps the first `max_count` records in arrival order.
pub struct LimitStage {
    max_count: usize,
}

impl LimitStage {
    pub fn new(max_count: usize) -> Self {
        Self { max_count }
    }
}

impl FilterStage for LimitStage {
    fn stage_name(&self) -> &'static str {
        "limit"
    }

    fn apply(&self, mut records: Vec<Record>) -> Vec<Record> {
        records.truncate(self.max_count);
        records
    }
}

/// Date range, then quality, then count limit. The limit counts only records
/// that passed the earlier stages.
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    pub fn new(options: &FilterOptions) -> Self {
        Self {
            stages: vec![
                Box::new(DateRangeStage::new(options.start_date, options.end_date)),
                Box::new(QualityStage),
                Box::new(LimitStage::new(options.max_count)),
            ],
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.stage_name()).collect()
    }

    pub fn run(&self, records: Vec<Record>) -> Vec<Record> {
        self.stages.iter().fold(records, |records, stage| {
            let before = records.len();
            let kept = stage.apply(records);
            debug!(
                stage = stage.stage_name(),
                kept = kept.len(),
                dropped = before - kept.len(),
                "Filter stage applied"
            );
            kept
        })
    }
}

/// Run the standard filter pipeline over classified records.
pub fn filter_records(records: Vec<Record>, options: &FilterOptions) -> Vec<Record> {
    FilterPipeline::new(options).run(records)
}
