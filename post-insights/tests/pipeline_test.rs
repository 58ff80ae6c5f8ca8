use chrono::NaiveDate;
use post_insights::aggregators::round_one_decimal;
use post_insights::{
    analyze_posts, build_digest, filter_records, normalize_items, AnalysisOutcome, BatchCounts,
    FilterOptions, FilterPipeline, PostFormat, RawItem, Record, StatsAggregator, TopRanker,
    EXCERPT_CHARS, TOP_POSTS_LIMIT,
};
use serde_json::{json, Value};

fn items(values: Vec<Value>) -> Vec<RawItem> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().expect("fixture must be an object"))
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(day: u32, likes: u64, comments: u64, shares: u64, format: PostFormat) -> Record {
    Record {
        date: date(2024, 1, day),
        format,
        text: format!("post from day {}", day),
        likes,
        comments,
        shares,
        url: format!("https://www.facebook.com/page/posts/{}", day),
    }
}

fn options(max_count: usize) -> FilterOptions {
    FilterOptions {
        max_count,
        ..Default::default()
    }
}

fn expect_ready(outcome: AnalysisOutcome) -> (BatchCounts, post_insights::PostDigest) {
    match outcome {
        AnalysisOutcome::Ready { counts, digest } => (counts, digest),
        AnalysisOutcome::NoQualifyingPosts { counts } => {
            panic!("expected qualifying posts, got none ({:?})", counts)
        }
    }
}

#[test]
fn test_seven_item_batch() {
    let batch = items(vec![
        json!({ "time": "2024-02-07T09:00:00Z", "text": "first", "likes": 10 }),
        json!({ "text": "no date", "likes": 100 }),
        json!({ "time": "2024-02-06T09:00:00Z", "text": "second", "likes": "abc" }),
        json!({ "time": null, "text": "null date", "likes": 5 }),
        json!({ "time": "2024-02-05T09:00:00Z", "text": "third", "likes": 3 }),
        json!({ "time": "2024-02-04T09:00:00Z", "text": "fourth", "likes": 1 }),
        json!({ "time": "2024-02-03T09:00:00Z", "text": "fifth", "likes": 7 }),
    ]);

    let (counts, digest) = expect_ready(analyze_posts(&batch, &options(3)));

    assert_eq!(counts.raw_items, 7);
    assert_eq!(counts.missing_date, 2);
    assert_eq!(counts.invalid_date, 0);
    assert_eq!(counts.valid, 5);
    assert_eq!(counts.kept, 3);

    let texts: Vec<&str> = digest.posts.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(digest.posts[1].likes, 0, "non-numeric likes coerce to zero");
}

#[test]
fn test_limit_applies_after_quality_filter() {
    let batch = items(vec![
        json!({ "time": "2024-02-07T09:00:00Z", "text": "", "likes": 0 }),
        json!({ "time": "2024-02-06T09:00:00Z", "likes": 0, "attachments": [{ "type": "photo" }] }),
        json!({ "time": "2024-02-05T09:00:00Z" }),
        json!({ "time": "2024-02-04T09:00:00Z", "text": "survivor one" }),
        json!({ "time": "2024-02-03T09:00:00Z", "text": "", "likes": 12 }),
        json!({ "time": "2024-02-02T09:00:00Z", "text": "survivor three" }),
    ]);

    let (records, _) = normalize_items(&batch);
    let kept = filter_records(records, &options(2));

    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].text, "survivor one");
    assert_eq!(kept[1].likes, 12);
}

#[test]
fn test_date_bounds_are_inclusive_and_independent() {
    let records = vec![
        record(1, 5, 0, 0, PostFormat::TextOnly),
        record(5, 5, 0, 0, PostFormat::TextOnly),
        record(10, 5, 0, 0, PostFormat::TextOnly),
        record(15, 5, 0, 0, PostFormat::TextOnly),
    ];

    let both = FilterOptions {
        start_date: Some(date(2024, 1, 5)),
        end_date: Some(date(2024, 1, 10)),
        max_count: 10,
    };
    let kept = filter_records(records.clone(), &both);
    assert_eq!(kept.iter().map(|r| r.date).collect::<Vec<_>>(), vec![date(2024, 1, 5), date(2024, 1, 10)]);

    let start_only = FilterOptions {
        start_date: Some(date(2024, 1, 10)),
        ..options(10)
    };
    assert_eq!(filter_records(records.clone(), &start_only).len(), 2);

    let end_only = FilterOptions {
        end_date: Some(date(2024, 1, 1)),
        ..options(10)
    };
    assert_eq!(filter_records(records, &end_only).len(), 1);
}

#[test]
fn test_fewer_survivors_than_limit_and_zero_limit() {
    let records = vec![
        record(1, 5, 0, 0, PostFormat::TextOnly),
        record(2, 5, 0, 0, PostFormat::TextOnly),
    ];

    assert_eq!(filter_records(records.clone(), &options(5)).len(), 2);
    assert!(filter_records(records, &options(0)).is_empty());

    let batch = items(vec![json!({ "time": "2024-02-07T09:00:00Z", "text": "hello" })]);
    assert!(matches!(
        analyze_posts(&batch, &options(0)),
        AnalysisOutcome::NoQualifyingPosts { .. }
    ));
}

#[test]
fn test_filter_stage_order() {
    let pipeline = FilterPipeline::new(&options(5));
    assert_eq!(pipeline.stage_names(), vec!["date_range", "quality", "limit"]);
}

#[test]
fn test_empty_batch_has_no_data() {
    assert_eq!(StatsAggregator::summarize(&[]), None);
    assert_eq!(build_digest(Vec::new()), None);

    match analyze_posts(&[], &options(5)) {
        AnalysisOutcome::NoQualifyingPosts { counts } => assert_eq!(counts, BatchCounts::default()),
        AnalysisOutcome::Ready { .. } => panic!("empty batch cannot be ready"),
    }
}

#[test]
fn test_global_and_per_format_averages() {
    let records = vec![
        record(1, 10, 1, 0, PostFormat::Image),
        record(2, 20, 2, 0, PostFormat::Image),
        record(3, 33, 2, 1, PostFormat::Video),
    ];

    let stats = StatsAggregator::summarize(&records).expect("non-empty input has stats");
    assert_eq!(stats.total_posts, 3);
    assert_eq!(stats.averages.likes, 21.0);
    assert_eq!(stats.averages.comments, 1.7);
    assert_eq!(stats.averages.shares, 0.3);

    assert_eq!(stats.by_format.len(), 2);
    assert_eq!(stats.by_format[0].format, PostFormat::Image);
    assert_eq!(stats.by_format[0].count, 2);
    assert_eq!(stats.by_format[0].averages.likes, 15.0);
    assert_eq!(stats.by_format[0].averages.comments, 1.5);
    assert_eq!(stats.by_format[1].format, PostFormat::Video);
    assert_eq!(stats.by_format[1].averages.likes, 33.0);
}

#[test]
fn test_format_breakdown_ties_use_label_order() {
    let records = vec![
        record(1, 1, 0, 0, PostFormat::LinkShared),
        record(2, 1, 0, 0, PostFormat::TextOnly),
        record(3, 1, 0, 0, PostFormat::Reel),
        record(4, 1, 0, 0, PostFormat::TextOnly),
    ];

    let stats = StatsAggregator::summarize(&records).unwrap();
    let order: Vec<PostFormat> = stats.by_format.iter().map(|f| f.format).collect();
    assert_eq!(order, vec![PostFormat::TextOnly, PostFormat::Reel, PostFormat::LinkShared]);
}

#[test]
fn test_rounding_to_one_decimal() {
    assert_eq!(round_one_decimal(2.0 / 3.0), 0.7);
    assert_eq!(round_one_decimal(0.04), 0.0);
    assert_eq!(round_one_decimal(0.25), 0.3);
    assert_eq!(round_one_decimal(12.0), 12.0);
}

#[test]
fn test_top_posts_tie_goes_to_more_recent_date() {
    let records = vec![
        record(1, 50, 0, 0, PostFormat::TextOnly),
        record(3, 40, 10, 0, PostFormat::Image),
        record(2, 10, 0, 0, PostFormat::TextOnly),
        record(4, 3, 1, 1, PostFormat::Video),
    ];

    let top = TopRanker::rank(&records, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].engagement, 50);
    assert_eq!(top[1].engagement, 50);
    assert_eq!(top[0].date, date(2024, 1, 3));
    assert_eq!(top[1].date, date(2024, 1, 1));
}

#[test]
fn test_top_posts_same_day_ties_keep_filtered_order() {
    let mut first = record(7, 20, 0, 0, PostFormat::TextOnly);
    first.url = "first".to_string();
    let mut second = record(7, 10, 10, 0, PostFormat::TextOnly);
    second.url = "second".to_string();

    let top = TopRanker::rank(&[first, second], 10);
    assert_eq!(top[0].url, "first");
    assert_eq!(top[1].url, "second");
}

#[test]
fn test_top_posts_are_bounded_and_excerpted() {
    let mut records: Vec<Record> = (1..=12).map(|day| record(day, day as u64, 0, 0, PostFormat::TextOnly)).collect();
    records[11].text = format!("Line one\r\n\nLine two {}", "x".repeat(300));

    let top = TopRanker::rank(&records, TOP_POSTS_LIMIT);
    assert_eq!(top.len(), TOP_POSTS_LIMIT);
    assert_eq!(top[0].engagement, 12);
    assert!(top[0].excerpt.starts_with("Line one Line two x"));
    assert_eq!(top[0].excerpt.chars().count(), EXCERPT_CHARS);
    assert!(!top[0].excerpt.contains('\n'));
}

#[test]
fn test_repeated_runs_are_identical() {
    let batch = items(vec![
        json!({ "time": "2024-02-07T09:00:00Z", "text": "a", "likes": 5, "comments": 2, "isReel": true }),
        json!({ "time": "2024-02-06T09:00:00Z", "text": "b", "likes": 5, "comments": 2 }),
        json!({ "time": "2024-02-05T09:00:00Z", "likes": 9, "attachments": [{ "type": "photo" }] }),
        json!({ "time": "2024-02-04T09:00:00Z", "text": "d", "shares": "4" }),
    ]);
    let filters = FilterOptions {
        start_date: Some(date(2024, 2, 5)),
        end_date: None,
        max_count: 5,
    };

    let first = analyze_posts(&batch, &filters);
    let second = analyze_posts(&batch, &filters);
    assert_eq!(first, second);

    let (_, digest) = expect_ready(first);
    assert_eq!(digest.posts.len(), 3);
    assert_eq!(digest.top_posts[0].format, PostFormat::Image);
}
