//! Keyword sentiment and relevance scoring for news headlines.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use tradebot_market_data::NewsItem;

use super::market_data_constants::*;
use super::market_data_model::{MarketNews, NewsCategory, ScoredNews};

/// Sentiment of a headline in [-1, 1] from keyword counts; 0 when no
/// keyword matches.
pub fn sentiment_score(title: &str) -> f64 {
    let title = title.to_lowercase();
    let positive = POSITIVE_KEYWORDS
        .iter()
        .filter(|w| title.contains(*w))
        .count() as f64;
    let negative = NEGATIVE_KEYWORDS
        .iter()
        .filter(|w| title.contains(*w))
        .count() as f64;

    let total = positive + negative;
    if total == 0.0 {
        return 0.0;
    }
    ((positive - negative) / total).clamp(-1.0, 1.0)
}

/// `exp(-age_hours / 24)` clamped to [0.1, 1]; 0.5 when the publish time
/// is unknown.
pub fn time_decay_weight(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(published) = published else {
        return UNKNOWN_TIME_WEIGHT;
    };
    let age_hours = (now - published).num_seconds() as f64 / 3600.0;
    (-age_hours / NEWS_DECAY_HOURS)
        .exp()
        .clamp(MIN_TIME_WEIGHT, MAX_TIME_WEIGHT)
}

pub fn source_quality(publisher: &str) -> f64 {
    if TRUSTED_PUBLISHERS.contains(&publisher) {
        TRUSTED_SOURCE_QUALITY
    } else {
        OTHER_SOURCE_QUALITY
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score one article, scaling its relevance by `boost`. Returns the
/// unrounded relevance alongside for ranking.
fn score_item(item: NewsItem, now: DateTime<Utc>, boost: f64) -> (f64, ScoredNews) {
    let time_weight = time_decay_weight(item.published, now);
    let quality = source_quality(&item.publisher);
    let relevance = time_weight * quality * boost;
    let summary: String = item.summary.chars().take(NEWS_SUMMARY_MAX_CHARS).collect();
    (
        relevance,
        ScoredNews {
            sentiment_score: round2(sentiment_score(&item.title)),
            time_weight: round2(time_weight),
            source_quality: quality,
            relevance_score: round2(relevance),
            title: item.title,
            publisher: item.publisher,
            link: item.link,
            published: item.published,
            summary,
        },
    )
}

/// Score raw articles and keep the most relevant ones.
pub fn score_news(items: Vec<NewsItem>, now: DateTime<Utc>) -> Vec<ScoredNews> {
    let mut scored: Vec<(f64, ScoredNews)> = items
        .into_iter()
        .map(|item| score_item(item, now, 1.0))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(NEWS_LIMIT)
        .map(|(_, news)| news)
        .collect()
}

/// Classify a headline by the first matching keyword group, checked in
/// order: Fed, macro, corporate, geopolitical.
pub fn categorize_market_news(title: &str) -> NewsCategory {
    let title = title.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

    if matches(FED_KEYWORDS) {
        NewsCategory::FedCentralBank
    } else if matches(MACRO_KEYWORDS) {
        NewsCategory::MacroData
    } else if matches(CORPORATE_KEYWORDS) {
        NewsCategory::CorporateCatalyst
    } else if matches(GEOPOLITICAL_KEYWORDS) {
        NewsCategory::Geopolitical
    } else {
        NewsCategory::GeneralMarket
    }
}

/// Score market-wide headlines, boosting high-impact categories.
///
/// Duplicate titles (case-insensitive) keep their first occurrence. The
/// result holds at most [`MARKET_NEWS_LIMIT`] items, most relevant first.
pub fn score_market_news(items: Vec<NewsItem>, now: DateTime<Utc>) -> Vec<MarketNews> {
    let mut seen = HashSet::new();
    let mut scored: Vec<(f64, MarketNews)> = items
        .into_iter()
        .filter(|item| seen.insert(item.title.to_lowercase()))
        .map(|item| {
            let category = categorize_market_news(&item.title);
            let boost = if category.is_high_impact() {
                HIGH_IMPACT_MULTIPLIER
            } else {
                1.0
            };
            let (relevance, news) = score_item(item, now, boost);
            (relevance, MarketNews { news, category })
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MARKET_NEWS_LIMIT)
        .map(|(_, news)| news)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 15, 0, 0).unwrap()
    }

    fn item(title: &str, publisher: &str, age_hours: Option<i64>) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            publisher: publisher.to_string(),
            link: format!("https://news.example/{}", title.len()),
            published: age_hours.map(|h| now() - Duration::hours(h)),
            summary: String::new(),
        }
    }

    #[test]
    fn test_sentiment_score() {
        assert_eq!(sentiment_score("Shares surge after earnings beat"), 1.0);
        assert_eq!(sentiment_score("Stock plunges on lawsuit"), -1.0);
        assert_eq!(sentiment_score("Company holds annual meeting"), 0.0);
        // "rally" and "concern" cancel out
        assert_eq!(sentiment_score("Rally fades amid concern"), 0.0);
    }

    #[test]
    fn test_time_decay_weight() {
        assert_eq!(time_decay_weight(None, now()), 0.5);
        assert_eq!(time_decay_weight(Some(now()), now()), 1.0);

        let day_old = time_decay_weight(Some(now() - Duration::hours(24)), now());
        assert!((day_old - (-1.0f64).exp()).abs() < 1e-9);

        let week_old = time_decay_weight(Some(now() - Duration::days(7)), now());
        assert_eq!(week_old, 0.1);

        // Future timestamps clamp to the maximum
        assert_eq!(time_decay_weight(Some(now() + Duration::hours(2)), now()), 1.0);
    }

    #[test]
    fn test_source_quality() {
        assert_eq!(source_quality("Reuters"), 1.0);
        assert_eq!(source_quality("Some Blog"), 0.7);
    }

    #[test]
    fn test_score_news_orders_by_relevance() {
        let items = vec![
            item("Old trusted story", "Reuters", Some(48)),
            item("Fresh blog post", "Some Blog", Some(0)),
            item("Fresh trusted story", "Bloomberg", Some(0)),
            item("Undated story", "Reuters", None),
        ];

        let scored = score_news(items, now());
        let titles: Vec<&str> = scored.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Fresh trusted story",
                "Fresh blog post",
                "Undated story",
                "Old trusted story"
            ]
        );
        assert_eq!(scored[0].relevance_score, 1.0);
        assert_eq!(scored[1].relevance_score, 0.7);
    }

    #[test]
    fn test_score_news_keeps_top_ten() {
        let items = (0..15)
            .map(|i| item(&format!("Story {}", i), "Reuters", Some(i)))
            .collect();

        let scored = score_news(items, now());
        assert_eq!(scored.len(), 10);
        assert_eq!(scored[0].title, "Story 0");
        assert_eq!(scored[9].title, "Story 9");
    }

    #[test]
    fn test_categorize_market_news() {
        assert_eq!(
            categorize_market_news("Powell signals patience on rates"),
            NewsCategory::FedCentralBank
        );
        assert_eq!(
            categorize_market_news("CPI comes in hotter than expected"),
            NewsCategory::MacroData
        );
        assert_eq!(
            categorize_market_news("Chipmaker raises guidance"),
            NewsCategory::CorporateCatalyst
        );
        assert_eq!(
            categorize_market_news("New tariff threat rattles exporters"),
            NewsCategory::Geopolitical
        );
        assert_eq!(
            categorize_market_news("Stocks drift in quiet session"),
            NewsCategory::GeneralMarket
        );
        // Fed keywords win over macro ones
        assert_eq!(
            categorize_market_news("FOMC minutes show inflation worries"),
            NewsCategory::FedCentralBank
        );
    }

    #[test]
    fn test_market_news_boosts_high_impact() {
        let items = vec![
            item("Stocks drift in quiet session", "Reuters", Some(0)),
            item("Fed holds interest rate steady", "Some Blog", Some(0)),
        ];

        let scored = score_market_news(items, now());
        assert_eq!(scored[0].category, NewsCategory::FedCentralBank);
        assert_eq!(scored[0].news.relevance_score, 1.05);
        assert_eq!(scored[1].category, NewsCategory::GeneralMarket);
        assert_eq!(scored[1].news.relevance_score, 1.0);
    }

    #[test]
    fn test_market_news_dedups_titles() {
        let items = vec![
            item("Stocks Drift In Quiet Session", "Reuters", Some(1)),
            item("stocks drift in quiet session", "Bloomberg", Some(0)),
            item("Oil slips", "CNBC", Some(2)),
        ];

        let scored = score_market_news(items, now());
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].news.title, "Stocks Drift In Quiet Session");
        assert_eq!(scored[0].news.publisher, "Reuters");
    }

    #[test]
    fn test_market_news_keeps_top_fifteen() {
        let items = (0..40)
            .map(|i| item(&format!("Headline {}", i), "Reuters", Some(i)))
            .collect();

        let scored = score_market_news(items, now());
        assert_eq!(scored.len(), 15);
        assert_eq!(scored[0].news.title, "Headline 0");
        assert_eq!(scored[14].news.title, "Headline 14");
    }
}
