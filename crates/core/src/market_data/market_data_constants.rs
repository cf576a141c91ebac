/// Cache key prefixes; keys are `{prefix}{TICKER}`.
pub const MARKET_DATA_KEY_PREFIX: &str = "market_data:";
pub const QUOTE_KEY_PREFIX: &str = "quote:";
pub const NEWS_KEY_PREFIX: &str = "news:";

/// Cache key for the broad market news feed.
pub const MARKET_NEWS_KEY: &str = "market_news:broad";

/// Index symbols whose headlines make up the market news feed: S&P 500,
/// Dow, NASDAQ and VIX.
pub const MARKET_NEWS_INDICES: [&str; 4] = ["^GSPC", "^DJI", "^IXIC", "^VIX"];

/// Headlines taken from each index before deduplication.
pub const MARKET_NEWS_PER_INDEX: usize = 10;

/// Number of market news items kept after ranking.
pub const MARKET_NEWS_LIMIT: usize = 15;

/// Relevance multiplier for Fed and macro headlines.
pub const HIGH_IMPACT_MULTIPLIER: f64 = 1.5;

/// Longest accepted ticker symbol.
pub const MAX_TICKER_LEN: usize = 6;

/// Number of scored news items kept per ticker.
pub const NEWS_LIMIT: usize = 10;

/// Summaries are cut to this many characters.
pub const NEWS_SUMMARY_MAX_CHARS: usize = 200;

/// Source quality weights.
pub const TRUSTED_SOURCE_QUALITY: f64 = 1.0;
pub const OTHER_SOURCE_QUALITY: f64 = 0.7;

/// Time-decay weight bounds, and the weight used when the publish time is
/// unknown.
pub const MIN_TIME_WEIGHT: f64 = 0.1;
pub const MAX_TIME_WEIGHT: f64 = 1.0;
pub const UNKNOWN_TIME_WEIGHT: f64 = 0.5;

/// Decay constant for news age, in hours.
pub const NEWS_DECAY_HOURS: f64 = 24.0;

pub const TRUSTED_PUBLISHERS: &[&str] = &[
    "Reuters",
    "Bloomberg",
    "The Wall Street Journal",
    "Financial Times",
    "CNBC",
    "MarketWatch",
    "Barron's",
    "Seeking Alpha",
    "The Motley Fool",
    "Yahoo Finance",
    "Benzinga",
    "Zacks",
    "InvestorPlace",
];

pub const POSITIVE_KEYWORDS: &[&str] = &[
    "surge",
    "soar",
    "jump",
    "rally",
    "gain",
    "rise",
    "up",
    "high",
    "record",
    "beat",
    "exceed",
    "strong",
    "growth",
    "profit",
    "upgrade",
    "bullish",
    "breakthrough",
    "partnership",
    "acquisition",
    "innovation",
    "success",
    "positive",
    "outperform",
    "boost",
    "momentum",
    "advance",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "plunge",
    "crash",
    "fall",
    "drop",
    "decline",
    "down",
    "low",
    "loss",
    "miss",
    "weak",
    "concern",
    "worry",
    "risk",
    "downgrade",
    "bearish",
    "warning",
    "cut",
    "slash",
    "investigation",
    "lawsuit",
    "failure",
    "negative",
    "underperform",
    "tumble",
    "slump",
    "retreat",
];

pub const FED_KEYWORDS: &[&str] = &[
    "fed",
    "federal reserve",
    "fomc",
    "powell",
    "interest rate",
    "rate decision",
    "central bank",
    "monetary policy",
    "rate cut",
    "rate hike",
];

pub const MACRO_KEYWORDS: &[&str] = &[
    "jobs report",
    "unemployment",
    "nonfarm payroll",
    "nfp",
    "cpi",
    "inflation",
    "ppi",
    "gdp",
    "retail sales",
    "consumer",
    "pce",
    "housing starts",
    "jobless claims",
    "economic data",
];

pub const CORPORATE_KEYWORDS: &[&str] = &[
    "earnings",
    "guidance",
    "fda approval",
    "merger",
    "acquisition",
    "m&a",
    "buyout",
    "ipo",
    "analyst upgrade",
    "analyst downgrade",
    "revenue",
    "profit",
    "eps",
    "miss",
    "beat",
];

pub const GEOPOLITICAL_KEYWORDS: &[&str] = &[
    "china",
    "russia",
    "war",
    "tariff",
    "trade war",
    "sanction",
    "geopolit",
    "military",
    "conflict",
    "treaty",
    "trade deal",
    "regulation",
    "antitrust",
    "investigation",
];
