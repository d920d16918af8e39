use pulse_core::NewsArticle;
use std::collections::HashSet;

/// Headlines older than this many entries are ignored per scoring pass
const MAX_ARTICLES: usize = 20;

/// Analyst grades that count toward the buy ratio
const BUY_GRADES: &[&str] = &["buy", "strong buy", "outperform", "overweight"];

/// Keyword sentiment scorer for news headlines.
pub struct SentimentEngine {
    positive_words: Vec<&'static str>,
    negative_words: Vec<&'static str>,
}

impl Default for SentimentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentEngine {
    pub fn new() -> Self {
        Self {
            positive_words: vec![
                "surge", "soar", "jump", "gain", "rise", "rally", "bull",
                "upgrade", "beat", "strong", "growth", "record", "high",
            ],
            negative_words: vec![
                "fall", "drop", "plunge", "crash", "bear", "downgrade",
                "miss", "weak", "loss", "decline", "low", "concern",
            ],
        }
    }

    /// Net keyword hits for one headline. None when no keyword matched;
    /// such headlines are excluded from the average rather than diluting it.
    fn score_headline(&self, title: &str) -> Option<i32> {
        let title_lower = title.to_lowercase();
        let words: HashSet<&str> = title_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let pos = self.positive_words.iter().filter(|w| words.contains(**w)).count() as i32;
        let neg = self.negative_words.iter().filter(|w| words.contains(**w)).count() as i32;

        if pos == 0 && neg == 0 {
            None
        } else {
            Some(pos - neg)
        }
    }

    /// Score a single article on the [-1, 1] scale. None when no keyword
    /// matched its headline.
    pub fn score_article(&self, article: &NewsArticle) -> Option<f64> {
        self.score_headline(&article.title)
            .map(|s| (s as f64).clamp(-1.0, 1.0))
    }

    /// Average headline score clamped to [-1, 1]. None when nothing scored.
    pub fn score_news(&self, articles: &[NewsArticle]) -> Option<f64> {
        let mut total = 0i32;
        let mut scored = 0usize;

        for article in articles.iter().take(MAX_ARTICLES) {
            if let Some(score) = self.score_headline(&article.title) {
                total += score;
                scored += 1;
            }
        }

        if scored == 0 {
            return None;
        }

        let normalized = total as f64 / scored as f64;
        Some((normalized.clamp(-1.0, 1.0) * 100.0).round() / 100.0)
    }
}

/// Share of recent analyst grades that read as a buy, as a percentage.
/// None when there are no grades to count.
pub fn analyst_buy_ratio(grades: &[String]) -> Option<f64> {
    if grades.is_empty() {
        return None;
    }

    let buys = grades
        .iter()
        .filter(|g| {
            let grade = g.to_lowercase();
            BUY_GRADES.iter().any(|b| grade.contains(b))
        })
        .count();

    Some(((buys as f64 / grades.len() as f64) * 10000.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            source: None,
            url: None,
            published_at: Utc::now(),
            tickers: vec![],
        }
    }

    #[test]
    fn test_positive_headline() {
        let engine = SentimentEngine::new();
        let score = engine.score_news(&[article("Shares surge to record high after earnings beat")]);
        assert_eq!(score, Some(1.0));
    }

    #[test]
    fn test_negative_headline() {
        let engine = SentimentEngine::new();
        let score = engine.score_news(&[article("Stock plunges on weak guidance, analysts downgrade")]);
        assert_eq!(score, Some(-1.0));
    }

    #[test]
    fn test_neutral_headlines_are_skipped() {
        let engine = SentimentEngine::new();
        // No keywords at all => no signal, not zero
        assert_eq!(engine.score_news(&[article("Company announces quarterly report date")]), None);

        // One scored headline among unscored ones carries the average alone
        let score = engine.score_news(&[
            article("Company announces quarterly report date"),
            article("Shares rally on upgrade"),
        ]);
        assert_eq!(score, Some(1.0));
    }

    #[test]
    fn test_mixed_headlines_average_and_clamp() {
        let engine = SentimentEngine::new();
        let score = engine
            .score_news(&[
                article("Shares gain on strong growth"),
                article("Earnings miss sparks concern over decline"),
            ])
            .unwrap();
        // (+3 - 3) / 2 = 0
        assert_eq!(score, 0.0);

        let score = engine
            .score_news(&[article("surge soar jump gain rise rally")])
            .unwrap();
        assert_eq!(score, 1.0); // clamped
    }

    #[test]
    fn test_keyword_requires_whole_word() {
        let engine = SentimentEngine::new();
        // "lowest" must not match "low"
        assert_eq!(engine.score_news(&[article("Rates at their lowest since 2020")]), None);
    }

    #[test]
    fn test_score_article_clamps_to_unit_range() {
        let engine = SentimentEngine::new();
        assert_eq!(engine.score_article(&article("Shares surge and rally")), Some(1.0));
        assert_eq!(engine.score_article(&article("Earnings miss")), Some(-1.0));
        assert_eq!(engine.score_article(&article("Board meeting scheduled")), None);
    }

    #[test]
    fn test_analyst_buy_ratio() {
        let grades = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(analyst_buy_ratio(&[]), None);
        assert_eq!(
            analyst_buy_ratio(&grades(&["Buy", "Strong Buy", "Hold", "Sell"])),
            Some(50.0)
        );
        assert_eq!(
            analyst_buy_ratio(&grades(&["Overweight", "Outperform"])),
            Some(100.0)
        );
        assert_eq!(analyst_buy_ratio(&grades(&["Hold", "Underperform"])), Some(0.0));
    }
}
