//! View analytics: request metadata capture and the owner dashboard rollup.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use reqwest::Url;
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::page_view::NewPageView;
use crate::models::portfolio::PortfolioRow;
use crate::store::page_views;

pub const WINDOW_DAYS: u64 = 7;
const DIRECT: &str = "direct";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyViews {
    pub date: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReferrerCount {
    pub source: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DeviceBreakdown {
    pub mobile: i64,
    pub desktop: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse {
    pub total_views: i64,
    pub view_count: i32,
    pub daily_views: Vec<DailyViews>,
    pub referrers: Vec<ReferrerCount>,
    pub devices: DeviceBreakdown,
    pub slug: String,
    pub is_published: bool,
}

/// Builds the page-view record for one public request.
pub fn page_view_from_headers(referer: Option<&str>, user_agent: Option<&str>) -> NewPageView {
    NewPageView {
        referrer: referrer_host(referer),
        user_agent: user_agent
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .map(str::to_string),
    }
}

/// Hostname of a `Referer` header without a leading `www.`; `direct` when
/// absent or unparseable.
pub fn referrer_host(referer: Option<&str>) -> String {
    referer
        .and_then(|raw| Url::parse(raw.trim()).ok())
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DIRECT.to_string())
}

/// Groups a stored referrer host under a display source.
pub fn classify_referrer(referrer: &str) -> String {
    let host = referrer.trim().to_lowercase();
    let is_host = |name: &str| host == name || host.ends_with(&format!(".{name}"));

    if host.is_empty() || host == DIRECT {
        "Direct".to_string()
    } else if host.contains("linkedin") {
        "LinkedIn".to_string()
    } else if host.contains("twitter") || is_host("t.co") || is_host("x.com") {
        "Twitter/X".to_string()
    } else if host.contains("github") {
        "GitHub".to_string()
    } else if host.contains("google") {
        "Google".to_string()
    } else {
        host
    }
}

pub fn is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_lowercase();
    ["mobile", "android", "iphone", "ipad"]
        .iter()
        .any(|marker| ua.contains(marker))
}

/// First instant of the analytics window: midnight UTC six days before `today`.
pub fn window_start(today: NaiveDate) -> DateTime<Utc> {
    let first = today
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(today);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Exactly `WINDOW_DAYS` buckets ending at `today`, oldest first.
pub fn daily_buckets(today: NaiveDate, counts: &[(NaiveDate, i64)]) -> Vec<DailyViews> {
    let by_day: HashMap<NaiveDate, i64> = counts.iter().copied().collect();
    (0..WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| DailyViews {
            date: day.format("%Y-%m-%d").to_string(),
            views: by_day.get(&day).copied().unwrap_or(0),
        })
        .collect()
}

/// Counts per classified source, highest first, ties by name.
pub fn referrer_breakdown(counts: &[(Option<String>, i64)]) -> Vec<ReferrerCount> {
    let mut by_source: HashMap<String, i64> = HashMap::new();
    for (referrer, count) in counts {
        let source = classify_referrer(referrer.as_deref().unwrap_or(""));
        *by_source.entry(source).or_insert(0) += count;
    }

    let mut referrers: Vec<ReferrerCount> = by_source
        .into_iter()
        .map(|(source, count)| ReferrerCount { source, count })
        .collect();
    referrers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
    referrers
}

pub fn device_breakdown(counts: &[(Option<String>, i64)]) -> DeviceBreakdown {
    counts
        .iter()
        .fold(DeviceBreakdown::default(), |mut devices, (ua, count)| {
            if ua.as_deref().is_some_and(is_mobile) {
                devices.mobile += count;
            } else {
                devices.desktop += count;
            }
            devices
        })
}

/// Owner dashboard for `portfolio` as of `now`.
pub async fn build_analytics(
    pool: &PgPool,
    portfolio: &PortfolioRow,
    now: DateTime<Utc>,
) -> Result<AnalyticsResponse, AppError> {
    let today = now.date_naive();
    let daily = page_views::daily_counts(pool, portfolio.id, window_start(today)).await?;
    let referrers = page_views::referrer_counts(pool, portfolio.id).await?;
    let agents = page_views::user_agent_counts(pool, portfolio.id).await?;
    let total_views = page_views::count_for_portfolio(pool, portfolio.id).await?;

    Ok(AnalyticsResponse {
        total_views,
        view_count: portfolio.view_count,
        daily_views: daily_buckets(today, &daily),
        referrers: referrer_breakdown(&referrers),
        devices: device_breakdown(&agents),
        slug: portfolio.slug.clone(),
        is_published: portfolio.is_published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_views_gives_seven_zero_buckets() {
        let buckets = daily_buckets(date(2025, 3, 2), &[]);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.views == 0));
        assert_eq!(buckets[0].date, "2025-02-24");
        assert_eq!(buckets[6].date, "2025-03-02");
    }

    #[test]
    fn test_buckets_fill_known_days_only() {
        let counts = vec![(date(2025, 3, 2), 4), (date(2025, 2, 26), 1), (date(2025, 2, 1), 9)];
        let buckets = daily_buckets(date(2025, 3, 2), &counts);
        let views: Vec<i64> = buckets.iter().map(|b| b.views).collect();
        assert_eq!(views, vec![0, 0, 1, 0, 0, 0, 4]);
    }

    #[test]
    fn test_window_start_is_midnight_six_days_back() {
        let start = window_start(date(2025, 3, 2));
        assert_eq!(start.to_rfc3339(), "2025-02-24T00:00:00+00:00");
    }

    #[test]
    fn test_referrer_host_strips_www() {
        assert_eq!(
            referrer_host(Some("https://www.linkedin.com/feed/")),
            "linkedin.com"
        );
        assert_eq!(referrer_host(Some("https://news.ycombinator.com/item?id=1")), "news.ycombinator.com");
        assert_eq!(referrer_host(None), "direct");
        assert_eq!(referrer_host(Some("not a url")), "direct");
    }

    #[test]
    fn test_classify_known_sources() {
        assert_eq!(classify_referrer("linkedin.com"), "LinkedIn");
        assert_eq!(classify_referrer("lnkd.linkedin.com"), "LinkedIn");
        assert_eq!(classify_referrer("twitter.com"), "Twitter/X");
        assert_eq!(classify_referrer("t.co"), "Twitter/X");
        assert_eq!(classify_referrer("x.com"), "Twitter/X");
        assert_eq!(classify_referrer("github.com"), "GitHub");
        assert_eq!(classify_referrer("google.com"), "Google");
        assert_eq!(classify_referrer("direct"), "Direct");
        assert_eq!(classify_referrer(""), "Direct");
        assert_eq!(classify_referrer("dev.to"), "dev.to");
    }

    #[test]
    fn test_classify_does_not_match_lookalike_hosts() {
        assert_eq!(classify_referrer("netflix.com"), "netflix.com");
        assert_eq!(classify_referrer("text.com"), "text.com");
    }

    #[test]
    fn test_referrer_breakdown_groups_and_sorts() {
        let counts = vec![
            (Some("t.co".to_string()), 2),
            (Some("twitter.com".to_string()), 1),
            (None, 3),
            (Some("direct".to_string()), 1),
            (Some("dev.to".to_string()), 3),
        ];
        let breakdown = referrer_breakdown(&counts);
        assert_eq!(
            breakdown,
            vec![
                ReferrerCount { source: "Direct".into(), count: 4 },
                ReferrerCount { source: "Twitter/X".into(), count: 3 },
                ReferrerCount { source: "dev.to".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn test_device_detection() {
        assert!(is_mobile("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"));
        assert!(is_mobile("Mozilla/5.0 (Linux; Android 14)"));
        assert!(is_mobile("Mozilla/5.0 (iPad; CPU OS 16_0)"));
        assert!(!is_mobile("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));

        let devices = device_breakdown(&[
            (Some("Android".to_string()), 2),
            (Some("Windows".to_string()), 5),
            (None, 1),
        ]);
        assert_eq!(devices, DeviceBreakdown { mobile: 2, desktop: 6 });
    }

    #[test]
    fn test_page_view_from_headers() {
        let view = page_view_from_headers(Some("https://www.github.com/ada"), Some("  "));
        assert_eq!(view.referrer, "github.com");
        assert_eq!(view.user_agent, None);
    }
}
