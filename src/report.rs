//! Trailing-window listening report: fetch, rank, render.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::history::{collect_window, CollectOptions, HistoryError, StopReason};
use crate::ranking::{rank, AggregateUnit};
use crate::source::ListenSource;

/// Builds reports against a shared listen source.
///
/// Holds no per-request state; concurrent reports each collect into their
/// own log.
#[derive(Clone)]
pub struct StatsService {
    source: Arc<dyn ListenSource>,
    options: CollectOptions,
    window_days: u32,
    top_n: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    pub window_days: u32,
    pub window_start: i64,
    pub total_listens: usize,
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_reason: Option<String>,
    pub tracks: Vec<AggregateUnit>,
}

impl StatsService {
    pub fn new(
        source: Arc<dyn ListenSource>,
        options: CollectOptions,
        window_days: u32,
        top_n: usize,
    ) -> Self {
        Self {
            source,
            options,
            window_days,
            top_n,
        }
    }

    pub fn from_config(source: Arc<dyn ListenSource>, config: &Config) -> Self {
        Self::new(
            source,
            CollectOptions::from_config(&config.listenbrainz, &config.history),
            config.history.window_days,
            config.report.top_n,
        )
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub async fn report(&self) -> Result<WindowReport, HistoryError> {
        self.report_at(Utc::now()).await
    }

    /// Report on the window ending at `now`
    pub async fn report_at(&self, now: DateTime<Utc>) -> Result<WindowReport, HistoryError> {
        let window_start = TimeDelta::try_days(i64::from(self.window_days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or(HistoryError::WindowOutOfRange {
                days: self.window_days,
            })?
            .timestamp();

        let window = collect_window(self.source.as_ref(), window_start, &self.options).await?;
        let ranked = rank(&window.log, self.top_n);

        info!(
            window_days = self.window_days,
            listens = ranked.total_listens,
            ranked = ranked.tracks.len(),
            "built listening report"
        );

        let partial_reason = match window.stop {
            StopReason::Exhausted => None,
            stop => Some(stop.to_string()),
        };

        Ok(WindowReport {
            window_days: self.window_days,
            window_start,
            total_listens: ranked.total_listens,
            partial: partial_reason.is_some(),
            partial_reason,
            tracks: ranked.tracks,
        })
    }
}

impl WindowReport {
    /// Plain-text rendering served to the browser
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "In the past {} days, you've listened to {} tracks. Nice one.",
            self.window_days, self.total_listens
        );
        if let Some(reason) = &self.partial_reason {
            let _ = writeln!(out, "(listening history was truncated: {reason})");
        }
        out.push('\n');

        for unit in &self.tracks {
            let _ = writeln!(out, "{} - {}", unit.artist_name, unit.track_name);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use crate::source::SourceResult;
    use async_trait::async_trait;

    struct EmptyHistory;

    #[async_trait]
    impl ListenSource for EmptyHistory {
        async fn fetch_page(&self, _min_ts: i64, _count: u32) -> SourceResult<Page> {
            Ok(Page::default())
        }
    }

    fn unit(artist: &str, track: &str, count: usize) -> AggregateUnit {
        AggregateUnit {
            artist_name: artist.to_string(),
            track_name: track.to_string(),
            count,
        }
    }

    #[test]
    fn renders_summary_and_tracks() {
        let report = WindowReport {
            window_days: 7,
            window_start: 0,
            total_listens: 23,
            partial: false,
            partial_reason: None,
            tracks: vec![unit("Daft Punk", "Digital Love", 9), unit("Air", "Alpha Beta Gaga", 4)],
        };

        assert_eq!(
            report.render_text(),
            "In the past 7 days, you've listened to 23 tracks. Nice one.\n\n\
             Daft Punk - Digital Love\n\
             Air - Alpha Beta Gaga\n"
        );
    }

    #[test]
    fn partial_report_says_so() {
        let report = WindowReport {
            window_days: 7,
            window_start: 0,
            total_listens: 5,
            partial: true,
            partial_reason: Some(StopReason::PageLimit(5).to_string()),
            tracks: vec![],
        };

        let text = report.render_text();
        assert!(text.contains("(listening history was truncated: stopped after 5 pages)"));
    }

    #[tokio::test]
    async fn oversized_window_is_an_error() {
        let stats = StatsService::new(
            Arc::new(EmptyHistory),
            CollectOptions::default(),
            100_000_000,
            10,
        );

        let err = stats.report().await.unwrap_err();
        assert!(matches!(
            err,
            HistoryError::WindowOutOfRange { days: 100_000_000 }
        ));
    }

    #[tokio::test]
    async fn empty_history_reports_zero() {
        let stats = StatsService::new(Arc::new(EmptyHistory), CollectOptions::default(), 7, 10);

        let report = stats.report().await.unwrap();
        assert_eq!(report.total_listens, 0);
        assert!(!report.partial);
    }
}
