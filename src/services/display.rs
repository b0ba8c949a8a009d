use chrono::{Local, NaiveDateTime};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::{IntervalStream, WatchStream};

use crate::config::DisplayConfig;
use crate::services::clock;
use crate::services::rotator::{self, Phase, RotatorHandle, RotatorSpec, TransitionStyle, WrapPolicy};

const MAX_ZONE_ITEMS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Announcements,
    Athletics,
    Gallery,
    Ticker,
}

impl Zone {
    pub fn name(self) -> &'static str {
        match self {
            Self::Announcements => "announcements",
            Self::Athletics => "athletics",
            Self::Gallery => "gallery",
            Self::Ticker => "ticker",
        }
    }
}

/// Number of items the page rendered in each zone (`/ws/display` query).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ZoneCounts {
    #[serde(default)]
    pub announcements: usize,
    #[serde(default)]
    pub athletics: usize,
    #[serde(default)]
    pub gallery: usize,
    #[serde(default)]
    pub ticker: usize,
}

impl ZoneCounts {
    pub fn capped(self) -> Self {
        Self {
            announcements: self.announcements.min(MAX_ZONE_ITEMS),
            athletics: self.athletics.min(MAX_ZONE_ITEMS),
            gallery: self.gallery.min(MAX_ZONE_ITEMS),
            ticker: self.ticker.min(MAX_ZONE_ITEMS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayFrame {
    Rotate {
        zone: Zone,
        index: usize,
        phase: Phase,
        style: TransitionStyle,
    },
    Clock {
        time: String,
        date: String,
    },
}

impl DisplayFrame {
    pub fn clock(now: NaiveDateTime) -> Self {
        Self::Clock {
            time: clock::format_time(now.time()),
            date: clock::format_date(now),
        }
    }
}

/// The timers behind one connected kiosk. Every rotator is released when
/// the session is dropped.
pub struct DisplaySession {
    rotators: Vec<(Zone, RotatorHandle)>,
    clock_period: std::time::Duration,
}

impl DisplaySession {
    pub fn start(counts: ZoneCounts, display: &DisplayConfig) -> anyhow::Result<Self> {
        let zones = [
            (Zone::Announcements, counts.announcements, display.announcement_period, TransitionStyle::Slide, WrapPolicy::Cycle),
            (Zone::Athletics, counts.athletics, display.athletics_period, TransitionStyle::Scroll, WrapPolicy::Rewind),
            (Zone::Gallery, counts.gallery, display.gallery_period, TransitionStyle::Fade, WrapPolicy::Cycle),
            (Zone::Ticker, counts.ticker, display.ticker_period, TransitionStyle::Slide, WrapPolicy::Cycle),
        ];

        let mut rotators = Vec::new();
        for (zone, len, period, style, wrap) in zones {
            let spec = RotatorSpec::new(period, display.transition, style, wrap)?;
            if let Some(handle) = rotator::spawn(zone.name(), len, spec) {
                rotators.push((zone, handle));
            }
        }

        Ok(Self {
            rotators,
            clock_period: display.clock_period,
        })
    }

    /// Release every rotator timer of this display.
    pub fn stop(self) {
        for (zone, handle) in self.rotators {
            tracing::debug!("Stopping {} rotator", zone.name());
            handle.stop();
        }
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.rotators.iter().map(|(zone, _)| *zone).collect()
    }

    /// Every rotator state change plus a periodic clock frame. Rotator
    /// streams end once the session is dropped.
    pub fn frames(&self) -> BoxStream<'static, DisplayFrame> {
        let mut streams: Vec<BoxStream<'static, DisplayFrame>> = self
            .rotators
            .iter()
            .map(|(zone, handle)| {
                let zone = *zone;
                let style = handle.style();
                WatchStream::new(handle.subscribe())
                    .map(move |state| DisplayFrame::Rotate {
                        zone,
                        index: state.index,
                        phase: state.phase,
                        style,
                    })
                    .boxed()
            })
            .collect();

        let clock = IntervalStream::new(tokio::time::interval(self.clock_period))
            .map(|_| DisplayFrame::clock(Local::now().naive_local()))
            .boxed();
        streams.push(clock);

        stream::select_all(streams).boxed()
    }
}
