//! Media query matching against a viewport signal.
//!
//! Supported syntax is the subset a layout actually uses:
//!
//! ```text
//! query-list := query ("," query)*
//! query      := [("screen" | "all") "and"] condition ("and" condition)*
//! condition  := "(" feature ":" value ")"
//! feature    := min-width | max-width | min-height | max-height | orientation
//! value      := <number>px | <number>em | 0 | portrait | landscape
//! ```
//!
//! Lengths in `em` use a 16px root font size.

use std::str::FromStr;

use smallvec::SmallVec;

use crate::config::BREAKPOINTS;
use crate::error::{Error, Result};
use crate::reactive::{Signal, SubscriberId};

const ROOT_FONT_PX: f64 = 16.0;

/// Size of the rendering surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Feature {
    MinWidth(f64),
    MaxWidth(f64),
    MinHeight(f64),
    MaxHeight(f64),
    Orientation(Orientation),
}

impl Feature {
    fn matches(&self, viewport: &Viewport) -> bool {
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        match *self {
            Feature::MinWidth(px) => width >= px,
            Feature::MaxWidth(px) => width <= px,
            Feature::MinHeight(px) => height >= px,
            Feature::MaxHeight(px) => height <= px,
            Feature::Orientation(orientation) => viewport.orientation() == orientation,
        }
    }
}

/// A parsed, comma-separated list of media queries. Matches if any query does.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQueryList {
    queries: Vec<SmallVec<[Feature; 2]>>,
}

impl MediaQueryList {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::MediaQuery(input.to_string());

        let queries = input
            .split(',')
            .map(|query| parse_query(query).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { queries })
    }

    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.queries
            .iter()
            .any(|conditions| conditions.iter().all(|feature| feature.matches(viewport)))
    }
}

impl FromStr for MediaQueryList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_query(query: &str) -> Option<SmallVec<[Feature; 2]>> {
    let lowered = query.to_ascii_lowercase();

    // `and` is a keyword only as a whole whitespace-delimited token.
    let mut parts: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in lowered.split_whitespace() {
        if token == "and" {
            parts.push(current.join(" "));
            current.clear();
        } else {
            current.push(token);
        }
    }
    parts.push(current.join(" "));

    if matches!(parts.first().map(String::as_str), Some("screen") | Some("all")) {
        parts.remove(0);
    }
    if parts.is_empty() {
        return None;
    }

    parts.iter().map(|part| parse_condition(part)).collect()
}

fn parse_condition(condition: &str) -> Option<Feature> {
    let inner = condition.strip_prefix('(')?.strip_suffix(')')?;
    let (name, value) = inner.split_once(':')?;
    let value = value.trim();

    match name.trim() {
        "min-width" => parse_length(value).map(Feature::MinWidth),
        "max-width" => parse_length(value).map(Feature::MaxWidth),
        "min-height" => parse_length(value).map(Feature::MinHeight),
        "max-height" => parse_length(value).map(Feature::MaxHeight),
        "orientation" => match value {
            "portrait" => Some(Feature::Orientation(Orientation::Portrait)),
            "landscape" => Some(Feature::Orientation(Orientation::Landscape)),
            _ => None,
        },
        _ => None,
    }
}

fn parse_length(value: &str) -> Option<f64> {
    if value == "0" {
        return Some(0.0);
    }
    if let Some(px) = value.strip_suffix("px") {
        return px.trim().parse::<f64>().ok().filter(|v| *v >= 0.0);
    }
    if let Some(em) = value.strip_suffix("em") {
        return em
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0)
            .map(|v| v * ROOT_FONT_PX);
    }
    None
}

/// Named layout breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 6] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
        Breakpoint::Xxl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
            Breakpoint::Xxl => "2xl",
        }
    }

    /// Width in pixels, from the breakpoint table.
    pub fn px(&self) -> u32 {
        BREAKPOINTS
            .iter()
            .find(|(name, _)| *name == self.name())
            .map(|(_, px)| *px)
            .unwrap_or(0)
    }

    /// `(min-width: Npx)` for this breakpoint.
    pub fn min_width_query(&self) -> String {
        format!("(min-width: {}px)", self.px())
    }
}

/// A boolean signal tracking whether a query matches the viewport.
pub struct MediaQuery {
    query: String,
    matches: Signal<bool>,
    viewport: Signal<Viewport>,
    watcher: SubscriberId,
}

impl MediaQuery {
    /// Evaluate `query` now and whenever `viewport` changes.
    ///
    /// A query that does not parse never matches.
    pub fn new(query: &str, viewport: &Signal<Viewport>) -> Self {
        let parsed = match MediaQueryList::parse(query) {
            Ok(list) => Some(list),
            Err(err) => {
                tracing::warn!(error = %err, "media query will never match");
                None
            }
        };

        let evaluate = move |viewport: &Viewport| {
            parsed.as_ref().map(|list| list.matches(viewport)).unwrap_or(false)
        };

        let matches = Signal::new(viewport.with(&evaluate));
        let watcher = SubscriberId::new();
        {
            let matches = matches.clone();
            let source = viewport.clone();
            viewport.subscribe(watcher, move || {
                if matches.set_if_changed(source.with(&evaluate)) {
                    tracing::debug!(matches = matches.get_untracked(), "media query changed");
                }
            });
        }

        Self {
            query: query.to_string(),
            matches,
            viewport: viewport.clone(),
            watcher,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the query currently matches. Tracked inside effects.
    pub fn matches(&self) -> bool {
        self.matches.get()
    }

    pub fn signal(&self) -> Signal<bool> {
        self.matches.clone()
    }
}

impl Drop for MediaQuery {
    fn drop(&mut self) {
        self.viewport.unsubscribe(self.watcher);
    }
}

impl std::fmt::Debug for MediaQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaQuery")
            .field("query", &self.query)
            .field("matches", &self.matches.get_untracked())
            .finish()
    }
}
