//! Scripted input timelines for `scanwedge simulate`.
//!
//! A timeline declares the fields to attach and a list of time-stamped
//! steps. Replaying it drives a [`ScanDispatcher`] on a virtual clock: idle
//! deadlines fire at their exact instant between steps, so the output is
//! the same on every run regardless of machine speed.
//!
//! ```json
//! {
//!   "fields": [{ "element": 1, "watch": [10] }, { "element": 2 }],
//!   "steps": [
//!     { "type": "focus", "at": 0, "element": 2 },
//!     { "type": "type", "at": 10, "text": "4006381333931", "gap_ms": 2 },
//!     { "type": "paste", "at": 900, "text": "9780201633610" }
//!   ]
//! }
//! ```

use anyhow::{Context, ensure};
use camino::Utf8Path;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sw_capture::CaptureStats;
use sw_core::{Config, ElementId, Keystroke, Timestamp};
use sw_field::{FieldOptions, InputEvent, ScanDelivery, ScanDispatcher};
use tracing::debug;

const fn default_gap_ms() -> u64 {
    2
}

/// A field to attach before replaying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineField {
    /// Element the directive is attached to.
    pub element: u32,

    /// Containers the field also watches.
    #[serde(default)]
    pub watch: Vec<u32>,

    /// Complete bursts locally instead of subscribing to the global service.
    #[serde(default)]
    pub standalone: bool,
}

impl TimelineField {
    fn options(&self) -> FieldOptions {
        FieldOptions {
            watch: self.watch.iter().copied().map(ElementId).collect(),
            standalone: self.standalone,
        }
    }
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineStep {
    /// A single keystroke.
    Key {
        /// Milliseconds since the start of the timeline.
        at: u64,
        /// The character typed.
        ch: char,
    },

    /// A run of keystrokes `gap_ms` apart, starting at `at`.
    Type {
        /// Instant of the first keystroke.
        at: u64,
        /// The characters typed.
        text: String,
        /// Milliseconds between keystrokes.
        #[serde(default = "default_gap_ms")]
        gap_ms: u64,
    },

    /// A paste into the focused element.
    Paste {
        /// Milliseconds since the start of the timeline.
        at: u64,
        /// The pasted text.
        text: String,
    },

    /// An element gains focus.
    Focus {
        /// Milliseconds since the start of the timeline.
        at: u64,
        /// The focused element.
        element: u32,
        /// Containers enclosing the element, innermost first.
        #[serde(default)]
        ancestors: Vec<u32>,
    },

    /// Focus leaves every element.
    Blur {
        /// Milliseconds since the start of the timeline.
        at: u64,
    },

    /// A code published programmatically, bypassing timing.
    Inject {
        /// Milliseconds since the start of the timeline.
        at: u64,
        /// The code.
        code: String,
    },
}

impl TimelineStep {
    /// Returns the instant the step starts at.
    #[must_use]
    pub const fn at(&self) -> u64 {
        match self {
            Self::Key { at, .. }
            | Self::Type { at, .. }
            | Self::Paste { at, .. }
            | Self::Focus { at, .. }
            | Self::Blur { at }
            | Self::Inject { at, .. } => *at,
        }
    }

    /// Returns the instant the step ends at.
    #[must_use]
    pub fn end(&self) -> u64 {
        match self {
            Self::Type { at, text, gap_ms } => {
                let keys = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
                at.saturating_add(keys.saturating_sub(1).saturating_mul(*gap_ms))
            }
            _ => self.at(),
        }
    }

    /// Expands the step into dispatcher events.
    ///
    /// Returns an empty list for [`TimelineStep::Inject`], which is not an
    /// input event.
    #[must_use]
    pub fn events(&self) -> Vec<InputEvent> {
        match self {
            Self::Key { at, ch } => vec![InputEvent::Key(Keystroke::new(
                *ch,
                Timestamp::from_millis(*at),
            ))],
            Self::Type { at, text, gap_ms } => {
                let mut t = *at;
                text.chars()
                    .map(|ch| {
                        let key = Keystroke::new(ch, Timestamp::from_millis(t));
                        t = t.saturating_add(*gap_ms);
                        InputEvent::Key(key)
                    })
                    .collect()
            }
            Self::Paste { at, text } => vec![InputEvent::Paste {
                text: text.clone(),
                at: Timestamp::from_millis(*at),
            }],
            Self::Focus {
                at,
                element,
                ancestors,
            } => vec![InputEvent::Focus {
                element: ElementId(*element),
                ancestors: ancestors.iter().copied().map(ElementId).collect(),
                at: Timestamp::from_millis(*at),
            }],
            Self::Blur { at } => vec![InputEvent::Blur {
                at: Timestamp::from_millis(*at),
            }],
            Self::Inject { .. } => Vec::new(),
        }
    }
}

/// A scripted session: fields to attach plus time-ordered steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Fields attached before the first step, in registration order.
    #[serde(default)]
    pub fields: Vec<TimelineField>,

    /// Steps in non-decreasing time order.
    pub steps: Vec<TimelineStep>,
}

impl Timeline {
    /// Parses and validates a timeline from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the steps go back in
    /// time.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let timeline: Self = serde_json::from_str(json).context("invalid timeline JSON")?;
        timeline.validate()?;
        Ok(timeline)
    }

    /// Loads a timeline file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// timeline.
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read timeline {path}"))?;
        Self::from_json_str(&json).with_context(|| format!("failed to load timeline {path}"))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut previous_end = 0;
        for (index, step) in self.steps.iter().enumerate() {
            ensure!(
                step.at() >= previous_end,
                "step {index} starts at {}ms, before the previous step ended at {previous_end}ms",
                step.at()
            );
            previous_end = step.end();
        }
        Ok(())
    }

    /// Builds a generated timeline.
    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        let field = |element, watch: &[u32]| TimelineField {
            element,
            watch: watch.to_vec(),
            standalone: false,
        };
        let focus = |at, element, ancestors: &[u32]| TimelineStep::Focus {
            at,
            element,
            ancestors: ancestors.to_vec(),
        };
        let typed = |at, text: &str, gap_ms| TimelineStep::Type {
            at,
            text: text.to_owned(),
            gap_ms,
        };

        match preset {
            Preset::Scan => Self {
                fields: vec![field(1, &[])],
                steps: vec![focus(0, 1, &[]), typed(10, "4006381333931", 3)],
            },
            Preset::Typing => Self {
                fields: vec![field(1, &[])],
                steps: vec![focus(0, 1, &[]), typed(10, "4006381333931", 180)],
            },
            Preset::Mixed => Self {
                fields: vec![field(1, &[10]), field(2, &[])],
                steps: vec![
                    focus(0, 2, &[]),
                    typed(10, "20240117", 150),
                    typed(2_000, "9780201633610", 2),
                    focus(3_000, 3, &[10]),
                    typed(3_100, "4006381333931", 2),
                    focus(3_900, 4, &[]),
                    typed(4_000, "5012345678900", 2),
                    focus(5_000, 2, &[]),
                    TimelineStep::Paste {
                        at: 5_100,
                        text: " 73513537 ".to_owned(),
                    },
                ],
            },
        }
    }
}

/// Generated timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// One scanner burst into a focused field.
    #[default]
    Scan,
    /// The same digits typed by hand.
    Typing,
    /// Typing, scans inside and outside scope, and a paste.
    Mixed,
}

/// A delivery stamped with the virtual instant it happened at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimedDelivery {
    /// Milliseconds since the start of the timeline.
    pub at: u64,

    /// The delivery.
    #[serde(flatten)]
    pub delivery: ScanDelivery,
}

/// Result of replaying a timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// Every delivery, in order.
    pub deliveries: Vec<TimedDelivery>,

    /// Capture counters after the last deadline fired.
    pub stats: CaptureStats,
}

/// Replays `timeline` through a fresh dispatcher built from `config`.
///
/// Pending idle deadlines are fired at their exact instant before each
/// step, and once more after the last step, so every burst is settled.
#[must_use]
pub fn replay(timeline: &Timeline, config: &Config) -> Replay {
    let mut dispatcher = ScanDispatcher::new(config.capture.clone(), &config.broadcast);
    for field in &timeline.fields {
        dispatcher.attach_field(ElementId(field.element), field.options());
    }

    let mut deliveries = Vec::new();
    for step in &timeline.steps {
        for event in step.events() {
            let at = event_time(&event);
            settle(&mut dispatcher, at, &mut deliveries);
            record(&mut deliveries, at, dispatcher.handle(event));
        }
        if let TimelineStep::Inject { at, code } = step {
            let at = Timestamp::from_millis(*at);
            settle(&mut dispatcher, at, &mut deliveries);
            record(&mut deliveries, at, dispatcher.inject_code(code));
        }
    }
    settle(&mut dispatcher, Timestamp::from_millis(u64::MAX), &mut deliveries);

    debug!(deliveries = deliveries.len(), "Timeline replayed");
    Replay {
        deliveries,
        stats: dispatcher.stats(),
    }
}

/// Fires every idle deadline due at or before `until`, each at its own
/// instant.
fn settle(dispatcher: &mut ScanDispatcher, until: Timestamp, out: &mut Vec<TimedDelivery>) {
    while let Some(deadline) = dispatcher.next_deadline() {
        if deadline > until {
            break;
        }
        record(out, deadline, dispatcher.handle(InputEvent::Tick(deadline)));
    }
}

fn record(
    out: &mut Vec<TimedDelivery>,
    at: Timestamp,
    deliveries: impl IntoIterator<Item = ScanDelivery>,
) {
    out.extend(deliveries.into_iter().map(|delivery| TimedDelivery {
        at: at.as_millis(),
        delivery,
    }));
}

const fn event_time(event: &InputEvent) -> Timestamp {
    match event {
        InputEvent::Key(key) => key.at,
        InputEvent::Paste { at, .. }
        | InputEvent::Focus { at, .. }
        | InputEvent::Blur { at }
        | InputEvent::Tick(at) => *at,
    }
}

#[cfg(test)]
mod tests {
    use sw_field::DeliverySource;

    use super::*;

    fn codes(replay: &Replay) -> Vec<(u64, u32, &str, DeliverySource)> {
        replay
            .deliveries
            .iter()
            .map(|d| {
                (
                    d.at,
                    d.delivery.element.get(),
                    d.delivery.code.as_str(),
                    d.delivery.source,
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_timeline() {
        let timeline = Timeline::from_json_str(
            r#"{
                "fields": [{ "element": 1, "watch": [10] }],
                "steps": [
                    { "type": "focus", "at": 0, "element": 1 },
                    { "type": "type", "at": 5, "text": "123" },
                    { "type": "key", "at": 20, "ch": "\n" },
                    { "type": "blur", "at": 30 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(timeline.fields[0].watch, [10]);
        assert_eq!(
            timeline.steps[1],
            TimelineStep::Type {
                at: 5,
                text: "123".to_owned(),
                gap_ms: 2
            }
        );
        assert_eq!(timeline.steps[1].end(), 9);
    }

    #[test]
    fn test_rejects_steps_out_of_order() {
        let err = Timeline::from_json_str(
            r#"{"steps": [
                { "type": "type", "at": 0, "text": "12345", "gap_ms": 10 },
                { "type": "blur", "at": 20 }
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("step 1 starts at 20ms"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Timeline::from_json_str(r#"{"steps": [{ "type": "wave" }]}"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid timeline JSON");
    }

    #[test]
    fn test_type_step_expands_to_keys() {
        let step = TimelineStep::Type {
            at: 100,
            text: "ab".to_owned(),
            gap_ms: 7,
        };
        assert_eq!(
            step.events(),
            [
                InputEvent::Key(Keystroke::new('a', Timestamp::from_millis(100))),
                InputEvent::Key(Keystroke::new('b', Timestamp::from_millis(107))),
            ]
        );
    }

    #[test]
    fn test_scan_preset_delivers_at_deadline() {
        let replay = replay(&Timeline::preset(Preset::Scan), &Config::default());
        // Last key at 10 + 12 * 3 = 46; the 100ms idle gap ends at 146.
        assert_eq!(
            codes(&replay),
            [(146, 1, "4006381333931", DeliverySource::Broadcast)]
        );
        assert_eq!(replay.stats.codes_emitted, 1);
    }

    #[test]
    fn test_typing_preset_delivers_nothing() {
        let replay = replay(&Timeline::preset(Preset::Typing), &Config::default());
        assert!(replay.deliveries.is_empty());
        assert_eq!(replay.stats.bursts_discarded, 13);
    }

    #[test]
    fn test_mixed_preset() {
        let replay = replay(&Timeline::preset(Preset::Mixed), &Config::default());
        assert_eq!(
            codes(&replay),
            [
                (2_124, 2, "9780201633610", DeliverySource::Broadcast),
                (3_224, 1, "4006381333931", DeliverySource::Broadcast),
                (5_100, 2, "73513537", DeliverySource::Paste),
            ]
        );
        // The scan with focus on element 4 was emitted but reached no field.
        assert_eq!(replay.stats.codes_emitted, 3);
    }

    #[test]
    fn test_inject_step() {
        let timeline = Timeline {
            fields: vec![TimelineField {
                element: 1,
                watch: Vec::new(),
                standalone: false,
            }],
            steps: vec![
                TimelineStep::Focus {
                    at: 0,
                    element: 1,
                    ancestors: Vec::new(),
                },
                TimelineStep::Inject {
                    at: 50,
                    code: "5012345678900".to_owned(),
                },
            ],
        };
        let replay = replay(&timeline, &Config::default());
        assert_eq!(
            codes(&replay),
            [(50, 1, "5012345678900", DeliverySource::Broadcast)]
        );
    }
}
