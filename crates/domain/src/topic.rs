//! Topic naming — derive bus topics from hub labels.
//!
//! All topics live under a root of the form `{prefix}/{slug(hub name)}`:
//!
//! | Topic | Purpose |
//! |-------|---------|
//! | `devices/{device}/{group}/{control}/set` | press a device button |
//! | `activity` | retained current-activity label |
//! | `activity/set` | start an activity by label, or `POWEROFF` |
//! | `activity/{activity}/set` | start one specific activity |
//! | `topology` | retained discovery document |
//! | `status` | retained availability (`online` / `offline`) |
//! | `sync/set` | request a configuration re-sync |
//!
//! Labels are slugged so subscribers can predict topic names from what
//! they see in the hub's own app.

/// Segment used when a label slugs to nothing.
pub const EMPTY_SLUG: &str = "unnamed";

/// Payload accepted on `activity/set` to power the hub off (case-insensitive).
pub const POWER_OFF_PAYLOAD: &str = "POWEROFF";

/// Availability payload published once the bridge is routing.
pub const STATUS_ONLINE: &str = "online";

/// Availability payload left behind when the bridge goes away.
pub const STATUS_OFFLINE: &str = "offline";

/// Whether `payload` is the power-off sentinel.
#[must_use]
pub fn is_power_off_payload(payload: &str) -> bool {
    payload.trim().eq_ignore_ascii_case(POWER_OFF_PAYLOAD)
}

/// Normalize a human-readable label into a topic-safe segment.
///
/// Lowercases ASCII letters, collapses every run of non-alphanumeric
/// characters into a single `-` and trims separators from both ends.
/// Non-ASCII characters count as separators. A label with nothing left
/// becomes [`EMPTY_SLUG`].
#[must_use]
pub fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_separator = false;

    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if out.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        out
    }
}

/// Topic tree of one bridged hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLayout {
    root: String,
}

impl TopicLayout {
    /// Build the layout for `hub_name` under the service `prefix`.
    ///
    /// The prefix is used verbatim (it may contain `/`); a trailing `/` is
    /// dropped.
    #[must_use]
    pub fn new(prefix: &str, hub_name: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        let root = if prefix.is_empty() {
            slug(hub_name)
        } else {
            format!("{prefix}/{}", slug(hub_name))
        };
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Command topic of a single device control.
    #[must_use]
    pub fn device_command(&self, device: &str, group: &str, control: &str) -> String {
        format!(
            "{}/devices/{}/{}/{}/set",
            self.root,
            slug(device),
            slug(group),
            slug(control)
        )
    }

    /// Retained current-activity state topic.
    #[must_use]
    pub fn activity_state(&self) -> String {
        format!("{}/activity", self.root)
    }

    /// Activity selector command topic.
    #[must_use]
    pub fn activity_set(&self) -> String {
        format!("{}/activity/set", self.root)
    }

    /// Per-activity switch topic.
    #[must_use]
    pub fn activity_command(&self, activity: &str) -> String {
        format!("{}/activity/{}/set", self.root, slug(activity))
    }

    /// Retained topology document topic.
    #[must_use]
    pub fn topology(&self) -> String {
        format!("{}/topology", self.root)
    }

    /// Retained availability topic.
    #[must_use]
    pub fn status(&self) -> String {
        format!("{}/status", self.root)
    }

    /// Re-sync request topic.
    #[must_use]
    pub fn sync_command(&self) -> String {
        format!("{}/sync/set", self.root)
    }

    /// Subscription filters covering every inbound command topic.
    ///
    /// None of them matches a topic the bridge publishes itself.
    #[must_use]
    pub fn command_filters(&self) -> Vec<String> {
        vec![
            format!("{}/devices/+/+/+/set", self.root),
            self.activity_set(),
            format!("{}/activity/+/set", self.root),
            self.sync_command(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_lowercase_and_hyphenate_label() {
        assert_eq!(slug("Volume Up"), "volume-up");
        assert_eq!(slug("Watch TV"), "watch-tv");
    }

    #[test]
    fn should_collapse_punctuation_runs() {
        assert_eq!(slug("Input -- HDMI #1"), "input-hdmi-1");
        assert_eq!(slug("a/b+c#d"), "a-b-c-d");
    }

    #[test]
    fn should_trim_separators_at_both_ends() {
        assert_eq!(slug("  (Living Room)  "), "living-room");
    }

    #[test]
    fn should_fall_back_to_placeholder_when_nothing_survives() {
        assert_eq!(slug(""), EMPTY_SLUG);
        assert_eq!(slug("!!!"), EMPTY_SLUG);
        assert_eq!(slug("é"), EMPTY_SLUG);
    }

    #[test]
    fn should_treat_non_ascii_as_separator() {
        assert_eq!(slug("Télé Salon"), "t-l-salon");
    }

    #[test]
    fn should_be_idempotent() {
        for label in ["Volume Up", "  x  ", "", "Input HDMI-2", "ÄÖÜ", "a__b"] {
            let once = slug(label);
            assert_eq!(slug(&once), once);
        }
    }

    #[test]
    fn should_be_deterministic() {
        assert_eq!(slug("Direction Up"), slug("Direction Up"));
    }

    #[test]
    fn should_match_power_off_payload_case_insensitively() {
        assert!(is_power_off_payload("POWEROFF"));
        assert!(is_power_off_payload("PowerOff"));
        assert!(is_power_off_payload(" poweroff\n"));
        assert!(!is_power_off_payload("Power Off"));
        assert!(!is_power_off_payload(""));
    }

    #[test]
    fn should_build_root_from_prefix_and_hub_name() {
        let layout = TopicLayout::new("harmony/", "Living Room");
        assert_eq!(layout.root(), "harmony/living-room");
    }

    #[test]
    fn should_build_root_without_prefix() {
        let layout = TopicLayout::new("", "Den");
        assert_eq!(layout.root(), "den");
    }

    #[test]
    fn should_build_device_command_topic() {
        let layout = TopicLayout::new("harmony", "Hub");
        assert_eq!(
            layout.device_command("Samsung TV", "Volume", "Volume Up"),
            "harmony/hub/devices/samsung-tv/volume/volume-up/set"
        );
    }

    #[test]
    fn should_build_activity_topics() {
        let layout = TopicLayout::new("harmony", "Hub");
        assert_eq!(layout.activity_state(), "harmony/hub/activity");
        assert_eq!(layout.activity_set(), "harmony/hub/activity/set");
        assert_eq!(
            layout.activity_command("Watch TV"),
            "harmony/hub/activity/watch-tv/set"
        );
    }

    #[test]
    fn should_produce_distinct_topics_for_distinct_triples() {
        let layout = TopicLayout::new("harmony", "Hub");
        let a = layout.device_command("TV", "Volume", "Up");
        let b = layout.device_command("TV", "Volume", "Down");
        let c = layout.device_command("Amp", "Volume", "Up");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn should_not_subscribe_to_published_topics() {
        let layout = TopicLayout::new("harmony", "Hub");
        let filters = layout.command_filters();
        assert!(!filters.contains(&layout.activity_state()));
        assert!(!filters.contains(&layout.topology()));
        assert!(!filters.contains(&layout.status()));
        assert_eq!(filters.len(), 4);
    }
}
