use std::time::Duration;

/// Time between revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(30);

/// Character-by-character playback of a reply that has already arrived in
/// full. Purely cosmetic; the network call is complete before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    text: String,
    interval: Duration,
}

impl Reveal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            interval: DEFAULT_REVEAL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of steps, one per character.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Total playback time; saturates at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        let steps = u32::try_from(self.len()).unwrap_or(u32::MAX);
        self.interval.checked_mul(steps).unwrap_or(Duration::MAX)
    }

    /// Every prefix shown during playback, growing one character at a time
    /// and ending with the full text.
    pub fn frames(&self) -> impl Iterator<Item = &str> + '_ {
        self.text
            .char_indices()
            .map(|(i, c)| &self.text[..i + c.len_utf8()])
    }

    /// Play the frames on a [`tokio::time::interval`], calling `on_frame`
    /// for each one. A zero interval emits every frame immediately.
    pub async fn play<F>(&self, mut on_frame: F)
    where
        F: FnMut(&str),
    {
        if self.is_empty() {
            return;
        }

        if self.interval.is_zero() {
            self.frames().for_each(on_frame);
            return;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await;

        for frame in self.frames() {
            ticker.tick().await;
            on_frame(frame);
        }
    }
}
