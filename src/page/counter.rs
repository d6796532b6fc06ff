use std::time::Duration;

use crate::page::timer::RepeatingTask;

/// Animates a stat from zero up to the number its text started with.
#[derive(Debug, Clone)]
pub struct Counter {
    pub label: &'static str,
    target: Option<u32>,
    current: f32,
    increment: f32,
    suffix: &'static str,
    text: String,
    task: Option<RepeatingTask>,
    started: bool,
}

impl Counter {
    pub fn new(label: &'static str, initial_text: &str, suffix: &'static str) -> Self {
        Self {
            label,
            target: parse_leading_integer(initial_text),
            current: 0.0,
            increment: 0.0,
            suffix,
            text: initial_text.to_string(),
            task: None,
            started: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.started && self.task.is_none()
    }

    /// Starts counting. A counter only ever runs once, and text that doesn't
    /// start with a number is left untouched.
    pub fn start(&mut self, now: Duration, duration: Duration, tick: Duration) {
        if self.started {
            return;
        }

        let Some(target) = self.target else {
            log::debug!("Counter {} has no numeric target", self.label);
            return;
        };

        let steps = duration.as_secs_f32() / tick.as_secs_f32().max(f32::EPSILON);
        self.started = true;
        self.current = 0.0;
        self.increment = target as f32 / steps.max(1.0);
        self.task = Some(RepeatingTask::every(now, tick));
    }

    pub fn advance(&mut self, now: Duration) {
        let (Some(task), Some(target)) = (self.task.as_mut(), self.target) else {
            return;
        };

        let target = target as f32;

        while task.poll(now) {
            self.current += self.increment;

            if self.current >= target {
                self.current = target;
                task.cancel();
            }

            self.text = format!("{}{}", self.current.floor() as u32, self.suffix);

            if task.is_cancelled() {
                break;
            }
        }

        if task.is_cancelled() {
            self.task = None;
        }
    }
}

/// Reads an optionally signed run of leading digits, ignoring leading
/// whitespace: `"50+"` is 50, `"+7 years"` is 7, `"n/a"` is nothing.
pub fn parse_leading_integer(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits = text
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(index, c)| &text[..index + c.len_utf8()])?;

    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(2000);
    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn parses_leading_integers() {
        assert_eq!(parse_leading_integer("50+"), Some(50));
        assert_eq!(parse_leading_integer("  12 projects"), Some(12));
        assert_eq!(parse_leading_integer("+7"), Some(7));
        assert_eq!(parse_leading_integer("n/a"), None);
        assert_eq!(parse_leading_integer(""), None);
    }

    #[test]
    fn counts_up_monotonically_to_exact_target() {
        let mut counter = Counter::new("Projects", "50+", "+");
        counter.start(Duration::ZERO, DURATION, TICK);

        let mut last = 0;
        let mut now = Duration::ZERO;
        while !counter.is_finished() {
            now += Duration::from_millis(5);
            counter.advance(now);

            let shown = parse_leading_integer(counter.text()).unwrap();
            assert!(shown >= last);
            assert!(counter.text().ends_with('+'));
            last = shown;

            assert!(now < Duration::from_secs(3), "counter never finished");
        }

        assert_eq!(counter.text(), "50+");
        assert!(!counter.is_running());
    }

    #[test]
    fn finishes_after_roughly_the_configured_duration() {
        let mut counter = Counter::new("Years", "5+", "+");
        counter.start(Duration::ZERO, DURATION, TICK);

        counter.advance(Duration::from_millis(1000));
        assert!(counter.is_running());

        counter.advance(Duration::from_millis(2100));
        assert!(counter.is_finished());
        assert_eq!(counter.text(), "5+");
    }

    #[test]
    fn runs_only_once() {
        let mut counter = Counter::new("Clients", "3+", "+");
        counter.start(Duration::ZERO, DURATION, TICK);
        counter.advance(Duration::from_secs(5));
        assert_eq!(counter.text(), "3+");

        counter.start(Duration::from_secs(5), DURATION, TICK);
        assert!(!counter.is_running());
        assert_eq!(counter.text(), "3+");
    }

    #[test]
    fn zero_target_finishes_on_first_tick() {
        let mut counter = Counter::new("Bugs", "0", "+");
        counter.start(Duration::ZERO, DURATION, TICK);
        counter.advance(TICK);

        assert!(counter.is_finished());
        assert_eq!(counter.text(), "0+");
    }

    #[test]
    fn non_numeric_text_is_left_alone() {
        let mut counter = Counter::new("Coffee", "lots", "+");
        counter.start(Duration::ZERO, DURATION, TICK);
        counter.advance(Duration::from_secs(5));

        assert!(!counter.is_running());
        assert_eq!(counter.text(), "lots");
    }
}
