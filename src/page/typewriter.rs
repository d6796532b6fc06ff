use std::time::Duration;

use crate::page::timer::RepeatingTask;

/// Reveals a string one character at a time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    full_text: String,
    /// Byte length of the revealed prefix.
    shown: usize,
    task: RepeatingTask,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, now: Duration, delay: Duration, interval: Duration) -> Self {
        Self {
            full_text: text.into(),
            shown: 0,
            task: RepeatingTask::start(now, delay, interval),
        }
    }

    pub fn advance(&mut self, now: Duration) {
        while self.task.poll(now) {
            match self.full_text[self.shown..].chars().next() {
                Some(next) => self.shown += next.len_utf8(),
                None => {
                    self.task.cancel();
                    break;
                }
            }

            if self.shown == self.full_text.len() {
                self.task.cancel();
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.full_text[..self.shown]
    }

    #[cfg(test)]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn is_done(&self) -> bool {
        self.shown == self.full_text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn typewriter(text: &str) -> Typewriter {
        Typewriter::new(text, ms(0), ms(1000), ms(100))
    }

    #[test]
    fn starts_empty_and_waits_for_delay() {
        let mut typewriter = typewriter("Hi there");
        assert_eq!(typewriter.text(), "");

        typewriter.advance(ms(999));
        assert_eq!(typewriter.text(), "");

        typewriter.advance(ms(1000));
        assert_eq!(typewriter.text(), "H");

        typewriter.advance(ms(1250));
        assert_eq!(typewriter.text(), "Hi ");
    }

    #[test]
    fn completes_and_stops() {
        let mut typewriter = typewriter("Hello");
        typewriter.advance(ms(1400));

        assert!(typewriter.is_done());
        assert_eq!(typewriter.text(), "Hello");

        typewriter.advance(ms(60_000));
        assert_eq!(typewriter.text(), typewriter.full_text());
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut typewriter = typewriter("héllo");
        typewriter.advance(ms(1100));
        assert_eq!(typewriter.text(), "hé");
    }

    #[test]
    fn empty_text_is_immediately_done() {
        let mut typewriter = typewriter("");
        assert!(typewriter.is_done());
        typewriter.advance(ms(5000));
        assert_eq!(typewriter.text(), "");
    }
}
