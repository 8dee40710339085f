pub const TICK_MS: u32 = 50;
pub const STAGGER_MS: u32 = 200;
pub const VISIBILITY_THRESHOLD: f64 = 0.5;
pub const FADE_CSS: &str = "opacity 0.1s ease-in-out";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RevealStep {
    Running(usize),
    Done(usize),
}

impl RevealStep {
    pub fn count(self) -> usize {
        match self {
            Self::Running(count) | Self::Done(count) => count,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, Self::Done(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetterReveal {
    len: usize,
    visible: bool,
    count: usize,
}

impl LetterReveal {
    pub fn new(text: &str) -> Self {
        Self {
            len: text.chars().count(),
            visible: false,
            count: 0,
        }
    }

    /// Feeds one intersection notification. Returns `true` only on the
    /// notification that first makes the label visible.
    pub fn observe(&mut self, is_intersecting: bool) -> bool {
        if self.visible || !is_intersecting {
            return false;
        }
        self.visible = true;
        true
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_complete(&self) -> bool {
        self.visible && self.count == self.len
    }

    /// Shows one more character. Saturates at the text length and does
    /// nothing before the label has become visible.
    pub fn tick(&mut self) -> usize {
        if self.visible && self.count < self.len {
            self.count += 1;
        }
        self.count
    }

    pub fn step(&mut self) -> RevealStep {
        self.tick();
        self.state()
    }

    pub fn state(&self) -> RevealStep {
        if self.is_complete() {
            RevealStep::Done(self.count)
        } else {
            RevealStep::Running(self.count)
        }
    }

    pub fn reveal_all(&mut self) -> usize {
        if self.visible {
            self.count = self.len;
        }
        self.count
    }

    #[cfg(test)]
    pub fn opacity(&self, index: usize) -> f64 {
        letter_opacity(index, self.count)
    }
}

pub fn letter_opacity(index: usize, count: usize) -> f64 {
    if index < count {
        1.0
    } else {
        0.0
    }
}

pub fn label_delay_ms(index: usize) -> u32 {
    (index as u32).saturating_mul(STAGGER_MS)
}

pub fn school_delay_ms(index: usize, label: &str) -> u32 {
    let label_ms = (label.chars().count() as u32).saturating_mul(TICK_MS);
    label_delay_ms(index).saturating_add(label_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Characters showing `elapsed_ms` after visibility when ticks start
    /// after `delay_ms`.
    fn count_after(len: usize, delay_ms: u32, elapsed_ms: u32) -> usize {
        let Some(revealing_for) = elapsed_ms.checked_sub(delay_ms) else {
            return 0;
        };
        ((revealing_for / TICK_MS) as usize).min(len)
    }

    #[test]
    fn two_ticks_reveal_a_two_letter_label() {
        let mut reveal = LetterReveal::new("AI");
        assert!(reveal.observe(true));

        assert_eq!(reveal.tick(), 1);
        assert_eq!(reveal.tick(), 2);
        assert!(reveal.is_complete());
        assert_eq!(count_after(2, 0, 100), 2);
    }

    #[test]
    fn interval_stops_on_the_tick_that_shows_the_last_letter() {
        let mut reveal = LetterReveal::new("AI");
        reveal.observe(true);
        assert_eq!(reveal.state(), RevealStep::Running(0));

        assert_eq!(reveal.step(), RevealStep::Running(1));
        let last = reveal.step();
        assert_eq!(last, RevealStep::Done(2));
        assert!(last.is_done());
        assert_eq!(last.count(), 2);
    }

    #[test]
    fn already_finished_reveals_need_no_interval() {
        let mut reveal = LetterReveal::new("SQL");
        reveal.observe(true);
        reveal.reveal_all();
        assert_eq!(reveal.state(), RevealStep::Done(3));

        let mut empty = LetterReveal::new("");
        empty.observe(true);
        assert!(empty.state().is_done());
    }

    #[test]
    fn completion_is_idempotent_and_count_never_decreases() {
        let mut reveal = LetterReveal::new("Python");
        reveal.observe(true);

        let mut previous = reveal.count();
        for _ in 0..20 {
            let next = reveal.tick();
            assert!(next >= previous);
            previous = next;
        }
        assert_eq!(reveal.count(), 6);

        reveal.observe(false);
        reveal.observe(true);
        assert_eq!(reveal.tick(), 6);
    }

    #[test]
    fn ticks_before_visibility_do_nothing() {
        let mut reveal = LetterReveal::new("SQL");
        assert_eq!(reveal.tick(), 0);
        assert!(!reveal.observe(false));
        assert_eq!(reveal.tick(), 0);
        assert!(!reveal.is_complete());
    }

    #[test]
    fn visibility_is_one_shot() {
        let mut reveal = LetterReveal::new("React");
        assert!(reveal.observe(true));
        assert!(!reveal.observe(true));
        assert!(!reveal.observe(false));
        assert!(reveal.is_visible());
    }

    #[test]
    fn empty_label_completes_as_soon_as_visible() {
        let mut reveal = LetterReveal::new("");
        assert!(!reveal.is_complete());
        reveal.observe(true);
        assert!(reveal.is_complete());
        assert_eq!(reveal.tick(), 0);
    }

    #[test]
    fn opacity_follows_the_visible_count() {
        let mut reveal = LetterReveal::new("Java");
        reveal.observe(true);
        reveal.tick();
        reveal.tick();

        let opacities: Vec<f64> = (0..reveal.len()).map(|index| reveal.opacity(index)).collect();
        assert_eq!(opacities, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn reduced_motion_shows_everything_once_visible() {
        let mut reveal = LetterReveal::new("JavaScript");
        assert_eq!(reveal.reveal_all(), 0);
        reveal.observe(true);
        assert_eq!(reveal.reveal_all(), 10);
        assert!(reveal.is_complete());
    }

    #[test]
    fn multibyte_text_counts_characters() {
        let reveal = LetterReveal::new("Zürich");
        assert_eq!(reveal.len(), 6);
    }

    #[test]
    fn closed_form_count_respects_delay_and_length() {
        assert_eq!(count_after(4, 200, 0), 0);
        assert_eq!(count_after(4, 200, 249), 0);
        assert_eq!(count_after(4, 200, 250), 1);
        assert_eq!(count_after(4, 200, 400), 4);
        assert_eq!(count_after(4, 200, 10_000), 4);
        assert_eq!(count_after(0, 0, 0), 0);
    }

    #[test]
    fn counter_schedule_staggers_cards_and_waits_for_labels() {
        assert_eq!(label_delay_ms(0), 0);
        assert_eq!(label_delay_ms(3), 600);
        assert_eq!(school_delay_ms(0, "AI"), 100);
        assert_eq!(school_delay_ms(2, "Hackathons"), 400 + 500);
    }
}
