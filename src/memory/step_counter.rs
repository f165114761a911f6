/// Source of step numbers for interaction records.
///
/// Starts at 0 and hands out 1, 2, 3, ... Never resets for the lifetime of a
/// session, so step numbers remain unique even after the log is cleared.
#[derive(Debug, Clone, Default)]
pub struct StepCounter {
    current: u64,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one and return the new step number
    pub fn next_step(&mut self) -> u64 {
        self.current += 1;
        self.current
    }

    /// Last step number handed out (0 if none)
    pub fn current(&self) -> u64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_sequential() {
        let mut counter = StepCounter::new();
        assert_eq!(counter.current(), 0);

        assert_eq!(counter.next_step(), 1);
        assert_eq!(counter.next_step(), 2);
        assert_eq!(counter.current(), 2);
    }
}
