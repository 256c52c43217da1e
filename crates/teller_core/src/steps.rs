/// Linear step counter for a staged workflow, clamped to `1..=last`.
///
/// Navigation never consults validity; callers gate on the workflow's
/// `is_valid` before advancing when they want blocking behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTracker {
    current: u8,
    last: u8,
}

impl StepTracker {
    pub fn new(last: u8) -> Self {
        Self {
            current: 1,
            last: last.max(1),
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn last(&self) -> u8 {
        self.last
    }

    /// Advances one step; a no-op on the last step.
    pub fn increment(&mut self) {
        if self.current < self.last {
            self.current += 1;
        }
    }

    /// Retreats one step; a no-op on the first step.
    pub fn decrement(&mut self) {
        if self.current > 1 {
            self.current -= 1;
        }
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.last
    }

    pub fn has_next(&self) -> bool {
        self.current < self.last
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }
}
