#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running { remaining: u32 },
    Expired,
}

/// Whole-second countdown advanced by external ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
            running: false,
        }
    }

    pub fn started(limit: u32) -> Self {
        let mut countdown = Self::new(limit);
        countdown.start();
        countdown
    }

    pub fn start(&mut self) {
        self.remaining = self.limit;
        self.running = self.limit > 0;
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining: self.remaining,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
