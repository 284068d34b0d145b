/// What a device should do on one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Poll counter still running
    Wait,
    /// Poll interval elapsed but the device is backing off
    Throttled,
    /// Go to the network
    Poll,
}

/// Per-device poll and backoff counters, advanced once per tick.
#[derive(Debug, Clone)]
pub struct Countdown {
    poll_interval: u32,
    backoff_length: u32,
    poll_counter: i64,
    backoff_counter: i64,
}

impl Countdown {
    /// `offset` staggers the first poll so devices sharing a tick loop do not
    /// all hit the network on the same tick.
    pub fn new(poll_interval: u32, backoff_length: u32, offset: u32) -> Self {
        Self {
            poll_interval,
            backoff_length,
            poll_counter: offset as i64,
            backoff_counter: 0,
        }
    }

    pub fn tick(&mut self) -> TickAction {
        if self.is_counting() {
            self.poll_counter -= 1;
            return TickAction::Wait;
        }

        self.reset_poll_counter();

        if self.is_backing_off() {
            self.backoff_counter -= 1;
            return TickAction::Throttled;
        }

        TickAction::Poll
    }

    /// Called after a failed poll.
    pub fn back_off(&mut self) {
        self.backoff_counter = self.backoff_length as i64;
    }

    pub fn poll_counter(&self) -> i64 {
        self.poll_counter
    }

    pub fn backoff_counter(&self) -> i64 {
        self.backoff_counter
    }

    fn is_counting(&self) -> bool {
        self.poll_counter > 0
    }

    fn is_backing_off(&self) -> bool {
        self.backoff_counter > 0
    }

    fn reset_poll_counter(&mut self) {
        self.poll_counter = self.poll_interval as i64;
    }
}
