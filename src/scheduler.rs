//! Frame scheduling
//!
//! The engine asks for "the next frame" and gets a token back; the host
//! decides when that frame is due. Cancelling the token means the frame never
//! fires.

use std::time::{Duration, Instant};

/// Handle for one requested frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

pub trait FrameScheduler {
    /// Request a frame, replacing any frame still pending
    fn schedule_frame(&mut self) -> FrameToken;

    /// Drop the pending frame if it is `token`
    fn cancel_frame(&mut self, token: FrameToken);

    /// Take the pending frame if it is due
    fn take_due(&mut self) -> Option<FrameToken>;

    /// How long until the pending frame is due, `None` with nothing pending
    fn time_until_due(&self) -> Option<Duration>;
}

/// Wall-clock scheduler: frames fall due a fixed interval after the request
pub struct TickScheduler {
    interval: Duration,
    next_id: u64,
    pending: Option<(FrameToken, Instant)>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_id: 0, pending: None }
    }

    /// Change the frame interval; a pending frame keeps its deadline
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}

impl FrameScheduler for TickScheduler {
    fn schedule_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending = Some((token, Instant::now() + self.interval));
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if matches!(self.pending, Some((t, _)) if t == token) {
            self.pending = None;
        }
    }

    fn take_due(&mut self) -> Option<FrameToken> {
        match self.pending {
            Some((token, deadline)) if Instant::now() >= deadline => {
                self.pending = None;
                Some(token)
            }
            _ => None,
        }
    }

    fn time_until_due(&self) -> Option<Duration> {
        self.pending
            .map(|(_, deadline)| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Scheduler whose frames are due as soon as they are requested.
///
/// Used to step frames by hand (print mode, tests).
#[derive(Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameToken>,
    #[cfg(test)]
    requested: usize,
    #[cfg(test)]
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Total frames ever requested
    #[cfg(test)]
    pub fn requested(&self) -> usize {
        self.requested
    }

    #[cfg(test)]
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        #[cfg(test)]
        {
            self.requested += 1;
        }
        let token = FrameToken(self.next_id);
        self.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
            #[cfg(test)]
            {
                self.cancelled += 1;
            }
        }
    }

    fn take_due(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }

    fn time_until_due(&self) -> Option<Duration> {
        self.pending.map(|_| Duration::ZERO)
    }
}
