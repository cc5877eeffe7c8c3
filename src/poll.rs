use std::time::{Duration, Instant};

use crate::error::{Error, Result};


/// Fixed-interval poll loop pacing shared by the director task poller and
/// the Turbulence incident poller.
#[derive(Debug)]
pub(crate) struct Poll {
    interval: Duration,
    timeout: Option<Duration>,
    started: Instant,
}

impl Poll {
    pub fn start(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            interval,
            timeout,
            started: Instant::now(),
        }
    }

    /// Sleeps for one interval, or fails once the deadline has passed. The
    /// last sleep before the deadline is cut short so the caller gets one
    /// final poll at the deadline rather than a full interval after it.
    pub async fn wait(&self) -> Result<()> {
        let mut interval = self.interval;
        if let Some(timeout) = self.timeout {
            let elapsed = self.started.elapsed();
            if elapsed >= timeout {
                return Err(Error::PollTimeout { elapsed });
            }
            interval = interval.min(timeout - elapsed);
        }

        tokio::time::sleep(interval).await;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_without_timeout_always_sleeps() {
        let poll = Poll::start(Duration::from_millis(1), None);
        for _ in 0..3 {
            poll.wait().await.unwrap();
        }
    }

    #[tokio::test]
    async fn wait_fails_past_the_deadline() {
        let poll = Poll::start(Duration::from_millis(1), Some(Duration::ZERO));
        let err = poll.wait().await.unwrap_err();
        assert!(matches!(err, Error::PollTimeout { .. }));
    }

    #[tokio::test]
    async fn wait_stops_sleeping_at_the_deadline() {
        let poll = Poll::start(Duration::from_secs(10), Some(Duration::from_millis(20)));

        tokio::time::timeout(Duration::from_secs(1), poll.wait())
            .await
            .expect("sleep should end at the deadline")
            .unwrap();

        let err = poll.wait().await.unwrap_err();
        assert!(matches!(err, Error::PollTimeout { .. }));
    }
}
