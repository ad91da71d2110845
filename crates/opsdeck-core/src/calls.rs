// ── Active call board ──
//
// Hang-up / transfer actions and the once-a-second duration ticker.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::model::{ActiveCall, CallStatus, EntityId};
use crate::store::Repository;

/// Tick period of the duration ticker.
pub const DURATION_TICK: Duration = Duration::from_secs(1);

pub struct CallBoard<R> {
    calls: R,
}

impl<R: Repository<ActiveCall>> CallBoard<R> {
    pub fn new(calls: R) -> Self {
        Self { calls }
    }

    pub fn calls(&self) -> Arc<Vec<Arc<ActiveCall>>> {
        self.calls.list()
    }

    /// Drop the call from the board.
    pub fn hangup(&self, id: &EntityId) -> Result<Arc<ActiveCall>, CoreError> {
        let call = self.calls.delete(id)?;
        tracing::info!(%id, channel = %call.channel, "call hung up");
        Ok(call)
    }

    /// Mark the call transferred. It stays on the board.
    pub fn transfer(&self, id: &EntityId) -> Result<Arc<ActiveCall>, CoreError> {
        let call = self.calls.modify(id, &mut |call| {
            call.status = CallStatus::Transferred;
            true
        })?;
        tracing::info!(%id, channel = %call.channel, "call transferred");
        Ok(call)
    }

    /// Recompute every call's elapsed seconds at `now`. Returns how many
    /// records changed.
    ///
    /// Only `duration_secs` is touched, on the record as stored at write
    /// time, so a concurrent transfer is never rolled back.
    pub fn refresh_durations(&self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for call in self.calls.list().iter() {
            let mut tick = |current: &mut ActiveCall| {
                let elapsed = current.elapsed_at(now);
                if elapsed == current.duration_secs {
                    return false;
                }
                current.duration_secs = elapsed;
                changed += 1;
                true
            };
            // A call hung up since the snapshot was taken is simply skipped.
            if let Err(e) = self.calls.modify(&call.id, &mut tick) {
                tracing::trace!(id = %call.id, error = %e, "call gone before tick");
            }
        }
        changed
    }
}

/// Refresh call durations every `period` until `cancel` fires.
pub fn spawn_duration_ticker<R>(
    board: Arc<CallBoard<R>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    R: Repository<ActiveCall> + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let changed = board.refresh_durations(Utc::now());
                    tracing::trace!(changed, "duration tick");
                }
            }
        }
        tracing::debug!("duration ticker stopped");
    })
}
