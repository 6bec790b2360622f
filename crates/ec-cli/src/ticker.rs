//! The driving loop: one fictitious second per stretched real second.
//!
//! Each iteration reads the wall clock, steps the engine, hands the snapshot
//! to a callback, then sleeps for the stretch factor. Sleeping races the
//! cancellation token, so shutdown never waits out a full tick.

use ec_core::{ElasticClock, Snapshot, SolarEventOracle, WallClock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Run ticks until cancelled or until `limit` ticks have run.
///
/// Returns the number of ticks run. No sleep follows the last tick of a
/// limited run.
pub async fn run_ticks<C, O, F>(
    engine: &mut ElasticClock,
    clock: &C,
    oracle: &O,
    cancel: &CancellationToken,
    limit: Option<u64>,
    mut on_tick: F,
) -> ec_core::Result<u64>
where
    C: WallClock + ?Sized,
    O: SolarEventOracle + ?Sized,
    F: FnMut(&Snapshot),
{
    let reached = |count: u64| limit.is_some_and(|l| count >= l);
    let mut count = 0u64;

    while !reached(count) && !cancel.is_cancelled() {
        let now = clock.now_in(engine.zone().offset);
        let tick = engine.step(now, oracle)?;
        on_tick(&tick.snapshot);
        count += 1;

        if reached(count) {
            break;
        }
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(tick.wait) => {}
        }
    }

    tracing::debug!(ticks = count, cancelled = cancel.is_cancelled(), "tick loop stopped");
    Ok(count)
}

/// Run the loop on its own task, publishing every snapshot.
///
/// The receiver holds `None` until the first tick. `cancel` fires when the
/// task ends for any reason, so an engine error also stops the readers.
pub fn spawn_ticker<C, O>(
    mut engine: ElasticClock,
    clock: C,
    oracle: O,
    cancel: CancellationToken,
) -> (watch::Receiver<Option<Snapshot>>, JoinHandle<ec_core::Result<u64>>)
where
    C: WallClock + 'static,
    O: SolarEventOracle + Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let _stop_readers = cancel.clone().drop_guard();
        run_ticks(&mut engine, &clock, &oracle, &cancel, None, |snapshot| {
            tx.send_replace(Some(snapshot.clone()));
        })
        .await
    });
    (rx, handle)
}

/// Cancel `cancel` on Ctrl-C.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("failed to listen for ctrl-c: {e}");
                    return;
                }
                tracing::info!("ctrl-c received, stopping");
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    });
}
