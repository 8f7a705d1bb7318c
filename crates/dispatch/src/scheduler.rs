use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::engine::Engine;
use crate::store::Database;

/// Drives `Engine::run_round` at a fixed interval, the way the former
/// collector loop drove a `Collector::run` call, simplified down to this
/// engine's needs: no persisted collector state, and a single cancellation
/// signal instead of a supervision-strategy tree.
///
/// A round never overlaps itself: if a round runs long, the next tick fires
/// immediately after it finishes rather than concurrently with it.
pub struct Scheduler<Db: Database> {
    engine: Arc<Engine<Db>>,
    interval: Duration,
    round_deadline: Duration,
}

impl<Db: Database + 'static> Scheduler<Db> {
    pub fn new(engine: Arc<Engine<Db>>, interval: Duration, round_deadline: Duration) -> Self {
        Self {
            engine,
            interval,
            round_deadline,
        }
    }

    /// Runs rounds until `shutdown` is signalled. The in-flight round (if
    /// any) is allowed to finish or fail before the loop exits; no new round
    /// starts afterwards.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        log::info!("scheduler shutting down");
                        return;
                    }
                }
            }

            if *shutdown.borrow() {
                log::info!("scheduler shutting down");
                return;
            }

            match tokio::time::timeout(self.round_deadline, self.engine.run_round()).await {
                Ok(Ok(())) => {}
                Ok(Err(why)) => {
                    log::error!("dispatch round failed: {why}");
                }
                Err(_) => {
                    log::error!(
                        "dispatch round exceeded its deadline of {:?}; aborting this tick",
                        self.round_deadline
                    );
                }
            }
        }
    }
}
