//! Single-owner driver for a [`RoundEngine`].
//!
//! The engine is not thread safe and assumes one caller at a time. A
//! [`RoundSession`] moves it into its own task and feeds it from one queue:
//! player selections, the once-per-interval clock tick and the delayed
//! un-flip of mismatched pairs all arrive as commands and are applied in
//! order.

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::{
    ClearTicket, RoundEngine, RoundSnapshot, RoundStatistics, SelectEvent, SelectOutcome, Symbol,
};
use crate::utils::{GameError, GameResult};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub tick_interval: Duration,
    /// How long a mismatched pair stays face up.
    pub mismatch_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            mismatch_delay: Duration::from_secs(1),
        }
    }
}

enum Command {
    Select {
        card_id: usize,
        reply: oneshot::Sender<SelectOutcome>,
    },
    Restart {
        symbols: Vec<Symbol>,
        reply: oneshot::Sender<RoundSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<RoundSnapshot>,
    },
    Statistics {
        reply: oneshot::Sender<RoundStatistics>,
    },
    ClearFlipped(ClearTicket),
    Shutdown,
}

/// Cloneable handle to a running round. The task stops once every handle
/// is dropped or [`RoundSession::shutdown`] is called, and hands the engine
/// back through its `JoinHandle`.
#[derive(Clone)]
pub struct RoundSession {
    commands: mpsc::Sender<Command>,
}

impl RoundSession {
    pub fn spawn(engine: RoundEngine, timings: SessionTimings) -> (Self, JoinHandle<RoundEngine>) {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let actor = SessionActor {
            engine,
            timings,
            commands: commands.downgrade(),
        };

        let handle = tokio::spawn(actor.run(receiver));
        (Self { commands }, handle)
    }

    pub async fn select(&self, card_id: usize) -> GameResult<SelectOutcome> {
        self.request(|reply| Command::Select { card_id, reply }).await
    }

    pub async fn restart<I>(&self, symbols: I) -> GameResult<RoundSnapshot>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let symbols: Vec<Symbol> = symbols.into_iter().map(Into::into).collect();
        self.request(|reply| Command::Restart { symbols, reply }).await
    }

    pub async fn snapshot(&self) -> GameResult<RoundSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn statistics(&self) -> GameResult<RoundStatistics> {
        self.request(|reply| Command::Statistics { reply }).await
    }

    pub async fn shutdown(&self) -> GameResult<()> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| GameError::session("Round session already stopped"))
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> GameResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| GameError::session("Round session is not running"))?;

        response
            .await
            .map_err(|_| GameError::session("Round session stopped before replying"))
    }
}

struct SessionActor {
    engine: RoundEngine,
    timings: SessionTimings,
    // Weak so pending timers never keep a finished session alive.
    commands: mpsc::WeakSender<Command>,
}

impl SessionActor {
    async fn run(mut self, mut receiver: mpsc::Receiver<Command>) -> RoundEngine {
        info!("Round session started");

        let mut ticker = time::interval(self.timings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.reset();

        loop {
            tokio::select! {
                command = receiver.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command, &mut ticker),
                },
                _ = ticker.tick() => {
                    self.engine.tick();
                }
            }
        }

        info!("Round session stopped");
        self.engine
    }

    fn handle(&mut self, command: Command, ticker: &mut Interval) {
        match command {
            Command::Select { card_id, reply } => {
                let outcome = self.engine.select_card(card_id);
                if let SelectEvent::MismatchResolved(ticket) = outcome.event {
                    self.schedule_clear(ticket);
                }
                // A caller that gave up waiting is not an error.
                let _ = reply.send(outcome);
            }
            Command::Restart { symbols, reply } => {
                self.engine.restart(symbols);
                ticker.reset();
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Statistics { reply } => {
                let _ = reply.send(self.engine.statistics());
            }
            Command::ClearFlipped(ticket) => {
                self.engine.clear_flipped(ticket);
            }
            Command::Shutdown => {}
        }
    }

    fn schedule_clear(&self, ticket: ClearTicket) {
        let Some(commands) = self.commands.upgrade() else {
            return;
        };
        let delay = self.timings.mismatch_delay;

        tokio::spawn(async move {
            time::sleep(delay).await;
            if commands.send(Command::ClearFlipped(ticket)).await.is_err() {
                debug!("Session closed before clearing {:?}", ticket.pair);
            }
        });
    }
}
