//! PanelRuntime: the device's single event loop.
//!
//! # Architecture
//!
//! ```text
//!                   ┌──────────────────────────── PanelRuntime ─┐
//! server ◀──UDP──▶  │ link.recv ─┐                              │
//!                   │ heartbeat ─┤                              │
//!                   │ push tick ─┼─ select! ─▶ ProtocolEngine   │
//!                   │ reconnect ─┤               │              │
//! UI / platform ─▶  │ inputs ────┘               ▼              │
//!   (mpsc)          │                 Effects ─▶ link.try_send  │
//!                   └───────────────────────────────────────────┘
//! ```
//!
//! # The select! loop (for beginners)
//!
//! `tokio::select!` waits on several futures at once and runs the branch of
//! whichever finishes first.  The other futures are dropped, which releases
//! their borrows of `self`, so the chosen branch can freely mutate the
//! engine or replace the link.  On the next iteration everything is polled
//! again from scratch: the receive future is re-entered after every
//! datagram.
//!
//! Branches whose resource does not exist (no link yet, push disabled, no
//! reconnect pending) wait on a future that never completes.
//!
//! Sends are fire-and-forget: `try_send` either queues the datagram in the
//! kernel or fails, and a failure is logged and forgotten.

use std::future::pending;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use iopanel_core::domain::controls::RawImage;
use iopanel_core::{InstanceKey, Point, PointerId, Size};
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::{Connector, DatagramLink, NetworkError, MAX_DATAGRAM};
use crate::application::collaborators::PersistentKv;
use crate::application::engine::{Effect, ProtocolEngine};
use crate::application::session::store_run_in_background;

/// Delay before retrying a failed or lost connection.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Messages from the presentation layer and the platform.
#[derive(Debug)]
pub enum PanelInput {
    PointerDown { pointer: PointerId, position: Point },
    PointerMove { pointer: PointerId, position: Point },
    PointerUp { pointer: PointerId, position: Point },
    PointerCancel { pointer: PointerId },
    CanvasResized(Size),
    /// Result of a text-entry dialog; `None` if the user cancelled.
    TextEdited { key: InstanceKey, text: Option<String> },
    /// Result of an image picker; `None` if the user cancelled.
    ImagePicked { key: InstanceKey, image: Option<RawImage> },
    Foreground(bool),
    RunInBackground(bool),
    /// Drop the current link and connect again now.
    Reconnect,
    RegeneratePassword,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub heartbeat_interval: Duration,
    pub reconnect_delay: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

enum Wakeup {
    Received(Result<usize, NetworkError>),
    Heartbeat,
    PushTick,
    ReconnectDue,
    Input(PanelInput),
}

pub struct PanelRuntime {
    engine: ProtocolEngine,
    connector: Arc<dyn Connector>,
    kv: Arc<dyn PersistentKv>,
    inputs: mpsc::Receiver<PanelInput>,
    config: RuntimeConfig,
    link: Option<Box<dyn DatagramLink>>,
    heartbeat: Interval,
    push: Option<Interval>,
    reconnect_at: Option<Instant>,
}

impl PanelRuntime {
    pub fn new(
        engine: ProtocolEngine,
        connector: Arc<dyn Connector>,
        kv: Arc<dyn PersistentKv>,
        inputs: mpsc::Receiver<PanelInput>,
        config: RuntimeConfig,
    ) -> Self {
        let heartbeat = repeating(config.heartbeat_interval, MissedTickBehavior::Delay);
        Self {
            engine,
            connector,
            kv,
            inputs,
            config,
            link: None,
            heartbeat,
            push: None,
            reconnect_at: None,
        }
    }

    pub fn engine(&self) -> &ProtocolEngine {
        &self.engine
    }

    /// Connects and runs until [`PanelInput::Shutdown`] arrives or every
    /// input sender is dropped.  Returns the engine for inspection.
    pub async fn run(mut self) -> ProtocolEngine {
        self.connect().await;
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let wakeup = tokio::select! {
                received = recv_on(self.link.as_deref(), &mut buf) => Wakeup::Received(received),
                _ = self.heartbeat.tick(), if self.link.is_some() => Wakeup::Heartbeat,
                _ = tick_on(self.push.as_mut()) => Wakeup::PushTick,
                _ = sleep_until_opt(self.reconnect_at) => Wakeup::ReconnectDue,
                input = self.inputs.recv() => Wakeup::Input(input.unwrap_or(PanelInput::Shutdown)),
            };

            match wakeup {
                Wakeup::Received(Ok(n)) => {
                    let effects = self.engine.handle_datagram(&buf[..n], SystemTime::now());
                    self.apply(effects);
                }
                Wakeup::Received(Err(e)) => {
                    warn!("link failed: {e}");
                    self.disconnect();
                    self.schedule_reconnect();
                }
                Wakeup::Heartbeat => {
                    let effects = self.engine.heartbeat();
                    self.apply(effects);
                }
                Wakeup::PushTick => {
                    let effects = self.engine.sensor_push_tick();
                    self.apply(effects);
                }
                Wakeup::ReconnectDue => {
                    self.reconnect_at = None;
                    self.connect().await;
                }
                Wakeup::Input(input) => {
                    if self.handle_input(input).await.is_break() {
                        break;
                    }
                }
            }
        }

        info!("panel runtime stopped");
        self.disconnect();
        self.engine
    }

    async fn handle_input(&mut self, input: PanelInput) -> ControlFlow<()> {
        let now = std::time::Instant::now();
        let effects = match input {
            PanelInput::PointerDown { pointer, position } => {
                self.engine.pointer_down(pointer, position, now)
            }
            PanelInput::PointerMove { pointer, position } => {
                self.engine.pointer_move(pointer, position, now)
            }
            PanelInput::PointerUp { pointer, position } => {
                self.engine.pointer_up(pointer, position, now)
            }
            PanelInput::PointerCancel { pointer } => self.engine.pointer_cancel(pointer, now),
            PanelInput::CanvasResized(size) => {
                self.engine.set_canvas_size(size);
                Vec::new()
            }
            PanelInput::TextEdited { key, text } => self.engine.complete_text_edit(key, text),
            PanelInput::ImagePicked { key, image } => self.engine.complete_image_pick(key, image),
            PanelInput::Foreground(foreground) => {
                debug!(foreground, "foreground changed");
                if self.engine.session_mut().set_foreground(foreground) {
                    self.reconnect_at = None;
                    self.connect().await;
                }
                Vec::new()
            }
            PanelInput::RunInBackground(enabled) => {
                self.engine.session_mut().set_run_in_background(enabled);
                store_run_in_background(self.kv.as_ref(), enabled);
                Vec::new()
            }
            PanelInput::Reconnect => {
                self.reconnect_at = None;
                self.connect().await;
                Vec::new()
            }
            PanelInput::RegeneratePassword => {
                self.engine.regenerate_password(SystemTime::now());
                Vec::new()
            }
            PanelInput::Shutdown => return ControlFlow::Break(()),
        };
        self.apply(effects);
        ControlFlow::Continue(())
    }

    /// Replaces the current link with a fresh one.
    async fn connect(&mut self) {
        self.disconnect();
        self.engine.session_mut().begin_connect();
        match self.connector.connect().await {
            Ok(link) => {
                self.link = Some(link);
                self.heartbeat.reset();
                let effects = self.engine.on_connected();
                self.apply(effects);
            }
            Err(e) => {
                warn!("could not connect: {e}");
                self.engine.on_disconnected();
                self.schedule_reconnect();
            }
        }
    }

    fn disconnect(&mut self) {
        if self.link.take().is_some() {
            info!("link closed");
        }
        self.engine.on_disconnected();
    }

    fn schedule_reconnect(&mut self) {
        if self.engine.session().should_reconnect() {
            info!("reconnecting in {:?}", self.config.reconnect_delay);
            self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay);
        } else {
            info!("in background, waiting for foreground before reconnecting");
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(datagram) => match &self.link {
                    Some(link) => {
                        if let Err(e) = link.try_send(&datagram) {
                            warn!("send failed: {e}");
                        }
                    }
                    None => trace!("no link, outbound datagram dropped"),
                },
                Effect::SchedulePush(period) => {
                    self.push = period.map(|p| repeating(p, MissedTickBehavior::Skip));
                }
            }
        }
    }
}

/// An interval whose first tick is one full period from now.
fn repeating(period: Duration, behavior: MissedTickBehavior) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(behavior);
    interval
}

async fn recv_on(link: Option<&dyn DatagramLink>, buf: &mut [u8]) -> Result<usize, NetworkError> {
    match link {
        Some(link) => link.recv(buf).await,
        None => pending().await,
    }
}

async fn tick_on(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
