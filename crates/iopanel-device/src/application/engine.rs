//! ProtocolEngine: the device's single owner of protocol state.
//!
//! # How a datagram is handled (for beginners)
//!
//! ```text
//! datagram ─▶ live? ─▶ heartbeat ack? ─▶ password ok? ─▶ opcode known? ─▶ handler
//!              │              │                │               │            │
//!              ▼              ▼                ▼               ▼            ▼
//!            drop      "connected" once      drop            drop     Vec<Effect>
//! ```
//!
//! The engine never touches a socket.  Every method returns the
//! [`Effect`]s the caller must carry out: datagrams to send (already framed
//! with the device id) and changes to the sensor push timer.  This keeps the
//! whole protocol testable with plain function calls.
//!
//! Bad input is never answered with an error packet.  The wire format has no
//! error channel, so malformed, unauthenticated or unknown requests are
//! dropped and only logged.

use std::time::{Duration, Instant, SystemTime};

use iopanel_core::domain::controls::RawImage;
use iopanel_core::domain::pointer::Routed;
use iopanel_core::protocol::frame::is_heartbeat_ack;
use iopanel_core::protocol::{
    authenticate, frame_outbound, require_empty, DropReason, EventOpcode, Opcode,
    PayloadReader, PayloadWriter, SequenceCounter, AUTH_HEADER_LEN,
};
use iopanel_core::{
    AddStatus, Control, ControlEvent, ControlRegistry, DeviceIdentity, InstanceKey, Interaction,
    Point, PointerId, PointerRouter, Size,
};
use tracing::{debug, info, trace};

use super::add_control::parse_add_control;
use super::collaborators::Collaborators;
use super::image_budget::encode_within_budget;
use super::sensor_push::{encode_push, encode_reading, parse_periods, select_period};
use super::session::SessionState;

/// Status byte: the request succeeded.
const STATUS_OK: u8 = 0;
/// Status byte for `H`/`h`/`i`/`u`/`w`: no such control or wrong kind.
const STATUS_NOT_FOUND: u8 = 3;
/// Status byte for `W`/`V`: no such control or wrong kind.
const STATUS_NO_STATE: u8 = 2;

/// Something the runtime must do on the engine's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send this datagram (device-id frame included).
    Send(Vec<u8>),
    /// Restart the sensor push timer with this period, or stop it.
    SchedulePush(Option<Duration>),
}

pub struct ProtocolEngine {
    identity: DeviceIdentity,
    registry: ControlRegistry,
    router: PointerRouter,
    session: SessionState,
    canvas: Size,
    collaborators: Collaborators,
    push_seq: SequenceCounter,
}

impl ProtocolEngine {
    pub fn new(
        identity: DeviceIdentity,
        registry: ControlRegistry,
        session: SessionState,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            identity,
            registry,
            router: PointerRouter::new(),
            session,
            canvas: Size::default(),
            collaborators,
            push_seq: SequenceCounter::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// The password the server must present right now.
    pub fn current_password(&mut self, now: SystemTime) -> u64 {
        self.identity.current_password(now)
    }

    /// Replaces the password.  Any peer still using the old one is locked out.
    pub fn regenerate_password(&mut self, now: SystemTime) -> u64 {
        self.identity.regenerate(now)
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Records the render surface size used for controls added from now on.
    pub fn set_canvas_size(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "canvas resized");
        self.canvas = size;
    }

    /// Adds a control directly, bypassing the wire.
    pub fn add_control(&mut self, control: Control) -> AddStatus {
        self.registry.try_add(control)
    }

    // ── Inbound datagrams ─────────────────────────────────────────────────────

    /// Handles one inbound datagram and returns what to do about it.
    pub fn handle_datagram(&mut self, payload: &[u8], now: SystemTime) -> Vec<Effect> {
        match self.dispatch(payload, now) {
            Ok(effects) => effects,
            Err(DropReason::UnknownOpcode(op)) => {
                debug!("dropping request with unknown opcode 0x{op:02X}");
                Vec::new()
            }
            Err(reason) => {
                trace!(len = payload.len(), "dropping datagram: {reason}");
                Vec::new()
            }
        }
    }

    fn dispatch(&mut self, payload: &[u8], now: SystemTime) -> Result<Vec<Effect>, DropReason> {
        if !self.session.is_live() {
            return Err(DropReason::NotLive);
        }
        if is_heartbeat_ack(payload) {
            if self.session.acknowledge() {
                info!("server acknowledged heartbeat, connected");
                self.registry.sink().notify("connected");
            }
            return Ok(Vec::new());
        }

        authenticate(payload, self.identity.current_password(now))?;
        let op = Opcode::try_from(payload[0]).map_err(|()| DropReason::UnknownOpcode(payload[0]))?;
        let body = &payload[AUTH_HEADER_LEN..];
        trace!(?op, len = payload.len(), "dispatching request");

        if let Some(kind) = op.sensor_kind() {
            let values = self.collaborators.sensors.read(kind).unwrap_or_default();
            return Ok(vec![self.reply(&encode_reading(kind, &values))]);
        }
        if op.is_add_control() {
            let control = parse_add_control(op, payload, self.canvas)?;
            let status = self.registry.try_add(control);
            return Ok(vec![self.reply(&[op as u8, status as u8])]);
        }

        let effects = match op {
            Opcode::Heartbeat => Vec::new(),
            Opcode::Echo => vec![self.reply(&[op as u8])],
            Opcode::SetPushPeriods => {
                let period = select_period(&parse_periods(body)?);
                debug!(?period, "sensor push period changed");
                vec![Effect::SchedulePush(period), self.reply(&[op as u8])]
            }
            Opcode::ClearControls => {
                require_empty(body)?;
                self.registry.clear();
                self.router.reset();
                vec![self.reply(&[op as u8])]
            }
            Opcode::RemoveControl => {
                self.registry.remove(body);
                vec![self.reply(&[op as u8])]
            }
            Opcode::SetText => {
                let mut r = PayloadReader::new(body);
                let id = r.short_bytes()?;
                let is_text = self
                    .registry
                    .get(id)
                    .and_then(Control::as_text_like)
                    .is_some();
                if !is_text {
                    return Ok(vec![self.reply(&[op as u8, STATUS_NOT_FOUND])]);
                }
                let text = r.rest_utf8()?;
                self.registry.update(id, |c| {
                    if let Some(target) = c.as_text_like_mut() {
                        target.set_text(text);
                    }
                });
                vec![self.reply(&[op as u8, STATUS_OK])]
            }
            Opcode::GetText => {
                let reply = match self.registry.get(body).and_then(Control::as_text_like) {
                    Some(t) => PayloadWriter::with_opcode(op as u8)
                        .u8(STATUS_OK)
                        .bytes(t.text().as_bytes())
                        .finish(),
                    None => vec![op as u8, STATUS_NOT_FOUND],
                };
                vec![self.reply(&reply)]
            }
            Opcode::SetImage => {
                let mut r = PayloadReader::new(body);
                let id = r.short_bytes()?;
                let encoded = r.rest();
                return Ok(self.set_image(id, encoded));
            }
            Opcode::GetImage => return Ok(self.get_image(body)),
            Opcode::SetToggleState => {
                let mut r = PayloadReader::new(body);
                let checked = r.flag()?;
                let id = r.rest();
                let applied = self.set_toggle(id, checked);
                vec![self.reply(&[op as u8, status(applied)])]
            }
            Opcode::GetToggleState => {
                let state = match self.registry.get(body).and_then(Control::as_toggle_like) {
                    Some(t) => u8::from(t.is_checked()),
                    None => STATUS_NO_STATE,
                };
                vec![self.reply(&[op as u8, state])]
            }
            Opcode::IsPressed => {
                let state = match self.registry.get(body).and_then(Control::as_push_like) {
                    Some(p) => u8::from(p.is_pressed()),
                    None => STATUS_NO_STATE,
                };
                vec![self.reply(&[op as u8, state])]
            }
            Opcode::GetPosition => {
                let w = PayloadWriter::with_opcode(op as u8);
                let reply = match self.registry.get(body).and_then(Control::as_position_like) {
                    Some(p) => match p.position() {
                        Some((x, y)) => w.u8(1).f32(x).f32(y),
                        None => w.u8(0),
                    },
                    None => w,
                };
                vec![self.reply(&reply.finish())]
            }
            // Sensor and add opcodes returned above.
            _ => Vec::new(),
        };
        Ok(effects)
    }

    fn set_image(&mut self, id: &[u8], encoded: &[u8]) -> Vec<Effect> {
        let op = Opcode::SetImage as u8;
        let is_image = self
            .registry
            .get(id)
            .and_then(Control::as_image_like)
            .is_some();
        if !is_image {
            return vec![self.reply(&[op, STATUS_NOT_FOUND])];
        }
        let Some(image) = self.collaborators.image_codec.decode(encoded) else {
            debug!(len = encoded.len(), "image decode failed, ignoring");
            return Vec::new();
        };
        self.registry.update(id, |c| {
            if let Some(target) = c.as_image_like_mut() {
                target.set_image(image);
            }
        });
        vec![self.reply(&[op, STATUS_OK])]
    }

    fn get_image(&self, id: &[u8]) -> Vec<Effect> {
        let op = Opcode::GetImage as u8;
        let Some(target) = self.registry.get(id).and_then(Control::as_image_like) else {
            return vec![self.reply(&[op, STATUS_NOT_FOUND])];
        };
        match encode_within_budget(self.collaborators.image_codec.as_ref(), target.image()) {
            Some(bytes) => {
                let reply = PayloadWriter::with_opcode(op).u8(STATUS_OK).bytes(&bytes).finish();
                vec![self.reply(&reply)]
            }
            None => {
                debug!("image encode failed, not replying");
                Vec::new()
            }
        }
    }

    /// Sets a toggle or radio button.  Checking a radio button unchecks the
    /// rest of its group.
    fn set_toggle(&mut self, id: &[u8], checked: bool) -> bool {
        let Some(key) = self.registry.key_of(id) else {
            return false;
        };
        let applied = self
            .registry
            .update_by_key(key, |c| {
                c.as_toggle_like_mut()
                    .map(|t| t.set_checked(checked))
                    .is_some()
            })
            .unwrap_or(false);
        if applied && checked {
            self.registry.select_radio(key);
        }
        applied
    }

    // ── Pointer input ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, pointer: PointerId, p: Point, now: Instant) -> Vec<Effect> {
        let routed = self.router.down(&mut self.registry, pointer, p, now);
        self.apply(routed)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, p: Point, now: Instant) -> Vec<Effect> {
        let routed = self.router.move_to(&mut self.registry, pointer, p, now);
        self.apply(routed)
    }

    pub fn pointer_up(&mut self, pointer: PointerId, p: Point, now: Instant) -> Vec<Effect> {
        let routed = self.router.up(&mut self.registry, pointer, p, now);
        self.apply(routed)
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId, now: Instant) -> Vec<Effect> {
        let routed = self.router.cancel(&mut self.registry, pointer, now);
        self.apply(routed)
    }

    fn apply(&mut self, routed: Option<Routed>) -> Vec<Effect> {
        let Some(Routed { key, interaction }) = routed else {
            return Vec::new();
        };
        match interaction {
            Interaction::None | Interaction::Redraw => Vec::new(),
            Interaction::Emit(event) => self.emit(&event),
            Interaction::RequestTextEdit { initial } => {
                self.collaborators.text_editor.request_edit(key, &initial);
                Vec::new()
            }
            Interaction::RequestImage => {
                self.collaborators.image_picker.request_image(key);
                Vec::new()
            }
        }
    }

    /// Delivers the result of a text-entry dialog.  `None` means cancelled.
    ///
    /// A result for a control that has since been removed is discarded.
    pub fn complete_text_edit(&mut self, key: InstanceKey, text: Option<String>) -> Vec<Effect> {
        let Some(text) = text else {
            return Vec::new();
        };
        match self
            .registry
            .update_by_key(key, |c| c.complete_text_edit(text))
            .flatten()
        {
            Some(event) => self.emit(&event),
            None => Vec::new(),
        }
    }

    /// Delivers the result of an image picker.  `None` means cancelled.
    pub fn complete_image_pick(&mut self, key: InstanceKey, image: Option<RawImage>) -> Vec<Effect> {
        let Some(image) = image else {
            return Vec::new();
        };
        match self
            .registry
            .update_by_key(key, |c| c.complete_image_pick(image))
            .flatten()
        {
            Some(event) => self.emit(&event),
            None => Vec::new(),
        }
    }

    fn emit(&self, event: &ControlEvent) -> Vec<Effect> {
        if !self.session.is_live() {
            trace!(id = %event.id(), "not live, event not sent");
            return Vec::new();
        }
        vec![self.reply(&event.encode())]
    }

    // ── Connection lifecycle and timers ───────────────────────────────────────

    /// A new link is up: go live and ask the server to acknowledge.
    pub fn on_connected(&mut self) -> Vec<Effect> {
        self.session.mark_live();
        info!(device = %self.identity.id(), "link established");
        self.send_if_live(&[EventOpcode::Heartbeat as u8, 0])
    }

    pub fn on_disconnected(&mut self) {
        self.session.mark_disconnected();
        self.router.reset();
    }

    /// The periodic keep-alive.
    pub fn heartbeat(&self) -> Vec<Effect> {
        self.send_if_live(&[EventOpcode::Heartbeat as u8])
    }

    /// One sensor push tick.
    pub fn sensor_push_tick(&mut self) -> Vec<Effect> {
        if !self.session.is_live() {
            return Vec::new();
        }
        let seq = self.push_seq.next();
        let packet = encode_push(seq, self.collaborators.sensors.as_ref());
        vec![self.reply(&packet)]
    }

    fn send_if_live(&self, payload: &[u8]) -> Vec<Effect> {
        if self.session.is_live() {
            vec![self.reply(payload)]
        } else {
            Vec::new()
        }
    }

    fn reply(&self, payload: &[u8]) -> Effect {
        Effect::Send(frame_outbound(&self.identity.id(), payload))
    }
}

fn status(applied: bool) -> u8 {
    if applied {
        STATUS_OK
    } else {
        STATUS_NOT_FOUND
    }
}

impl std::fmt::Debug for ProtocolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolEngine")
            .field("device", &self.identity.id())
            .field("controls", &self.registry.len())
            .field("session", &self.session)
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}
