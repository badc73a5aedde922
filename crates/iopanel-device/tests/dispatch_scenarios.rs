//! End-to-end request handling through the public engine API.
//!
//! Each test builds a live engine with a known password, feeds it raw
//! datagrams exactly as the server would send them and checks the framed
//! replies.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use iopanel_core::domain::controls::TextLike;
use iopanel_core::protocol::codec::encode_u64;
use iopanel_core::protocol::{PayloadWriter, FRAME_PREFIX_LEN};
use iopanel_core::{ControlRegistry, DeviceId, DeviceIdentity, Point, PointerId, Size};
use iopanel_device::application::collaborators::Collaborators;
use iopanel_device::application::engine::{Effect, ProtocolEngine};
use iopanel_device::application::session::SessionState;
use iopanel_device::infrastructure::collaborators::{
    RawImageCodec, RecordingImagePicker, RecordingTextEditor, StaticSensors, WatchRenderSink,
};

const PASSWORD: u64 = 987_654_321;
const DEVICE: [u8; 6] = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01];

struct Harness {
    engine: ProtocolEngine,
    sink: Arc<WatchRenderSink>,
    editor: Arc<RecordingTextEditor>,
}

fn harness() -> Harness {
    let sink = Arc::new(WatchRenderSink::new());
    let editor = Arc::new(RecordingTextEditor::new());
    let collaborators = Collaborators {
        sensors: Arc::new(StaticSensors::new()),
        text_editor: editor.clone(),
        image_picker: Arc::new(RecordingImagePicker::new()),
        image_codec: Arc::new(RawImageCodec),
    };
    let identity = DeviceIdentity::with_password(
        DeviceId::from_bytes(DEVICE),
        PASSWORD,
        SystemTime::now() + Duration::from_secs(3600),
    );
    let mut engine = ProtocolEngine::new(
        identity,
        ControlRegistry::new(sink.clone()),
        SessionState::new(false),
        collaborators,
    );
    engine.set_canvas_size(Size::new(1000.0, 2000.0));
    engine.on_connected();
    Harness {
        engine,
        sink,
        editor,
    }
}

fn request(op: u8, body: &[u8]) -> Vec<u8> {
    PayloadWriter::with_opcode(op)
        .bytes(&encode_u64(PASSWORD))
        .bytes(body)
        .finish()
}

fn add_button_body(id: &[u8], text: &str) -> Vec<u8> {
    PayloadWriter::default()
        .f32(10.0)
        .f32(10.0)
        .f32(40.0)
        .f32(20.0)
        .u32(0xFF00_0000)
        .u32(0xFFFF_FFFF)
        .f32(1.0)
        .u8(0)
        .u8(0)
        .short_bytes(id)
        .bytes(text.as_bytes())
        .finish()
}

/// Sends `datagram` and returns the reply payloads, checking each frame.
fn exchange(engine: &mut ProtocolEngine, datagram: &[u8]) -> Vec<Vec<u8>> {
    payloads(&engine.handle_datagram(datagram, SystemTime::now()))
}

fn payloads(effects: &[Effect]) -> Vec<Vec<u8>> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send(d) => {
                assert_eq!(&d[..6], &DEVICE, "frame must start with the device id");
                assert_eq!(&d[6..FRAME_PREFIX_LEN], &[0, 0, 0, 0]);
                Some(d[FRAME_PREFIX_LEN..].to_vec())
            }
            Effect::SchedulePush(_) => None,
        })
        .collect()
}

#[test]
fn test_add_button_then_read_its_text() {
    // Arrange
    let mut h = harness();

    // Act
    let added = exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Go")));
    let text = exchange(&mut h.engine, &request(b'h', b"b1"));

    // Assert
    assert_eq!(added, vec![vec![b'B', 0]]);
    assert_eq!(text, vec![b"h\0Go".to_vec()]);
    let button = h.engine.registry().get(b"b1").unwrap();
    assert_eq!(button.frame().rect.x, 100.0);
    assert_eq!(button.frame().rect.y, 200.0);
    assert_eq!(button.frame().rect.width, 400.0);
    assert_eq!(button.frame().rect.height, 400.0);
}

#[test]
fn test_duplicate_add_reports_two_and_keeps_original() {
    // Arrange
    let mut h = harness();
    exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Go")));

    // Act
    let second = exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Stop")));

    // Assert
    assert_eq!(second, vec![vec![b'B', 2]]);
    assert_eq!(h.engine.registry().len(), 1);
    let original = h.engine.registry().get(b"b1").unwrap();
    assert_eq!(original.as_text_like().map(|t| t.text()), Some("Go"));
}

#[test]
fn test_add_with_invalid_utf8_text_creates_nothing() {
    // Arrange
    let mut h = harness();
    let mut body = add_button_body(b"b9", "");
    body.extend_from_slice(&[0xFF, 0xFE]);

    // Act
    let reply = exchange(&mut h.engine, &request(b'B', &body));

    // Assert
    assert!(reply.is_empty());
    assert!(h.engine.registry().is_empty());
}

#[test]
fn test_button_emits_on_press_only() {
    // Arrange
    let mut h = harness();
    exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Go")));
    let inside = Point::new(200.0, 300.0);
    let now = Instant::now();

    // Act
    let down = h.engine.pointer_down(PointerId(1), inside, now);
    let up = h.engine.pointer_up(PointerId(1), inside, now);

    // Assert
    assert_eq!(payloads(&down), vec![b"bb1".to_vec()]);
    assert!(payloads(&up).is_empty());
}

#[test]
fn test_clear_makes_old_ids_unknown() {
    let mut h = harness();
    exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Go")));

    assert_eq!(exchange(&mut h.engine, &request(b'C', &[])), vec![vec![b'C']]);
    assert_eq!(exchange(&mut h.engine, &request(b'h', b"b1")), vec![vec![b'h', 3]]);
}

#[test]
fn test_registry_refuses_the_1025th_control() {
    // Arrange
    let mut h = harness();
    for i in 0..1024u32 {
        let id = format!("c{i}");
        let reply = exchange(&mut h.engine, &request(b'B', &add_button_body(id.as_bytes(), "")));
        assert_eq!(reply, vec![vec![b'B', 0]]);
    }

    // Act
    let reply = exchange(&mut h.engine, &request(b'B', &add_button_body(b"one-more", "")));

    // Assert
    assert_eq!(reply, vec![vec![b'B', 1]]);
    assert_eq!(h.engine.registry().len(), 1024);
}

#[test]
fn test_bad_password_gets_no_reply_for_any_opcode() {
    let mut h = harness();
    let wrong = PASSWORD + 1;
    for op in b"aCcHhiuwWVJgBTUjNZyAGLYRrMmPSlXOp" {
        let datagram = PayloadWriter::with_opcode(*op)
            .bytes(&encode_u64(wrong))
            .bytes(&[0; 64])
            .finish();
        assert!(
            exchange(&mut h.engine, &datagram).is_empty(),
            "opcode {} answered",
            *op as char
        );
    }
}

#[test]
fn test_heartbeat_ack_notifies_connected_once() {
    let mut h = harness();
    exchange(&mut h.engine, b"I");
    exchange(&mut h.engine, b"I");
    assert_eq!(*h.sink.messages.lock().unwrap(), vec!["connected".to_string()]);
}

#[test]
fn test_text_field_edit_round_trip() {
    // Arrange – a text field covering the top-left quarter
    let mut h = harness();
    let body = PayloadWriter::default()
        .f32(0.0)
        .f32(0.0)
        .f32(50.0)
        .f32(50.0)
        .u32(0xFFFF_FFFF)
        .u32(0xFF00_0000)
        .f32(1.0)
        .u8(0)
        .u8(0)
        .u8(0)
        .short_bytes(b"name")
        .bytes(b"Ada")
        .finish();
    assert_eq!(exchange(&mut h.engine, &request(b'T', &body)), vec![vec![b'T', 0]]);

    // Act
    let tap = h
        .engine
        .pointer_down(PointerId(3), Point::new(10.0, 10.0), Instant::now());
    let (key, initial) = h.editor.requests.lock().unwrap()[0].clone();
    let done = h.engine.complete_text_edit(key, Some("Grace".into()));

    // Assert
    assert!(tap.is_empty());
    assert_eq!(initial, "Ada");
    assert_eq!(payloads(&done), vec![b"t\x04nameGrace".to_vec()]);
}

#[test]
fn test_redraw_is_signalled_for_mutations() {
    let mut h = harness();
    let before = h.sink.generation();
    exchange(&mut h.engine, &request(b'B', &add_button_body(b"b1", "Go")));
    assert!(h.sink.generation() > before);
}
