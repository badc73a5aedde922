//! The runtime loop driven over in-memory links.
//!
//! `ChannelConnector` hands out links backed by unbounded channels, so a
//! test plays the server: it reads what the device sent and injects
//! datagrams, with no sockets involved.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use iopanel_core::protocol::codec::encode_u64;
use iopanel_core::protocol::{PayloadWriter, FRAME_PREFIX_LEN};
use iopanel_core::{ControlRegistry, DeviceId, DeviceIdentity};
use iopanel_device::application::collaborators::{
    Collaborators, PersistentKv, KEY_RUN_IN_BACKGROUND,
};
use iopanel_device::application::engine::ProtocolEngine;
use iopanel_device::application::session::SessionState;
use iopanel_device::infrastructure::collaborators::{
    MemoryKv, RawImageCodec, RecordingImagePicker, RecordingTextEditor, StaticSensors,
};
use iopanel_device::infrastructure::network::runtime::{PanelInput, PanelRuntime, RuntimeConfig};
use iopanel_device::infrastructure::network::{Connector, DatagramLink, NetworkError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const PASSWORD: u64 = 55_555;
const WAIT: Duration = Duration::from_secs(2);

// ── In-memory transport ───────────────────────────────────────────────────────

struct ChannelLink {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

#[async_trait]
impl DatagramLink for ChannelLink {
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        let mut inbound = self.inbound.lock().await;
        let datagram = inbound.recv().await.ok_or(NetworkError::Closed)?;
        buf[..datagram.len()].copy_from_slice(&datagram);
        Ok(datagram.len())
    }

    fn try_send(&self, datagram: &[u8]) -> Result<(), NetworkError> {
        self.outbound
            .send(datagram.to_vec())
            .map_err(|_| NetworkError::Closed)
    }
}

/// The server's end of one link.
struct ServerEnd {
    to_device: mpsc::UnboundedSender<Vec<u8>>,
    from_device: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl ServerEnd {
    /// Next payload from the device, frame prefix stripped.
    async fn next(&mut self) -> Vec<u8> {
        let datagram = timeout(WAIT, self.from_device.recv())
            .await
            .expect("device sent nothing in time")
            .expect("link dropped");
        datagram[FRAME_PREFIX_LEN..].to_vec()
    }

    async fn silent_for(&mut self, window: Duration) -> bool {
        timeout(window, self.from_device.recv()).await.is_err()
    }

    fn send(&self, datagram: Vec<u8>) {
        self.to_device.send(datagram).unwrap();
    }
}

#[derive(Default)]
struct ChannelConnector {
    links: Mutex<VecDeque<ChannelLink>>,
    connects: Mutex<u32>,
}

impl ChannelConnector {
    fn offer_link(&self) -> ServerEnd {
        let (to_device, inbound) = mpsc::unbounded_channel();
        let (outbound, from_device) = mpsc::unbounded_channel();
        self.links.lock().unwrap().push_back(ChannelLink {
            inbound: tokio::sync::Mutex::new(inbound),
            outbound,
        });
        ServerEnd {
            to_device,
            from_device,
        }
    }

    fn connects(&self) -> u32 {
        *self.connects.lock().unwrap()
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self) -> Result<Box<dyn DatagramLink>, NetworkError> {
        *self.connects.lock().unwrap() += 1;
        match self.links.lock().unwrap().pop_front() {
            Some(link) => Ok(Box::new(link)),
            None => Err(NetworkError::Closed),
        }
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Device {
    inputs: mpsc::Sender<PanelInput>,
    task: JoinHandle<ProtocolEngine>,
}

impl Device {
    async fn shutdown(self) -> ProtocolEngine {
        self.inputs.send(PanelInput::Shutdown).await.unwrap();
        timeout(WAIT, self.task).await.unwrap().unwrap()
    }
}

fn start(
    connector: Arc<ChannelConnector>,
    kv: Arc<MemoryKv>,
    heartbeat_interval: Duration,
) -> Device {
    let collaborators = Collaborators {
        sensors: Arc::new(StaticSensors::new()),
        text_editor: Arc::new(RecordingTextEditor::new()),
        image_picker: Arc::new(RecordingImagePicker::new()),
        image_codec: Arc::new(RawImageCodec),
    };
    let engine = ProtocolEngine::new(
        DeviceIdentity::with_password(
            DeviceId::from_bytes([6, 5, 4, 3, 2, 1]),
            PASSWORD,
            SystemTime::now() + Duration::from_secs(3600),
        ),
        ControlRegistry::headless(),
        SessionState::new(false),
        collaborators,
    );
    let config = RuntimeConfig {
        heartbeat_interval,
        reconnect_delay: Duration::from_millis(20),
    };
    let (inputs, rx) = mpsc::channel(16);
    let runtime = PanelRuntime::new(engine, connector, kv, rx, config);
    Device {
        inputs,
        task: tokio::spawn(runtime.run()),
    }
}

fn echo_request() -> Vec<u8> {
    PayloadWriter::with_opcode(b'a')
        .bytes(&encode_u64(PASSWORD))
        .finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_sends_heartbeat_requesting_ack() {
    // Arrange
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();

    // Act
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_secs(60));

    // Assert
    assert_eq!(server.next().await, vec![b'I', 0]);
    device.shutdown().await;
}

#[tokio::test]
async fn test_requests_are_answered_over_the_link() {
    // Arrange
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_secs(60));
    server.next().await;

    // Act
    server.send(echo_request());

    // Assert
    assert_eq!(server.next().await, vec![b'a']);
    device.shutdown().await;
}

#[tokio::test]
async fn test_periodic_heartbeat_follows_connect() {
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_millis(30));

    assert_eq!(server.next().await, vec![b'I', 0]);
    assert_eq!(server.next().await, vec![b'I']);
    device.shutdown().await;
}

#[tokio::test]
async fn test_background_without_override_stops_processing() {
    // Arrange
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_secs(60));
    server.next().await;

    // Act
    device.inputs.send(PanelInput::Foreground(false)).await.unwrap();
    server.send(echo_request());

    // Assert
    assert!(server.silent_for(Duration::from_millis(150)).await);
    device.shutdown().await;
}

#[tokio::test]
async fn test_background_override_keeps_session_live_and_is_persisted() {
    // Arrange
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();
    let kv = Arc::new(MemoryKv::new());
    let device = start(connector.clone(), kv.clone(), Duration::from_secs(60));
    server.next().await;

    // Act
    device.inputs.send(PanelInput::RunInBackground(true)).await.unwrap();
    device.inputs.send(PanelInput::Foreground(false)).await.unwrap();
    server.send(echo_request());

    // Assert
    assert_eq!(server.next().await, vec![b'a']);
    assert_eq!(kv.get(KEY_RUN_IN_BACKGROUND), Some(vec![1]));
    device.shutdown().await;
}

#[tokio::test]
async fn test_lost_link_is_replaced_in_foreground() {
    // Arrange
    let connector = Arc::new(ChannelConnector::default());
    let first = connector.offer_link();
    let mut second = connector.offer_link();
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_secs(60));

    // Act – the server side of the first link goes away
    drop(first);

    // Assert
    assert_eq!(second.next().await, vec![b'I', 0]);
    assert_eq!(connector.connects(), 2);
    second.send(echo_request());
    assert_eq!(second.next().await, vec![b'a']);
    device.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_returns_a_disconnected_engine() {
    let connector = Arc::new(ChannelConnector::default());
    let mut server = connector.offer_link();
    let device = start(connector.clone(), Arc::new(MemoryKv::new()), Duration::from_secs(60));
    server.next().await;

    let engine = device.shutdown().await;

    assert!(engine.registry().is_empty());
    assert!(!engine.session().is_live());
}
