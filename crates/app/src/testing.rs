//! In-memory BLE transport used by the unit tests of this crate.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use waveplus_domain::error::ExporterError;

use crate::ports::{Advertisement, BleTransport, GattLink};

/// Reference payload: humidity 130, radon 100/200, 2500 → 25 °C, 1209 → 24.18.
pub(crate) const REFERENCE_PAYLOAD: [u8; 20] = [
    0x01, 0x82, 0x00, 0x00, 0x64, 0x00, 0xC8, 0x00, 0xC4, 0x09, 0xB9, 0x04, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

pub(crate) const SERIAL_NUMBER: u32 = 123_456_789;

/// Manufacturer data advertising `serial`.
pub(crate) fn airthings_data(serial: u32) -> Vec<u8> {
    let mut data = vec![0x34, 0x03];
    data.extend_from_slice(&serial.to_le_bytes());
    data.extend_from_slice(&[0x09, 0x00]);
    data
}

#[derive(Debug)]
pub(crate) struct LinkDropped;

impl std::fmt::Display for LinkDropped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("link dropped")
    }
}

impl std::error::Error for LinkDropped {}

/// Calls observed by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Scan,
    Connect(u64),
    Characteristic(uuid::Uuid),
    Read,
    Disconnect,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Mutex<Vec<Call>>,
    open_links: AtomicUsize,
    max_open_links: AtomicUsize,
    failing_reads: AtomicU32,
}

impl Shared {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Fake transport whose scans find one advertising device after
/// `empty_windows` empty scans.
pub(crate) struct FakeTransport {
    advertisements: Vec<Advertisement<u64>>,
    empty_windows: u32,
    scans: AtomicU32,
    payload: Vec<u8>,
    read_delay: Duration,
    characteristic_delay: Duration,
    shared: Arc<Shared>,
}

impl FakeTransport {
    pub(crate) fn advertising(serial: u32) -> Self {
        Self {
            advertisements: vec![
                Advertisement {
                    address: 7,
                    manufacturer_data: vec![vec![0x99, 0x04, 0x05, 0x12]],
                },
                Advertisement {
                    address: 42,
                    manufacturer_data: vec![airthings_data(serial)],
                },
            ],
            empty_windows: 0,
            scans: AtomicU32::new(0),
            payload: REFERENCE_PAYLOAD.to_vec(),
            read_delay: Duration::ZERO,
            characteristic_delay: Duration::ZERO,
            shared: Arc::default(),
        }
    }

    pub(crate) fn silent() -> Self {
        Self {
            advertisements: Vec::new(),
            ..Self::advertising(0)
        }
    }

    pub(crate) fn with_empty_windows(mut self, empty_windows: u32) -> Self {
        self.empty_windows = empty_windows;
        self
    }

    pub(crate) fn with_payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub(crate) fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub(crate) fn with_characteristic_delay(mut self, delay: Duration) -> Self {
        self.characteristic_delay = delay;
        self
    }

    /// Handle for inspecting the fake after it moved into a session.
    pub(crate) fn recorder(&self) -> Recorder {
        Recorder(Arc::clone(&self.shared))
    }
}

#[derive(Clone)]
pub(crate) struct Recorder(Arc<Shared>);

impl Recorder {
    pub(crate) fn fail_next_reads(&self, count: u32) {
        self.0.failing_reads.store(count, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub(crate) fn open_links(&self) -> usize {
        self.0.open_links.load(Ordering::SeqCst)
    }

    pub(crate) fn max_open_links(&self) -> usize {
        self.0.max_open_links.load(Ordering::SeqCst)
    }
}

impl BleTransport for FakeTransport {
    type Address = u64;
    type Link = FakeLink;

    async fn scan(&self, window: Duration) -> Result<Vec<Advertisement<u64>>, ExporterError> {
        self.shared.record(Call::Scan);
        tokio::time::sleep(window).await;
        let seen = self.scans.fetch_add(1, Ordering::SeqCst);
        if seen < self.empty_windows {
            return Ok(Vec::new());
        }
        Ok(self.advertisements.clone())
    }

    async fn connect(&self, address: &u64) -> Result<FakeLink, ExporterError> {
        self.shared.record(Call::Connect(*address));
        let open = self.shared.open_links.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_open_links.fetch_max(open, Ordering::SeqCst);
        Ok(FakeLink {
            payload: self.payload.clone(),
            read_delay: self.read_delay,
            characteristic_delay: self.characteristic_delay,
            shared: Arc::clone(&self.shared),
        })
    }
}

pub(crate) struct FakeLink {
    payload: Vec<u8>,
    read_delay: Duration,
    characteristic_delay: Duration,
    shared: Arc<Shared>,
}

impl GattLink for FakeLink {
    type Characteristic = uuid::Uuid;

    async fn characteristic(&self, uuid: uuid::Uuid) -> Result<uuid::Uuid, ExporterError> {
        self.shared.record(Call::Characteristic(uuid));
        tokio::time::sleep(self.characteristic_delay).await;
        Ok(uuid)
    }

    async fn read(&self, _characteristic: &uuid::Uuid) -> Result<Vec<u8>, ExporterError> {
        self.shared.record(Call::Read);
        tokio::time::sleep(self.read_delay).await;
        let failing = self.shared.failing_reads.load(Ordering::SeqCst);
        if failing > 0 {
            self.shared.failing_reads.store(failing - 1, Ordering::SeqCst);
            return Err(ExporterError::Transport(Box::new(LinkDropped)));
        }
        Ok(self.payload.clone())
    }

    async fn disconnect(&self) -> Result<(), ExporterError> {
        self.shared.record(Call::Disconnect);
        self.shared.open_links.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
