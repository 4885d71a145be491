use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Notify;
use zigbee_api::models::{Device, DeviceId, DeviceStatus, Rule, StatusResponse, TargetMap};
use zigbee_api::{ApiResponse, Gateway, StateEnvelope};
use zigbee_panel::codec::RuleCodec;
use zigbee_panel::controller::ViewController;

/// In-memory backend that applies pushes the way the real service does.
pub struct MockGateway {
    backend: Mutex<StatusResponse>,
    fetch_failures: Mutex<VecDeque<ApiResponse>>,
    push_failures: Mutex<VecDeque<ApiResponse>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub pushed_rules: Mutex<Vec<Vec<Rule>>>,
    pub pushed_states: Mutex<Vec<BTreeMap<DeviceId, bool>>>,
    pub fetch_count: AtomicUsize,
}

impl MockGateway {
    pub fn new(backend: StatusResponse) -> Arc<Self> {
        Arc::new(Self {
            backend: Mutex::new(backend),
            fetch_failures: Mutex::new(VecDeque::new()),
            push_failures: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            pushed_rules: Mutex::new(Vec::new()),
            pushed_states: Mutex::new(Vec::new()),
            fetch_count: AtomicUsize::new(0),
        })
    }

    pub fn with_rules(rules: Vec<Rule>) -> Arc<Self> {
        Self::new(create_backend(rules))
    }

    pub fn fail_next_fetch(&self, response: ApiResponse) {
        self.fetch_failures.lock().unwrap().push_back(response);
    }

    pub fn fail_next_push(&self, response: ApiResponse) {
        self.push_failures.lock().unwrap().push_back(response);
    }

    /// Makes every fetch wait until the returned handle is notified.
    pub fn hold_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn release_fetches(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn set_rules(&self, rules: Vec<Rule>) {
        self.backend.lock().unwrap().rules = rules;
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.backend.lock().unwrap().rules.clone()
    }

    pub fn status(&self) -> BTreeMap<DeviceId, DeviceStatus> {
        self.backend.lock().unwrap().status.clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn next_push_failure(&self) -> Option<ApiResponse> {
        self.push_failures.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_state(&self) -> StateEnvelope {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(response) = self.fetch_failures.lock().unwrap().pop_front() {
            return StateEnvelope::failed(response);
        }

        StateEnvelope {
            response: ApiResponse::completed(200, "OK", ""),
            state: Some(self.backend.lock().unwrap().clone()),
        }
    }

    async fn push_device_state(&self, state: &BTreeMap<DeviceId, bool>) -> ApiResponse {
        self.pushed_states.lock().unwrap().push(state.clone());
        if let Some(response) = self.next_push_failure() {
            return response;
        }

        let mut backend = self.backend.lock().unwrap();
        for (id, on) in state {
            if let Some(status) = backend.status.get_mut(id) {
                *status = if *on { DeviceStatus::On } else { DeviceStatus::Off };
            }
        }
        ApiResponse::completed(200, "OK", "")
    }

    async fn push_rules(&self, rules: &[Rule]) -> ApiResponse {
        self.pushed_rules.lock().unwrap().push(rules.to_vec());
        if let Some(response) = self.next_push_failure() {
            return response;
        }

        self.backend.lock().unwrap().rules = rules.to_vec();
        ApiResponse::completed(200, "OK", "")
    }
}

pub fn create_device(id: &str, name: &str) -> Device {
    Device {
        id: id.to_string(),
        name: name.to_string(),
        kind: "plug".to_string(),
    }
}

pub fn create_rule(name: &str, enabled: bool) -> Rule {
    Rule {
        name: name.to_string(),
        enabled,
        timestamp: datetime!(2023-09-12 19:30 UTC),
        repeat: 0,
        target: TargetMap::new().with_device("d1"),
    }
}

pub fn create_rule_at(name: &str, timestamp: OffsetDateTime) -> Rule {
    Rule {
        timestamp,
        ..create_rule(name, true)
    }
}

/// Three devices; `dX` is known but has no status entry.
pub fn create_backend(rules: Vec<Rule>) -> StatusResponse {
    StatusResponse {
        status: BTreeMap::from([
            ("d1".to_string(), DeviceStatus::On),
            ("d2".to_string(), DeviceStatus::Off),
        ]),
        update_ok: true,
        update_status: "connected".to_string(),
        update_time: 1_694_550_000,
        rules,
        devices: vec![
            create_device("d1", "Lamp"),
            create_device("d2", "Heater"),
            create_device("dX", "Ghost"),
        ],
    }
}

pub fn create_controller(gateway: Arc<MockGateway>) -> Arc<ViewController> {
    Arc::new(ViewController::new(gateway, RuleCodec::default(), "/login.html"))
}
