//! Scripted doubles for the inference and geocoding boundaries.
//!
//! `ScriptedInference` matches incoming prompts by substring so replies stay
//! deterministic even when the orchestrator runs posts concurrently.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use geocode_client::{Coordinates, GeocodeError, Geocoder};
use inference_client::{Inference, InferenceError, SchemaRequest};

pub enum Reply {
    Json(serde_json::Value),
    Fault,
}

pub fn classify(genuine: bool) -> Reply {
    Reply::Json(json!({ "genuine_disaster": genuine }))
}

pub fn attributes(disaster_type: &str, location: &str) -> Reply {
    Reply::Json(json!({
        "disaster_type": disaster_type,
        "disaster_location": location,
    }))
}

pub fn severity(daily_living: u8, infrastructure: u8, loss_of_life: u8, response: u8) -> Reply {
    Reply::Json(json!({
        "daily_living_impact_justification": "scripted",
        "daily_living_impact_score": daily_living,
        "infrastructure_impact_justification": "scripted",
        "infrastructure_impact_score": infrastructure,
        "loss_of_life_justification": "scripted",
        "loss_of_life_score": loss_of_life,
        "emergency_response_justification": "scripted",
        "emergency_response_score": response,
    }))
}

pub fn fault() -> Reply {
    Reply::Fault
}

/// Substring-routed inference double. Each rule holds a queue of replies
/// consumed in order; prompts matching no rule fail the call.
pub struct ScriptedInference {
    rules: Mutex<Vec<(String, VecDeque<Reply>)>>,
    calls: Arc<AtomicU32>,
}

impl ScriptedInference {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Route prompts whose user message contains `needle` to `replies`.
    pub fn on(self, needle: &str, replies: Vec<Reply>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), replies.into()));
        self
    }

    /// Shared call counter, usable after the double moves into the analyzer.
    pub fn counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Inference for ScriptedInference {
    async fn structured(&self, request: SchemaRequest) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rules = self.rules.lock().unwrap();
        for (needle, queue) in rules.iter_mut() {
            if request.user.contains(needle.as_str()) {
                return match queue.pop_front() {
                    Some(Reply::Json(value)) => Ok(value.to_string()),
                    Some(Reply::Fault) => {
                        Err(InferenceError::Network("scripted fault".to_string()))
                    }
                    None => Err(InferenceError::Network(format!(
                        "script exhausted for '{needle}'"
                    ))),
                };
            }
        }
        Err(InferenceError::Network(format!(
            "no script matches prompt: {}",
            request.user
        )))
    }
}

/// Geocoder double with fixed answers per query and a shared call log.
pub struct ScriptedGeocoder {
    hits: HashMap<String, Coordinates>,
    faults: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            faults: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hit(mut self, query: &str, latitude: f64, longitude: f64) -> Self {
        self.hits.insert(
            query.to_string(),
            Coordinates {
                latitude,
                longitude,
            },
        );
        self
    }

    /// Queries that fail with a transport error instead of a clean miss.
    pub fn fault(mut self, query: &str) -> Self {
        self.faults.insert(query.to_string());
        self
    }

    /// Shared log of every query, in arrival order.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn lookup(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.lock().unwrap().push(place.to_string());
        if self.faults.contains(place) {
            return Err(GeocodeError::Network("scripted fault".to_string()));
        }
        Ok(self.hits.get(place).copied())
    }
}
