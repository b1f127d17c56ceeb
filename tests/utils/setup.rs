//! Test setup infrastructure - builds the full router over an in-memory store
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::Router;
use serde_json::Value;
use std::sync::Arc;

use car_doctor::{
    app, config::DEFAULT_CLIENT_ORIGIN, cors_layer, session::ManualClock, store::Fields,
    AppState, Collection, Document, InMemoryDocumentStore, TokenService,
};

pub const TEST_SECRET: &str = "integration-secret";

pub struct TestSetup {
    pub app: Router,
    pub store: Arc<InMemoryDocumentStore>,
    pub clock: Arc<ManualClock>,
    pub services: Vec<Document>,
}

pub struct TestSetupBuilder {
    services: Vec<Value>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { services: vec![] }
    }

    pub fn with_services(mut self, services: Vec<Value>) -> Self {
        self.services = services;
        self
    }

    pub fn build(self) -> TestSetup {
        let services: Vec<Document> = self
            .services
            .into_iter()
            .map(|value| Document::new(as_fields(value)))
            .collect();

        let store = Arc::new(InMemoryDocumentStore::with_documents(
            Collection::Services,
            services.clone(),
        ));
        let clock = Arc::new(ManualClock::new());
        let tokens = Arc::new(TokenService::with_clock(TEST_SECRET, clock.clone()));

        let app = app(
            AppState::new(store.clone(), tokens),
            cors_layer(DEFAULT_CLIENT_ORIGIN).expect("default origin is valid"),
        );

        TestSetup {
            app,
            store,
            clock,
            services,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn as_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
