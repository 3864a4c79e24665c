use std::sync::atomic::{AtomicUsize, Ordering};

use console::style;
use sysevent_core::{EventRecord, EventType, QueryCallback, SubscribeCallback};

use crate::format::{format_event_type, format_record};

/// Prints every event delivered to the subscription
#[derive(Default)]
pub struct ToolListener {
    received: AtomicUsize,
}

impl ToolListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

impl SubscribeCallback for ToolListener {
    fn on_event(&self, domain: &str, event_name: &str, event_type: EventType, event_detail: &str) {
        self.received.fetch_add(1, Ordering::Relaxed);
        match EventRecord::from_json(event_detail) {
            Ok(record) => println!("{}", format_record(&record)),
            Err(e) => println!(
                "{}/{} {} {} ({})",
                domain,
                event_name,
                format_event_type(event_type),
                event_detail,
                style(e).red()
            ),
        }
    }

    fn on_service_died(&self) {
        eprintln!("{} service died", style("Warning:").yellow().bold());
    }
}

/// Prints query results as they arrive
pub struct ToolQueryCallback;

impl QueryCallback for ToolQueryCallback {
    fn on_query(&self, records: &[String]) {
        for raw in records {
            match EventRecord::from_json(raw) {
                Ok(record) => println!("{}", format_record(&record)),
                Err(_) => println!("{}", raw),
            }
        }
    }

    fn on_complete(&self, reason: i32, total: i32) {
        println!(
            "{} {} events (reason={})",
            style("✓").green().bold(),
            total,
            reason
        );
    }
}
