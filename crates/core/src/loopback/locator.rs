use std::sync::{Arc, Mutex};

use crate::registry::{ServiceLocator, SysEventService};

/// Locator whose resolved handle can be replaced or withdrawn at runtime.
pub struct SwappableLocator {
    current: Mutex<Option<Arc<dyn SysEventService>>>,
}

impl SwappableLocator {
    pub fn new(service: Option<Arc<dyn SysEventService>>) -> Self {
        Self {
            current: Mutex::new(service),
        }
    }

    pub fn set(&self, service: Option<Arc<dyn SysEventService>>) {
        *self.current.lock().expect("locator poisoned") = service;
    }
}

impl ServiceLocator for SwappableLocator {
    fn get_service(&self) -> Option<Arc<dyn SysEventService>> {
        self.current.lock().expect("locator poisoned").clone()
    }
}
