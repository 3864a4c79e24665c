use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    error::{Result, SysEventError},
    registry::{QueryCallback, QueryProxy, ServiceLocator},
    rules::{QueryArg, QueryRule, convert_query_rules},
};

/// One-shot historical queries. Holds no state between calls.
pub struct QueryExecutor {
    locator: Arc<dyn ServiceLocator>,
}

impl QueryExecutor {
    pub fn new(locator: Arc<dyn ServiceLocator>) -> Self {
        Self { locator }
    }

    /// Returns the service's outcome. The proxy wrapping `callback` is
    /// released when this call returns.
    pub fn query(
        &self,
        arg: &QueryArg,
        rules: &[QueryRule],
        callback: Arc<dyn QueryCallback>,
    ) -> Result<bool> {
        let Some(service) = self.locator.get_service() else {
            error!("fail to get service, query not sent");
            return Err(SysEventError::ServiceUnavailable);
        };
        let query_rules = convert_query_rules(rules)?;
        let proxy = QueryProxy::new(callback);

        debug!(
            "query begin={} end={} max={} rules={}",
            arg.begin_time,
            arg.end_time,
            arg.max_events,
            query_rules.len()
        );
        Ok(service.query(
            arg.begin_time,
            arg.end_time,
            arg.max_events,
            &query_rules,
            proxy,
        ))
    }
}
