mod common;

use std::sync::Arc;

use common::{Call, MockService, RecordingQuery};
use sysevent_core::{
    QueryArg, QueryExecutor, QueryRule, RuleType, SwappableLocator, SysEventError,
    SysEventService,
};

#[test]
fn query_forwards_arguments_and_converted_rules() {
    let service = MockService::new("primary");
    let handle: Arc<dyn SysEventService> = service.clone();
    let executor = QueryExecutor::new(Arc::new(SwappableLocator::new(Some(handle))));
    let callback = RecordingQuery::new();

    let arg = QueryArg {
        begin_time: 10,
        end_time: 20,
        max_events: 5,
    };
    let rules = vec![
        QueryRule::new("AAFWK", &["APP_CRASH"], RuleType::WholeWord),
        QueryRule::new("KERNEL", &[], RuleType::Prefix),
    ];

    assert_eq!(executor.query(&arg, &rules, callback.clone()), Ok(true));
    assert_eq!(
        service.calls(),
        vec![Call::Query {
            begin: 10,
            end: 20,
            max: 5,
            rules: 2
        }]
    );
    assert_eq!(*callback.completed.lock().unwrap(), Some((0, 1)));
}

#[test]
fn query_proxy_is_not_retained_after_the_call() {
    let service = MockService::new("primary");
    let handle: Arc<dyn SysEventService> = service.clone();
    let executor = QueryExecutor::new(Arc::new(SwappableLocator::new(Some(handle))));
    let callback = RecordingQuery::new();

    executor
        .query(&QueryArg::default(), &[], callback.clone())
        .expect("query");

    assert_eq!(Arc::strong_count(&callback), 1);
}

#[test]
fn invalid_query_rule_sends_nothing() {
    let service = MockService::new("primary");
    let handle: Arc<dyn SysEventService> = service.clone();
    let executor = QueryExecutor::new(Arc::new(SwappableLocator::new(Some(handle))));

    let rules = vec![QueryRule::new("", &["X"], RuleType::WholeWord)];
    let result = executor.query(&QueryArg::default(), &rules, RecordingQuery::new());

    assert!(matches!(result, Err(SysEventError::RuleConversion { .. })));
    assert!(service.calls().is_empty());
}
