#[cfg(test)]
mod tests {
    use crate::events::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&serde_json::Value) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |tag: &str| -> Box<dyn Fn(&serde_json::Value) + Send + Sync> {
            let log = log_clone.clone();
            let tag = tag.to_string();
            Box::new(move |payload: &serde_json::Value| {
                log.lock().unwrap().push(format!("{}:{}", tag, payload));
            })
        };
        (log, make)
    }

    #[test]
    fn test_emit_in_subscription_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let _a = bus.subscribe("ping", make("a"));
        let _b = bus.subscribe("ping", make("b"));
        let _c = bus.subscribe("ping", make("c"));

        bus.emit("ping", json!({"status": 401}));

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                r#"a:{"status":401}"#.to_string(),
                r#"b:{"status":401}"#.to_string(),
                r#"c:{"status":401}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit("nobody-home", json!(null));
        assert_eq!(bus.listener_count("nobody-home"), 0);
    }

    #[test]
    fn test_events_are_scoped_by_name() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let _u = bus.subscribe(AUTH_UNAUTHORIZED, make("u"));
        let _f = bus.subscribe(AUTH_FORBIDDEN, make("f"));

        bus.emit(AUTH_FORBIDDEN, json!({"status": 403}));

        assert_eq!(*log.lock().unwrap(), vec![r#"f:{"status":403}"#.to_string()]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let first = bus.subscribe("tick", make("first"));
        let _second = bus.subscribe("tick", make("second"));

        first.unsubscribe();
        first.unsubscribe();
        assert_eq!(bus.listener_count("tick"), 1);

        bus.emit("tick", json!(1));
        assert_eq!(*log.lock().unwrap(), vec!["second:1".to_string()]);
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        {
            let _guard = bus.subscribe("tick", make("scoped")).guard();
            bus.emit("tick", json!(1));
        }
        bus.emit("tick", json!(2));

        assert_eq!(*log.lock().unwrap(), vec!["scoped:1".to_string()]);
        assert_eq!(bus.listener_count("tick"), 0);
    }

    #[test]
    fn test_panicking_listener_does_not_block_others() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let _a = bus.subscribe("boom", make("a"));
        let _p = bus.subscribe("boom", |_| panic!("listener failure"));
        let _b = bus.subscribe("boom", make("b"));

        bus.emit("boom", json!("x"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![r#"a:"x""#.to_string(), r#"b:"x""#.to_string()]
        );
        // Bus stays usable afterwards
        bus.emit("boom", json!("y"));
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_subscribe_during_emit_uses_snapshot() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(0u32));

        let bus_clone = bus.clone();
        let calls_clone = calls.clone();
        let _outer = bus.subscribe("grow", move |_| {
            let calls = calls_clone.clone();
            // Dropping the handle keeps the listener registered
            bus_clone.subscribe("grow", move |_| {
                *calls.lock().unwrap() += 1;
            });
        });

        bus.emit("grow", json!(null));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(bus.listener_count("grow"), 2);

        bus.emit("grow", json!(null));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_unsubscribe_during_emit() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_clone = slot.clone();
        let once = bus.subscribe("once", move |_| {
            if let Some(sub) = slot_clone.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(once);
        let _after = bus.subscribe("once", make("after"));

        bus.emit("once", json!(1));
        bus.emit("once", json!(2));

        assert_eq!(bus.listener_count("once"), 1);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["after:1".to_string(), "after:2".to_string()]
        );
    }

    #[test]
    fn test_unsubscribe_all() {
        let bus = EventBus::new();
        let (_log, make) = recorder();

        let _a = bus.subscribe(AUTH_UNAUTHORIZED, make("a"));
        let _b = bus.subscribe(AUTH_FORBIDDEN, make("b"));
        let _c = bus.subscribe(AUTH_FORBIDDEN, make("c"));

        bus.unsubscribe_all(Some(AUTH_FORBIDDEN));
        assert_eq!(bus.listener_count(AUTH_FORBIDDEN), 0);
        assert_eq!(bus.listener_count(AUTH_UNAUTHORIZED), 1);

        bus.unsubscribe_all(None);
        assert_eq!(bus.listener_count(AUTH_UNAUTHORIZED), 0);
    }

    #[test]
    fn test_subscription_outlives_bus() {
        let bus = EventBus::new();
        let sub = bus.subscribe("gone", |_| {});
        assert_eq!(sub.event_name(), "gone");
        drop(bus);
        sub.unsubscribe();
    }
}
