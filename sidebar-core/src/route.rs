use crate::config::RouteConfig;
use crate::host::Location;
use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Strips trailing slashes; an empty result becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Handle returned by [`RouteGate::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSubscription(u64);

type RouteCallback = Rc<dyn Fn(&Location)>;

/// Decides whether the sidebar should be active and fans out navigations.
///
/// The host navigates in-page, so location changes reach the gate from two
/// directions: wrapped history calls and a mutation-driven fallback. Both
/// call [`RouteGate::observe`]; the gate remembers the last href it saw and
/// only notifies subscribers when it actually changed.
pub struct RouteGate {
    origin: String,
    path: String,
    last_href: RefCell<String>,
    subscribers: RefCell<Vec<(RouteSubscription, RouteCallback)>>,
    next_id: Cell<u64>,
}

impl RouteGate {
    pub fn new(config: &RouteConfig, initial: &Location) -> Self {
        Self {
            origin: config.origin.trim_end_matches('/').to_string(),
            path: normalize_path(&config.path),
            last_href: RefCell::new(initial.href.clone()),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn is_in_scope(&self, location: &Location) -> bool {
        location.origin == self.origin && normalize_path(&location.pathname) == self.path
    }

    pub fn subscribe(&self, callback: impl Fn(&Location) + 'static) -> RouteSubscription {
        let id = RouteSubscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Rc::new(callback) as RouteCallback));
        id
    }

    pub fn unsubscribe(&self, subscription: RouteSubscription) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription);
        subscribers.len() != before
    }

    /// Records `location` and notifies subscribers when its href differs
    /// from the last one observed. Returns whether subscribers were called.
    pub fn observe(&self, location: &Location) -> bool {
        {
            let mut last = self.last_href.borrow_mut();
            if *last == location.href {
                return false;
            }
            *last = location.href.clone();
        }
        debug!(href = %location.href, "route changed");
        // Subscribers may (un)subscribe while being notified.
        let callbacks: Vec<RouteCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(location);
        }
        true
    }
}
