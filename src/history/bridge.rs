//! Reference-counted subscription to the host's pop channels.

use crate::platform::{NavigationStack, PopChannel, PopHandler, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;

struct BridgeState {
    holders: usize,
    subscriptions: Vec<SubscriptionId>,
}

/// Shares one host subscription between every `listen` and `block` of a
/// history. The handler is attached when the first holder arrives and
/// detached when the last one leaves.
pub(crate) struct ListenerBridge {
    stack: Arc<dyn NavigationStack>,
    handler: PopHandler,
    use_fallback: bool,
    state: Mutex<BridgeState>,
}

impl ListenerBridge {
    pub(crate) fn new(stack: Arc<dyn NavigationStack>, handler: PopHandler) -> Self {
        let use_fallback = !stack.capabilities().pop_on_hash_change;
        Self {
            stack,
            handler,
            use_fallback,
            state: Mutex::new(BridgeState {
                holders: 0,
                subscriptions: Vec::new(),
            }),
        }
    }

    pub(crate) fn retain(&self) {
        let mut state = self.state.lock();
        state.holders += 1;
        if state.holders != 1 {
            return;
        }

        tracing::debug!(fallback = self.use_fallback, "attaching pop handler");
        let primary = self
            .stack
            .subscribe(PopChannel::Primary, Arc::clone(&self.handler));
        state.subscriptions.push(primary);

        if self.use_fallback {
            let fallback = self
                .stack
                .subscribe(PopChannel::Fallback, Arc::clone(&self.handler));
            state.subscriptions.push(fallback);
        }
    }

    pub(crate) fn release(&self) {
        let mut state = self.state.lock();
        if state.holders == 0 {
            return;
        }
        state.holders -= 1;
        if state.holders != 0 {
            return;
        }

        tracing::debug!("detaching pop handler");
        for id in state.subscriptions.drain(..) {
            self.stack.unsubscribe(id);
        }
    }

    pub(crate) fn holders(&self) -> usize {
        self.state.lock().holders
    }

    pub(crate) fn is_attached(&self) -> bool {
        !self.state.lock().subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Capabilities, PopEvent, SimulatedStack};

    fn bridge(stack: &Arc<SimulatedStack>) -> ListenerBridge {
        let stack: Arc<dyn NavigationStack> = stack.clone();
        ListenerBridge::new(stack, Arc::new(|_: &PopEvent| {}))
    }

    #[test]
    fn attaches_once_for_many_holders() {
        let stack = Arc::new(SimulatedStack::new("/"));
        let bridge = bridge(&stack);

        bridge.retain();
        bridge.retain();
        assert_eq!(stack.subscriber_count(), 1);
        assert_eq!(bridge.holders(), 2);

        bridge.release();
        assert!(bridge.is_attached());
        bridge.release();
        assert!(!bridge.is_attached());
        assert_eq!(stack.subscriber_count(), 0);
    }

    #[test]
    fn extra_release_is_harmless() {
        let stack = Arc::new(SimulatedStack::new("/"));
        let bridge = bridge(&stack);

        bridge.release();
        bridge.retain();

        assert_eq!(bridge.holders(), 1);
        assert_eq!(stack.subscriber_count(), 1);
    }

    #[test]
    fn subscribes_fallback_when_primary_misses_hash_changes() {
        let stack = Arc::new(SimulatedStack::with_capabilities(
            "/",
            Capabilities {
                pop_on_hash_change: false,
                ..Capabilities::default()
            },
        ));
        let bridge = bridge(&stack);

        bridge.retain();
        assert_eq!(stack.subscriber_count(), 2);

        bridge.release();
        assert_eq!(stack.subscriber_count(), 0);
    }
}
