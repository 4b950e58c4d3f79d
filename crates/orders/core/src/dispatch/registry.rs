//! Handler and listener registries.

use tracing::debug;

use crate::config::DispatchConfig;
use crate::handler::OrderHandler;
use crate::request::{CompletionInstance, HandlerId};

/// Registry of order handlers indexed by [`HandlerId`].
///
/// Ids are handed out sequentially from [`HandlerId::FIRST`] and never reused
/// within a session, so registration order doubles as the tie-break order
/// when two handlers score a request equally.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn OrderHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under the next free id.
    ///
    /// # Panics
    ///
    /// Panics if a handler with the same name is already registered or if
    /// the registry is full. Both are wiring mistakes, not runtime conditions.
    pub fn register(&mut self, handler: Box<dyn OrderHandler>) -> HandlerId {
        let name = handler.name();
        assert!(
            self.find(name).is_none(),
            "order handler `{name}` registered twice"
        );
        assert!(
            self.handlers.len() < DispatchConfig::MAX_HANDLERS,
            "order handler registry is full ({} handlers)",
            DispatchConfig::MAX_HANDLERS
        );

        self.handlers.push(handler);
        let id = HandlerId(self.handlers.len() as u8);
        debug!(target: "orders::dispatch", handler = name, id = %id, "registered order handler");
        id
    }

    pub fn get(&self, id: HandlerId) -> Option<&dyn OrderHandler> {
        let index = usize::from(id.0).checked_sub(1)?;
        self.handlers.get(index).map(|handler| &**handler)
    }

    pub fn get_mut(&mut self, id: HandlerId) -> Option<&mut (dyn OrderHandler + 'static)> {
        let index = usize::from(id.0).checked_sub(1)?;
        self.handlers.get_mut(index).map(|handler| &mut **handler)
    }

    /// Looks up a handler id by name.
    pub fn find(&self, name: &str) -> Option<HandlerId> {
        self.iter()
            .find(|(_, handler)| handler.name() == name)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: HandlerId) -> bool {
        self.get(id).is_some()
    }

    /// Handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (HandlerId, &dyn OrderHandler)> {
        self.handlers
            .iter()
            .enumerate()
            .map(|(index, handler)| (Self::id_at(index), &**handler))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (HandlerId, &mut (dyn OrderHandler + 'static))> {
        self.handlers
            .iter_mut()
            .enumerate()
            .map(|(index, handler)| (Self::id_at(index), &mut **handler))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn id_at(index: usize) -> HandlerId {
        HandlerId((index + 1) as u8)
    }
}

/// Handle returned by listener registration, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(HandlerId, &CompletionInstance)>;

/// Callbacks notified whenever an order finishes.
#[derive(Default)]
pub struct CompletionListeners {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u32,
}

impl CompletionListeners {
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Invokes every listener in subscription order.
    pub fn notify(&mut self, handler: HandlerId, completion: &CompletionInstance) {
        for (_, listener) in &mut self.listeners {
            listener(handler, completion);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
