use std::collections::HashMap;

use crate::page::ElementId;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EventKind {
    Click,
    Scroll,
    Ended,
    RateChange,
    Input,
}

impl EventKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Scroll => "scroll",
            Self::Ended => "ended",
            Self::RateChange => "ratechange",
            Self::Input => "input",
        }
    }

    pub(crate) fn parse(event: &str) -> Result<Self> {
        match event {
            "click" => Ok(Self::Click),
            "scroll" => Ok(Self::Scroll),
            "ended" => Ok(Self::Ended),
            "ratechange" => Ok(Self::RateChange),
            "input" => Ok(Self::Input),
            other => Err(Error::UnsupportedEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandlerKind {
    IntroEnded,
    ScrollTick,
    RateLock,
    PurchaseClick,
    ModalOpenClick,
    ModalCloseClick,
    ModalAddClick { product: usize },
    CheckoutClick,
    BackdropClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Listener {
    pub(crate) handler: HandlerKind,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<ElementId, HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, element: ElementId, event: EventKind, handler: HandlerKind) {
        self.map
            .entry(element)
            .or_default()
            .entry(event)
            .or_default()
            .push(Listener { handler });
    }

    pub(crate) fn remove(
        &mut self,
        element: ElementId,
        event: EventKind,
        handler: HandlerKind,
    ) -> bool {
        let Some(events) = self.map.get_mut(&element) else {
            return false;
        };
        let Some(listeners) = events.get_mut(&event) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|listener| listener.handler == handler)
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(&event);
            }
            if events.is_empty() {
                self.map.remove(&element);
            }
            return true;
        }

        false
    }

    pub(crate) fn get(&self, element: ElementId, event: EventKind) -> Vec<Listener> {
        self.map
            .get(&element)
            .and_then(|events| events.get(&event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, element: ElementId, event: EventKind) -> usize {
        self.map
            .get(&element)
            .and_then(|events| events.get(&event))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listeners_run_in_registration_order() {
        let mut store = ListenerStore::default();
        let element = ElementId(3);
        store.add(element, EventKind::Click, HandlerKind::ModalOpenClick);
        store.add(element, EventKind::Click, HandlerKind::CheckoutClick);
        let listeners = store.get(element, EventKind::Click);
        assert_eq!(listeners[0].handler, HandlerKind::ModalOpenClick);
        assert_eq!(listeners[1].handler, HandlerKind::CheckoutClick);
    }

    #[test]
    fn remove_drops_only_the_named_handler() {
        let mut store = ListenerStore::default();
        let element = ElementId(1);
        store.add(element, EventKind::Click, HandlerKind::PurchaseClick);
        store.add(element, EventKind::Click, HandlerKind::BackdropClose);
        assert!(store.remove(element, EventKind::Click, HandlerKind::PurchaseClick));
        assert!(!store.remove(element, EventKind::Click, HandlerKind::PurchaseClick));
        assert_eq!(store.count(element, EventKind::Click), 1);
    }

    #[test]
    fn remove_prunes_empty_buckets() {
        let mut store = ListenerStore::default();
        let element = ElementId(2);
        store.add(element, EventKind::Ended, HandlerKind::IntroEnded);
        assert!(store.remove(element, EventKind::Ended, HandlerKind::IntroEnded));
        assert!(store.get(element, EventKind::Ended).is_empty());
        assert_eq!(store.count(element, EventKind::Ended), 0);
    }

    #[test]
    fn event_names_round_trip() {
        for kind in [
            EventKind::Click,
            EventKind::Scroll,
            EventKind::Ended,
            EventKind::RateChange,
            EventKind::Input,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(matches!(
            EventKind::parse("mouseover"),
            Err(Error::UnsupportedEvent(_))
        ));
    }
}
