use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Config(String),
    PageState(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    UnsupportedEvent(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    MediaState {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config error: {msg}"),
            Self::PageState(msg) => write!(f, "page state error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnsupportedEvent(event) => write!(f, "unsupported event: {event}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::MediaState {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "media state error for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

mod cart;
mod events;
mod fade;
mod harness;
mod media;
mod page;
mod scheduler;
mod selector;

pub use cart::{Cart, CartItem, Product, EMPTY_CART_MESSAGE};
pub use fade::{fade_opacity, scroll_progress, PlaybackFlags, FADE_SPAN, SCROLL_THRESHOLD};
pub use harness::{Harness, PageConfig};
pub use media::{AutoplayPolicy, PlaybackStatus};
pub use scheduler::PendingTimer;
