//! Observation targets

use crate::host::ElementHandle;

/// What to observe: a selector, a list of selectors, a single element
/// handle, or a list of handles.
///
/// `From` conversions let callers pass any of the four shapes directly:
///
/// ```
/// use choreo_core::{ElementHandle, Target};
///
/// let by_selector: Target = ".card".into();
/// let by_handle: Target = ElementHandle::new(7).into();
/// assert!(matches!(by_selector, Target::Selector(_)));
/// assert!(matches!(by_handle, Target::Element(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A single selector string, resolved by the host
    Selector(String),
    /// Multiple selectors, resolved in order
    Selectors(Vec<String>),
    /// A single already-resolved element
    Element(ElementHandle),
    /// Multiple already-resolved elements, kept in order
    Elements(Vec<ElementHandle>),
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_owned())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<Vec<String>> for Target {
    fn from(selectors: Vec<String>) -> Self {
        Target::Selectors(selectors)
    }
}

impl From<&[&str]> for Target {
    fn from(selectors: &[&str]) -> Self {
        Target::Selectors(selectors.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<ElementHandle> for Target {
    fn from(element: ElementHandle) -> Self {
        Target::Element(element)
    }
}

impl From<Vec<ElementHandle>> for Target {
    fn from(elements: Vec<ElementHandle>) -> Self {
        Target::Elements(elements)
    }
}
