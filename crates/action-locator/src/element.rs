//! The subset of a DOM element's attributes the stable-selector algorithm
//! needs. Populated by `BrowserDriver::evaluate` against the real page;
//! constructed directly in tests.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub tag: String,
    pub id: Option<String>,
    pub test_id: Option<String>,
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub href: Option<String>,
    pub aria_label: Option<String>,
    /// Index of this element among same-tag siblings under its parent
    /// (1-based, matching `:nth-of-type`).
    pub nth_of_type: usize,
    /// Ancestor chain, nearest-parent-first, each with its own tag and
    /// `nth_of_type`. Truncated by the caller to whatever depth it wants
    /// considered.
    pub ancestors: Vec<AncestorDescriptor>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AncestorDescriptor {
    pub tag: String,
    pub nth_of_type: usize,
}
