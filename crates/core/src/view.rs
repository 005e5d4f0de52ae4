//! Pure view renderers.
//!
//! Each renderer maps the current records of one collection to a [`Fragment`],
//! a small HTML element tree. Renderers never touch the record store, and the
//! same input always yields the same tree.
//!
//! Text is escaped when a fragment is serialized with [`Fragment::to_html`],
//! so user-supplied names and comments cannot inject markup.

use crate::types::{CartLineItem, CustomProgram, FeedbackEntry, cart_total};

/// Shown in the cart container when the cart has no line items.
pub const EMPTY_CART_TEXT: &str = "Your cart is currently empty.";

/// Shown in the feedback list before any feedback is submitted.
pub const EMPTY_FEEDBACK_TEXT: &str = "No feedback submitted yet.";

/// Shown for the program notes when no preferences were entered.
pub const NO_PREFERENCES_TEXT: &str = "None provided.";

/// Closing sentence of every program summary.
pub const PROGRAM_ADVISORY_TEXT: &str =
    "This plan suggests a mix of strength, cardio, and recovery sessions tailored to your selections.";

/// A node in a rendered fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An HTML element with an optional class and child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub class: Option<&'static str>,
    pub children: Vec<Node>,
}

impl Element {
    /// An element with no class and no children.
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            class: None,
            children: Vec::new(),
        }
    }

    /// Set the class attribute.
    #[must_use]
    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl Node {
    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_html(text)),
            Self::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                if let Some(class) = element.class {
                    out.push_str(" class=\"");
                    out.push_str(&escape_html(class));
                    out.push('"');
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(element.tag);
                out.push('>');
            }
        }
    }
}

/// An ordered list of top-level nodes written into one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// A fragment that renders nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Whether the fragment has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to HTML, escaping all text.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Concatenated text of all nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// =============================================================================
// Cart
// =============================================================================

/// Rendered cart: the line item list and the total line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    /// Goes into the cart items container.
    pub items: Fragment,
    /// Plain text for the cart total element; empty for an empty cart.
    pub total: String,
}

/// One display row: `"{name} × {quantity} – ${line total}"`.
#[must_use]
pub fn cart_row_text(item: &CartLineItem) -> String {
    format!(
        "{} \u{d7} {} \u{2013} {}",
        item.name,
        item.quantity,
        item.line_total()
    )
}

/// Render the cart.
#[must_use]
pub fn render_cart(items: &[CartLineItem]) -> CartView {
    if items.is_empty() {
        return CartView {
            items: Fragment::from_iter([Node::from(Element::new("p").text(EMPTY_CART_TEXT))]),
            total: String::new(),
        };
    }

    let list = items
        .iter()
        .fold(Element::new("ul"), |list, item| {
            list.child(Element::new("li").text(cart_row_text(item)))
        });

    CartView {
        items: Fragment::from_iter([Node::from(list)]),
        total: format!("Total: {}", cart_total(items)),
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// Card heading: `"{name} (Rating: {rating}/5)"`.
#[must_use]
pub fn feedback_heading(entry: &FeedbackEntry) -> String {
    format!("{} (Rating: {}/5)", entry.name, entry.rating)
}

/// Render the feedback list, one card per entry in submission order.
#[must_use]
pub fn render_feedback(entries: &[FeedbackEntry]) -> Fragment {
    if entries.is_empty() {
        return Fragment::from_iter([Node::from(Element::new("p").text(EMPTY_FEEDBACK_TEXT))]);
    }

    entries
        .iter()
        .map(|entry| {
            Node::from(
                Element::new("article")
                    .with_class("feedback-card")
                    .child(Element::new("h3").text(feedback_heading(entry)))
                    .child(Element::new("p").text(entry.comments.clone())),
            )
        })
        .collect()
}

// =============================================================================
// Custom program
// =============================================================================

fn labelled(label: &str, value: &str) -> Node {
    Element::new("p")
        .child(Element::new("strong").text(format!("{label}:")))
        .text(format!(" {value}"))
        .into()
}

/// Render the program summary; renders nothing when no program is stored.
#[must_use]
pub fn render_program(program: Option<&CustomProgram>) -> Fragment {
    let Some(program) = program else {
        return Fragment::empty();
    };

    let notes = if program.preferences.is_empty() {
        NO_PREFERENCES_TEXT
    } else {
        program.preferences.as_str()
    };

    Fragment::from_iter([
        labelled("Goal", &program.goal),
        labelled("Days per Week", &program.days_per_week),
        labelled("Intensity", &program.intensity),
        labelled("Notes", notes),
        Node::from(Element::new("p").text(PROGRAM_ADVISORY_TEXT)),
    ])
}
