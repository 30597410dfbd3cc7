use codex_sidebar_core::HostDocument;
use codex_sidebar_core::HostSelectors;
use codex_sidebar_core::Location;
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::Document;
use web_sys::Element;
use web_sys::HtmlElement;
use web_sys::Window;

/// [`HostDocument`] over the live page, addressed through the configured
/// CSS selectors.
///
/// Every query goes back to the DOM. Elements the host has detached since
/// they were returned still answer queries; writes to them are lost, which
/// is fine because the next pass re-queries.
#[derive(Debug, Clone)]
pub struct WebDocument {
    window: Window,
    document: Document,
    selectors: HostSelectors,
}

impl WebDocument {
    pub fn new(window: Window, document: Document, selectors: HostSelectors) -> Self {
        Self {
            window,
            document,
            selectors,
        }
    }

    fn query_all(&self, root: Option<&Element>, selector: &str) -> Vec<Element> {
        let result = match root {
            Some(root) => root.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        let list = match result {
            Ok(list) => list,
            Err(err) => {
                debug!(selector, error = ?err, "selector query failed");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|index| list.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_one(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn matches(element: &Element, selector: &str) -> bool {
        element.matches(selector).unwrap_or(false)
    }

    /// Headers are searched under the nearest `header_scope` ancestor of the
    /// first row, so look-alike captions elsewhere on the page are left
    /// alone.
    fn header_scope(&self) -> Option<Element> {
        let body = self.document.body().map(Element::from);
        let Some(first_row) = self.query_one(&self.selectors.row) else {
            return body;
        };
        first_row
            .closest(&self.selectors.header_scope)
            .ok()
            .flatten()
            .or(body)
    }
}

impl HostDocument for WebDocument {
    type Node = Element;

    fn location(&self) -> Location {
        let location = self.window.location();
        Location::from_parts(
            location.href().unwrap_or_default(),
            location.origin().unwrap_or_default(),
            location.pathname().unwrap_or_default(),
        )
    }

    fn disclosure_control(&self) -> Option<Element> {
        self.query_one(&self.selectors.disclosure)
    }

    fn overlays(&self) -> Vec<Element> {
        self.query_all(None, &self.selectors.overlay)
    }

    fn subtree_texts(&self, root: &Element) -> Vec<String> {
        std::iter::once(root.clone())
            .chain(self.query_all(Some(root), "*"))
            .map(|element| self.text(&element))
            .collect()
    }

    fn controls_within(&self, root: &Element) -> Vec<Element> {
        self.query_all(Some(root), &self.selectors.control)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn activate(&self, node: &Element) {
        match node.dyn_ref::<HtmlElement>() {
            Some(element) => element.click(),
            None => debug!(tag = %node.tag_name(), "cannot activate non-html element"),
        }
    }

    fn rows(&self) -> Vec<Element> {
        self.query_all(None, &self.selectors.row)
    }

    fn row_fragments(&self, row: &Element) -> Vec<String> {
        self.query_all(Some(row), &self.selectors.fragment)
            .iter()
            .map(|fragment| self.text(fragment))
            .collect()
    }

    fn headers(&self) -> Vec<Element> {
        match self.header_scope() {
            Some(scope) => self.query_all(Some(&scope), &self.selectors.header),
            None => Vec::new(),
        }
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn is_header(&self, node: &Element) -> bool {
        Self::matches(node, &self.selectors.header)
    }

    fn is_row(&self, node: &Element) -> bool {
        Self::matches(node, &self.selectors.row)
    }

    fn rows_within(&self, node: &Element) -> Vec<Element> {
        self.query_all(Some(node), &self.selectors.row)
    }

    fn is_hidden(&self, node: &Element) -> bool {
        match self.window.get_computed_style(node) {
            Ok(Some(style)) => style
                .get_property_value("display")
                .is_ok_and(|display| display == "none"),
            _ => false,
        }
    }

    fn set_hidden(&self, node: &Element, hidden: bool) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let result = if hidden {
            style.set_property("display", "none")
        } else {
            style.remove_property("display").map(drop)
        };
        if let Err(err) = result {
            debug!(error = ?err, "failed to update element display");
        }
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }
}
