use crate::describe_js;
use codex_sidebar_core::Category;
use codex_sidebar_core::HostSelectors;
use codex_sidebar_core::IntentSink;
use codex_sidebar_core::OverlayLabels;
use codex_sidebar_core::RenderModel;
use codex_sidebar_core::SidebarEntry;
use codex_sidebar_core::View;
use codex_sidebar_core::ViewIntent;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::Document;
use web_sys::Element;
use web_sys::Event;
use web_sys::HtmlElement;

const PANEL_MARKUP: &str = r#"
  <header>
    <div class="title">Environments</div>
    <button class="refresh" type="button" title="Refresh" aria-label="Refresh" data-action="refresh">
      <span class="icon" aria-hidden="true">
        <svg viewBox="0 0 24 24" focusable="false">
          <path d="M21 12a9 9 0 0 0-9-9 9 9 0 0 0-8 4.47" />
          <path d="M3 12a9 9 0 0 0 9 9 9 9 0 0 0 8-4.47" />
          <path d="M3 5v5h5" />
          <path d="M21 19v-5h-5" />
        </svg>
      </span>
      <span class="label">Refresh</span>
    </button>
  </header>
  <div class="list"></div>
  <div class="meta">
    <span class="m-env"></span>
    <span class="m-count">0</span>
  </div>
"#;

/// The sidebar panel, rendered with plain DOM calls.
///
/// Clicks are handled by one delegated listener on the panel: every
/// actionable button carries `data-action` and, for environments,
/// `data-env`.
pub struct DomView {
    document: Document,
    selectors: HostSelectors,
    labels: OverlayLabels,
    panel: RefCell<Option<Element>>,
    listener: RefCell<Option<Closure<dyn FnMut(Event)>>>,
    sink: Rc<RefCell<Option<IntentSink>>>,
}

impl DomView {
    pub fn new(document: Document, selectors: HostSelectors, labels: OverlayLabels) -> Self {
        Self {
            document,
            selectors,
            labels,
            panel: RefCell::new(None),
            listener: RefCell::new(None),
            sink: Rc::new(RefCell::new(None)),
        }
    }

    /// Routes panel clicks to `sink`.
    pub fn connect(&self, sink: IntentSink) {
        *self.sink.borrow_mut() = Some(sink);
    }

    fn build_panel(&self) -> Result<Element, JsValue> {
        if let Some(stale) = self.document.get_element_by_id(&self.selectors.panel_id) {
            stale.remove();
        }
        self.install_styles()?;

        let panel = self.document.create_element("div")?;
        panel.set_id(&self.selectors.panel_id);
        panel.set_inner_html(PANEL_MARKUP);

        let sink = Rc::clone(&self.sink);
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            dispatch(&sink, &event);
        });
        panel.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        *self.listener.borrow_mut() = Some(listener);

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&panel)?;
        Ok(panel)
    }

    fn install_styles(&self) -> Result<(), JsValue> {
        let style_id = format!("{}-style", self.selectors.panel_id);
        if self.document.get_element_by_id(&style_id).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style")?;
        style.set_id(&style_id);
        style.set_text_content(Some(&panel_css(&self.selectors)));
        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no head"))?;
        head.append_child(&style)?;
        Ok(())
    }

    fn render_into(&self, panel: &Element, model: &RenderModel) -> Result<(), JsValue> {
        if let Some(list) = panel.query_selector(".list")? {
            list.set_inner_html("");
            for entry in model.entries() {
                let row = self.entry_row(&entry)?;
                list.append_child(&row)?;
            }
        }
        let (env, count) = meta_text(model, &self.labels);
        if let Some(element) = panel.query_selector(".m-env")? {
            element.set_text_content(Some(&env));
        }
        if let Some(element) = panel.query_selector(".m-count")? {
            element.set_text_content(Some(&count));
        }
        Ok(())
    }

    fn entry_row(&self, entry: &SidebarEntry) -> Result<Element, JsValue> {
        let row = self.document.create_element("div")?;
        match entry {
            SidebarEntry::All { active } => {
                row.set_class_name("env-row");
                let spacer = self.document.create_element("div")?;
                spacer.set_class_name("fav-toggle spacer");
                row.append_child(&spacer)?;
                let select =
                    self.button(env_class(*active), &self.labels.all_entry, "select", None)?;
                row.append_child(&select)?;
            }
            SidebarEntry::Category {
                category,
                active,
                favorite,
            } => {
                row.set_class_name(if *favorite { "env-row fav" } else { "env-row" });
                let toggle = self.button(
                    if *favorite { "fav-toggle on" } else { "fav-toggle" },
                    if *favorite { "★" } else { "☆" },
                    "favorite",
                    Some(category),
                )?;
                toggle.set_attribute(
                    "title",
                    if *favorite {
                        "Remover dos favoritos"
                    } else {
                        "Adicionar aos favoritos"
                    },
                )?;
                row.append_child(&toggle)?;
                let select =
                    self.button(env_class(*active), category.as_str(), "select", Some(category))?;
                row.append_child(&select)?;
            }
        }
        Ok(row)
    }

    fn button(
        &self,
        class: &str,
        text: &str,
        action: &str,
        category: Option<&Category>,
    ) -> Result<Element, JsValue> {
        let button = self.document.create_element("button")?;
        button.set_attribute("type", "button")?;
        button.set_class_name(class);
        button.set_text_content(Some(text));
        button.set_attribute("data-action", action)?;
        if let Some(category) = category {
            button.set_attribute("data-env", category.as_str())?;
        }
        Ok(button)
    }
}

impl View for DomView {
    type Node = Element;

    fn mount(&self) {
        if self
            .panel
            .borrow()
            .as_ref()
            .is_some_and(|panel| panel.is_connected())
        {
            return;
        }
        match self.build_panel() {
            Ok(panel) => *self.panel.borrow_mut() = Some(panel),
            Err(err) => warn!(error = %describe_js(&err), "failed to mount sidebar panel"),
        }
    }

    fn set_visible(&self, visible: bool) {
        let panel = self.panel.borrow().clone();
        if let Some(panel) = panel.as_ref().and_then(|p| p.dyn_ref::<HtmlElement>()) {
            let style = panel.style();
            let result = if visible {
                style.remove_property("display").map(drop)
            } else {
                style.set_property("display", "none")
            };
            if let Err(err) = result {
                warn!(error = %describe_js(&err), "failed to toggle sidebar panel");
            }
        }
        let Some(root) = self.document.document_element() else {
            return;
        };
        if let Err(err) = root
            .class_list()
            .toggle_with_force(&self.selectors.active_root_class, visible)
        {
            warn!(error = %describe_js(&err), "failed to toggle root class");
        }
    }

    fn render(&self, model: &RenderModel) {
        let panel = self.panel.borrow().clone();
        let Some(panel) = panel else {
            return;
        };
        if let Err(err) = self.render_into(&panel, model) {
            warn!(error = %describe_js(&err), "failed to render sidebar");
        }
    }

    fn owned_roots(&self) -> Vec<Element> {
        self.panel.borrow().iter().cloned().collect()
    }
}

fn env_class(active: bool) -> &'static str {
    if active { "env active" } else { "env" }
}

/// The two meta lines: current environment (or the "all" caption) and the
/// visible task count.
fn meta_text(model: &RenderModel, labels: &OverlayLabels) -> (String, String) {
    let env = model
        .selection
        .as_ref()
        .map_or_else(|| labels.all_meta.clone(), Category::to_string);
    (env, format!("{} tasks", model.visible_item_count))
}

fn intent_for(action: Option<&str>, category: Option<String>) -> Option<ViewIntent> {
    match action? {
        "select" => Some(ViewIntent::SelectCategory(category.map(Category::new))),
        "favorite" => category.map(|c| ViewIntent::ToggleFavorite(Category::new(c))),
        "refresh" => Some(ViewIntent::Refresh),
        _ => None,
    }
}

fn dispatch(sink: &RefCell<Option<IntentSink>>, event: &Event) {
    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };
    let Ok(Some(control)) = target.closest("[data-action]") else {
        return;
    };
    let intent = intent_for(
        control.get_attribute("data-action").as_deref(),
        control.get_attribute("data-env"),
    );
    let Some(intent) = intent else {
        return;
    };
    event.stop_propagation();
    let sink = sink.borrow().clone();
    if let Some(sink) = sink {
        sink(intent);
    }
}

fn panel_css(selectors: &HostSelectors) -> String {
    let id = &selectors.panel_id;
    let active = &selectors.active_root_class;
    format!(
        r#"
html.{active} {{ --csw: 240px; }}
html.{active} body {{ padding-left: var(--csw); }}
#{id} {{
  position: fixed; top: 0; left: 0; bottom: 0; width: var(--csw, 240px);
  display: flex; flex-direction: column; z-index: 50;
  font-size: 13px; border-right: 1px solid rgba(127, 127, 127, 0.25);
  background: var(--main-surface-primary, #fff); color: inherit;
}}
#{id} header {{ display: flex; align-items: center; justify-content: space-between; padding: 12px; }}
#{id} .title {{ font-weight: 600; }}
#{id} .refresh {{ display: flex; align-items: center; gap: 4px; }}
#{id} .refresh svg {{ width: 14px; height: 14px; fill: none; stroke: currentColor; stroke-width: 2; }}
#{id} .list {{ flex: 1; overflow-y: auto; padding: 0 8px; }}
#{id} .env-row {{ display: flex; align-items: center; gap: 4px; }}
#{id} .fav-toggle {{ width: 20px; flex: none; opacity: 0.5; }}
#{id} .fav-toggle.on {{ opacity: 1; }}
#{id} .env {{ flex: 1; text-align: left; padding: 4px 6px; border-radius: 6px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }}
#{id} .env.active {{ font-weight: 600; background: rgba(127, 127, 127, 0.15); }}
#{id} .meta {{ display: flex; justify-content: space-between; padding: 8px 12px; opacity: 0.7; }}
"#
    )
}
