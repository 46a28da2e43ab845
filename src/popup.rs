// WHY: Hover lookups are delegated to an injected display instead of a page-global popup
// The overlay owns its display, so alignment never touches presentation state

use crate::content::{class_token, to_inner_html, Document, Element, NodeId};
use crate::parse_result::VocabularyEntry;

/// Placeholder for identifiers the vocabulary entry does not carry
const MISSING_ID: &str = "???";

/// What a popup shows for one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub spelling: String,
    /// Only set when it differs from the spelling
    pub reading: Option<String>,
    pub card_state: Vec<String>,
    pub meanings: Vec<String>,
    /// `vid / sid / rid`, with `???` for missing ids
    pub ids: String,
}

impl PopupContent {
    pub fn from_entry(entry: &VocabularyEntry) -> Self {
        let id = |value: Option<u64>| value.map_or_else(|| MISSING_ID.to_string(), |v| v.to_string());

        Self {
            spelling: entry.spelling.clone(),
            reading: (entry.reading != entry.spelling).then(|| entry.reading.clone()),
            card_state: entry.card_state.clone(),
            meanings: entry.meanings.clone(),
            ids: format!("{} / {} / {}", id(entry.vid), id(entry.sid), id(entry.rid)),
        }
    }
}

/// Receiver of hover-in / hover-out for annotated words
pub trait AnnotationDisplay {
    /// Show `content` next to the word node `anchor`
    fn show(&mut self, anchor: NodeId, content: &PopupContent);
    fn hide(&mut self);
}

/// Render popup markup:
/// heading with spelling, optional reading and state tags, an id line, then numbered glosses
pub fn render_popup(content: &PopupContent) -> String {
    let mut doc = Document::new(Element::new("div"));
    let root = doc.root();

    let heading = doc.append_new_element(root, Element::new("h1"));
    text_element(&mut doc, heading, Element::new("span").with_attr("class", "spelling"), &content.spelling);
    if let Some(reading) = &content.reading {
        text_element(
            &mut doc,
            heading,
            Element::new("span").with_attr("class", "reading"),
            &format!("({reading})"),
        );
    }

    let states = doc.append_new_element(heading, Element::new("div").with_attr("class", "state"));
    for state in &content.card_state {
        text_element(&mut doc, states, Element::new("span").with_attr("class", class_token(state)), state);
    }

    text_element(&mut doc, root, Element::new("small"), &format!("id: {}", content.ids));

    let glosses = doc.append_new_element(root, Element::new("ol"));
    for meaning in &content.meanings {
        text_element(&mut doc, glosses, Element::new("li"), meaning);
    }

    to_inner_html(&doc, root)
}

fn text_element(doc: &mut Document, parent: NodeId, element: Element, text: &str) -> NodeId {
    let id = doc.append_new_element(parent, element);
    doc.append_new_text(id, text);
    id
}

/// Display that keeps the rendered markup of the visible popup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPopup {
    pub visible: bool,
    pub anchor: Option<NodeId>,
    pub html: String,
}

impl AnnotationDisplay for HtmlPopup {
    fn show(&mut self, anchor: NodeId, content: &PopupContent) {
        self.visible = true;
        self.anchor = Some(anchor);
        self.html = render_popup(content);
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}
