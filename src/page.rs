use std::collections::HashMap;

use crate::media::MediaState;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ElementId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DisplayMode {
    Block,
    None,
}

impl DisplayMode {
    pub(crate) fn as_css(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverflowMode {
    Auto,
    Hidden,
}

#[derive(Debug, Clone)]
pub(crate) struct ElementNode {
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) tag_name: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) disabled: bool,
    pub(crate) display: DisplayMode,
    pub(crate) overflow: OverflowMode,
    pub(crate) opacity: Option<f64>,
    pub(crate) media: Option<MediaState>,
}

impl ElementNode {
    fn new(tag_name: &str) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            tag_name: tag_name.to_string(),
            id: None,
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            display: DisplayMode::Block,
            overflow: OverflowMode::Auto,
            opacity: None,
            media: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page {
    nodes: Vec<ElementNode>,
    root: ElementId,
    id_index: HashMap<String, ElementId>,
}

impl Page {
    pub(crate) fn new() -> Self {
        let body = ElementNode::new("body");
        Self {
            nodes: vec![body],
            root: ElementId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn root(&self) -> ElementId {
        self.root
    }

    pub(crate) fn create_element(&mut self, parent: ElementId, tag_name: &str) -> ElementId {
        let mut node = ElementNode::new(tag_name);
        node.parent = Some(parent);
        let id = ElementId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn set_id(&mut self, element: ElementId, id: &str) {
        self.nodes[element.0].id = Some(id.to_string());
        self.id_index.insert(id.to_string(), element);
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<ElementId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn node(&self, element: ElementId) -> &ElementNode {
        &self.nodes[element.0]
    }

    pub(crate) fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes[element.0].parent
    }

    pub(crate) fn all_elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.nodes.len()).map(ElementId)
    }

    pub(crate) fn tag_name(&self, element: ElementId) -> &str {
        &self.nodes[element.0].tag_name
    }

    pub(crate) fn add_class(&mut self, element: ElementId, class: &str) {
        let node = &mut self.nodes[element.0];
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
    }

    pub(crate) fn remove_class(&mut self, element: ElementId, class: &str) -> bool {
        let node = &mut self.nodes[element.0];
        if let Some(pos) = node.classes.iter().position(|c| c == class) {
            node.classes.remove(pos);
            return true;
        }
        false
    }

    pub(crate) fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.nodes[element.0].classes.iter().any(|c| c == class)
    }

    pub(crate) fn set_text(&mut self, element: ElementId, text: &str) {
        self.nodes[element.0].text = text.to_string();
    }

    pub(crate) fn text(&self, element: ElementId) -> &str {
        &self.nodes[element.0].text
    }

    pub(crate) fn set_value(&mut self, element: ElementId, value: &str) {
        self.nodes[element.0].value = value.to_string();
    }

    pub(crate) fn value(&self, element: ElementId) -> &str {
        &self.nodes[element.0].value
    }

    pub(crate) fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        self.nodes[element.0].disabled = disabled;
    }

    pub(crate) fn disabled(&self, element: ElementId) -> bool {
        self.nodes[element.0].disabled
    }

    pub(crate) fn set_display(&mut self, element: ElementId, display: DisplayMode) {
        self.nodes[element.0].display = display;
    }

    pub(crate) fn display(&self, element: ElementId) -> DisplayMode {
        self.nodes[element.0].display
    }

    pub(crate) fn set_overflow(&mut self, element: ElementId, overflow: OverflowMode) {
        self.nodes[element.0].overflow = overflow;
    }

    pub(crate) fn overflow(&self, element: ElementId) -> OverflowMode {
        self.nodes[element.0].overflow
    }

    pub(crate) fn set_opacity(&mut self, element: ElementId, opacity: f64) {
        self.nodes[element.0].opacity = Some(opacity);
    }

    pub(crate) fn opacity(&self, element: ElementId) -> Option<f64> {
        self.nodes[element.0].opacity
    }

    pub(crate) fn media(&self, element: ElementId) -> Option<&MediaState> {
        self.nodes[element.0].media.as_ref()
    }

    pub(crate) fn media_mut(&mut self, element: ElementId, selector: &str) -> Result<&mut MediaState> {
        let tag = self.nodes[element.0].tag_name.clone();
        self.nodes[element.0]
            .media
            .as_mut()
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "video".into(),
                actual: tag,
            })
    }

    pub(crate) fn attach_media(&mut self, element: ElementId, media: MediaState) {
        self.nodes[element.0].media = Some(media);
    }

    pub(crate) fn snippet(&self, element: ElementId) -> String {
        let node = &self.nodes[element.0];
        let mut open = format!("<{}", node.tag_name);
        if let Some(id) = &node.id {
            open.push_str(&format!(" id='{id}'"));
        }
        if !node.classes.is_empty() {
            open.push_str(&format!(" class='{}'", node.classes.join(" ")));
        }
        if node.disabled {
            open.push_str(" disabled");
        }
        if node.display == DisplayMode::None {
            open.push_str(&format!(" style='display: {}'", node.display.as_css()));
        }
        open.push('>');
        let mut text = node.text.clone();
        if text.chars().count() > 40 {
            text = text.chars().take(40).collect::<String>();
            text.push('…');
        }
        format!("{open}{text}</{}>", node.tag_name)
    }
}
