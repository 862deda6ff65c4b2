//! Static style block backing the runtime class names

use crate::host::{Document, ElementId};

pub const STYLE_ELEMENT_ID: &str = "pagelift-styles";

pub const DYNAMIC_STYLES: &str = "\
.touching { transform: scale(0.95); opacity: 0.8; }
.ripple { position: absolute; border-radius: 50%; transform: scale(0); \
animation: ripple-animation 0.6s linear; background-color: rgba(255, 255, 255, 0.6); \
pointer-events: none; }
@keyframes ripple-animation { to { transform: scale(4); opacity: 0; } }
.fade-in { opacity: 0; animation: fadeIn 0.6s ease-out forwards; }
@keyframes fadeIn { to { opacity: 1; } }
.reduce-motion * { animation-duration: 0.01ms !important; \
animation-iteration-count: 1 !important; transition-duration: 0.01ms !important; }
.loading { pointer-events: none; opacity: 0.6; }
";

/// Append the style block to `head` unless it is already present
pub fn inject_styles(doc: &mut dyn Document) -> Option<ElementId> {
    if let Some(existing) = doc.element_by_id(STYLE_ELEMENT_ID) {
        return Some(existing);
    }
    let head = doc.head()?;
    let style = doc.create_element("style");
    doc.set_attribute(style, "id", STYLE_ELEMENT_ID);
    doc.set_text_content(style, DYNAMIC_STYLES);
    doc.append_child(head, style);
    Some(style)
}
