//! Slint model binding.
//!
//! [`ModelRenderTarget`] keeps the scene in a [`HeadlessRenderTarget`] and
//! mirrors the flattened element list into a `VecModel` on every flush,
//! using an application-supplied constructor for the row type:
//!
//! ```ignore
//! let rows = Rc::new(VecModel::<SceneItem>::default());
//! let target = ModelRenderTarget::new(HeadlessRenderTarget::new(w, h), rows.clone(), |el| SceneItem {
//!     kind: el.kind.as_str().into(),
//!     element_type: el.attr("data-element-type").into(),
//!     d: el.attr("d").into(),
//! });
//! window.set_scene(ModelRc::from(rows));
//! ```

use super::{ElementId, ElementKind, HeadlessRenderTarget, RenderTarget, ScreenTransform};
use slint::{Model, VecModel};
use std::collections::BTreeMap;
use std::rc::Rc;

/// One scene element, as handed to the row constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub id: ElementId,
    pub kind: ElementKind,
    pub parent: Option<ElementId>,
    pub attributes: BTreeMap<String, String>,
}

impl ElementRecord {
    /// Attribute value, or `""` when unset.
    pub fn attr(&self, name: &str) -> &str {
        self.attributes.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Internal trait for syncing records into a typed Slint model.
trait ModelSyncer {
    fn sync(&self, records: &[ElementRecord]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<P, F> ModelSyncer for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&ElementRecord) -> P,
{
    fn sync(&self, records: &[ElementRecord]) {
        for (i, record) in records.iter().enumerate() {
            let item = (self.constructor)(record);
            if i < self.model.row_count() {
                self.model.set_row_data(i, item);
            } else {
                self.model.push(item);
            }
        }
        while self.model.row_count() > records.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

pub struct ModelRenderTarget {
    inner: HeadlessRenderTarget,
    syncer: Box<dyn ModelSyncer>,
}

impl ModelRenderTarget {
    pub fn new<P, F>(inner: HeadlessRenderTarget, model: Rc<VecModel<P>>, constructor: F) -> Self
    where
        P: Clone + 'static,
        F: Fn(&ElementRecord) -> P + 'static,
    {
        Self { inner, syncer: Box::new(ConcreteModelSyncer { model, constructor }) }
    }

    pub fn inner(&self) -> &HeadlessRenderTarget {
        &self.inner
    }

    /// Access for screen transform and viewport updates from the window.
    pub fn inner_mut(&mut self) -> &mut HeadlessRenderTarget {
        &mut self.inner
    }
}

impl RenderTarget for ModelRenderTarget {
    fn create_element(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        self.inner.create_element(kind, parent)
    }

    fn remove_element(&mut self, id: ElementId) {
        self.inner.remove_element(id)
    }

    fn contains(&self, id: ElementId) -> bool {
        self.inner.contains(id)
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        self.inner.set_attribute(id, name, value)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.inner.attribute(id, name)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.parent(id)
    }

    fn element_at(&self, screen_x: f32, screen_y: f32) -> Option<ElementId> {
        self.inner.element_at(screen_x, screen_y)
    }

    fn screen_transform(&self) -> ScreenTransform {
        self.inner.screen_transform()
    }

    fn viewport_size(&self) -> (f32, f32) {
        self.inner.viewport_size()
    }

    fn set_view_transform(&mut self, pan_x: f32, pan_y: f32, zoom: f32) {
        self.inner.set_view_transform(pan_x, pan_y, zoom)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.inner.set_fullscreen(fullscreen)
    }

    fn capture_pointer(&mut self) {
        self.inner.capture_pointer()
    }

    fn release_pointer(&mut self) {
        self.inner.release_pointer()
    }

    fn flush(&mut self) {
        self.syncer.sync(&self.inner.records());
    }
}
