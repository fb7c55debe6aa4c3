//! In-memory render target.
//!
//! Keeps the element tree, answers hit tests from the geometry attributes
//! (`x/y/width/height` for rects, `cx/cy/r` for circles, `d` for paths) and
//! records pointer capture. Used by the tests and by hosts that render the
//! scene themselves from [`records`](HeadlessRenderTarget::records).

use super::model::ElementRecord;
use super::{attr, ElementId, ElementKind, RenderTarget, ScreenTransform, DEFAULT_PATH_HIT_WIDTH};
use crate::geometry::Point;
use crate::path::evaluate_cubic_bezier;
use euclid::{point2, Transform2D};
use std::collections::{BTreeMap, HashMap};

const CUBIC_SAMPLES: usize = 16;

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct HeadlessRenderTarget {
    elements: HashMap<ElementId, Element>,
    roots: Vec<ElementId>,
    next_id: u64,
    screen_transform: ScreenTransform,
    viewport: (f32, f32),
    pan: (f32, f32),
    zoom: f32,
    fullscreen: bool,
    captured: bool,
}

impl Default for HeadlessRenderTarget {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl HeadlessRenderTarget {
    /// Target with an identity screen transform.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
            screen_transform: Transform2D::identity(),
            viewport: (width, height),
            pan: (0.0, 0.0),
            zoom: 1.0,
            fullscreen: false,
            captured: false,
        }
    }

    pub fn set_screen_transform(&mut self, transform: ScreenTransform) {
        self.screen_transform = transform;
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// `(pan_x, pan_y, zoom)` last set by the editor.
    pub fn view(&self) -> (f32, f32, f32) {
        (self.pan.0, self.pan.1, self.zoom)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.elements.get(&id).map(|e| e.kind)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(&id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// First element, in document order, whose `name` attribute equals `value`.
    pub fn find(&self, name: &str, value: &str) -> Option<ElementId> {
        self.document_order()
            .into_iter()
            .find(|id| self.attribute(*id, name).as_deref() == Some(value))
    }

    /// All elements, in document order, whose `name` attribute equals `value`.
    pub fn find_all(&self, name: &str, value: &str) -> Vec<ElementId> {
        self.document_order()
            .into_iter()
            .filter(|id| self.attribute(*id, name).as_deref() == Some(value))
            .collect()
    }

    /// Model point to screen point under the current view and transform.
    pub fn model_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        let canvas = point2(x * self.zoom + self.pan.0, y * self.zoom + self.pan.1);
        let screen = self.screen_transform.transform_point(canvas);
        (screen.x, screen.y)
    }

    /// Flattened tree in document order.
    pub fn records(&self) -> Vec<ElementRecord> {
        self.document_order()
            .into_iter()
            .filter_map(|id| {
                let e = self.elements.get(&id)?;
                Some(ElementRecord {
                    id,
                    kind: e.kind,
                    parent: e.parent,
                    attributes: e.attributes.clone(),
                })
            })
            .collect()
    }

    fn document_order(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<ElementId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(e) = self.elements.get(&id) {
                stack.extend(e.children.iter().rev().copied());
            }
        }
        order
    }

    fn num(&self, e: &Element, name: &str) -> Option<f32> {
        e.attributes.get(name)?.trim().parse().ok()
    }

    /// Hidden or pointer-transparent elements, including via an ancestor.
    fn pickable(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            let Some(e) = self.elements.get(&cid) else { return false };
            if e.attributes.get(attr::VISIBILITY).map(String::as_str) == Some("hidden")
                || e.attributes.get(attr::POINTER_EVENTS).map(String::as_str) == Some("none")
            {
                return false;
            }
            current = e.parent;
        }
        true
    }

    fn hit(&self, e: &Element, p: Point) -> bool {
        match e.kind {
            ElementKind::Rect => {
                match (self.num(e, "x"), self.num(e, "y"), self.num(e, "width"), self.num(e, "height")) {
                    (Some(x), Some(y), Some(w), Some(h)) => p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h,
                    _ => false,
                }
            }
            ElementKind::Circle => match (self.num(e, "cx"), self.num(e, "cy"), self.num(e, "r")) {
                (Some(cx), Some(cy), Some(r)) => p.distance(Point::new(cx, cy)) <= r,
                _ => false,
            },
            ElementKind::Path => {
                let Some(d) = e.attributes.get("d") else { return false };
                let width = self.num(e, attr::HIT_WIDTH).unwrap_or(DEFAULT_PATH_HIT_WIDTH);
                let tolerance = width / self.zoom.max(f32::EPSILON);
                let points = path_points(d);
                points
                    .windows(2)
                    .any(|seg| distance_to_segment(p, seg[0], seg[1]) <= tolerance)
            }
            ElementKind::Group | ElementKind::Text => false,
        }
    }
}

impl RenderTarget for HeadlessRenderTarget {
    fn create_element(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        let parent = parent.filter(|p| self.elements.contains_key(p));
        match parent {
            Some(p) => {
                if let Some(pe) = self.elements.get_mut(&p) {
                    pe.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.elements.insert(id, Element { kind, parent, children: Vec::new(), attributes: BTreeMap::new() });
        id
    }

    fn remove_element(&mut self, id: ElementId) {
        let Some(element) = self.elements.remove(&id) else { return };
        match element.parent.and_then(|p| self.elements.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        let mut stack = element.children;
        while let Some(child) = stack.pop() {
            if let Some(e) = self.elements.remove(&child) {
                stack.extend(e.children);
            }
        }
    }

    fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(&id) {
            e.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.elements.get(&id)?.attributes.get(name).cloned()
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id)?.parent
    }

    fn element_at(&self, screen_x: f32, screen_y: f32) -> Option<ElementId> {
        let canvas = self.screen_transform.inverse()?.transform_point(point2(screen_x, screen_y));
        let zoom = self.zoom.max(f32::EPSILON);
        let p = Point::new((canvas.x - self.pan.0) / zoom, (canvas.y - self.pan.1) / zoom);
        self.document_order().into_iter().rev().find(|id| {
            self.elements.get(id).is_some_and(|e| self.hit(e, p)) && self.pickable(*id)
        })
    }

    fn screen_transform(&self) -> ScreenTransform {
        self.screen_transform
    }

    fn viewport_size(&self) -> (f32, f32) {
        self.viewport
    }

    fn set_view_transform(&mut self, pan_x: f32, pan_y: f32, zoom: f32) {
        self.pan = (pan_x, pan_y);
        self.zoom = zoom;
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    fn capture_pointer(&mut self) {
        self.captured = true;
    }

    fn release_pointer(&mut self) {
        self.captured = false;
    }
}

/// Polyline approximation of an `M`/`L`/`C` path.
fn path_points(d: &str) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::new();
    let mut command = 'M';
    let mut args: Vec<f32> = Vec::with_capacity(6);

    for token in d.split_whitespace() {
        if let Some(c) = token.chars().next().filter(|c| c.is_ascii_alphabetic()) {
            command = c.to_ascii_uppercase();
            args.clear();
            continue;
        }
        let Ok(value) = token.parse::<f32>() else { continue };
        args.push(value);
        match command {
            'M' | 'L' if args.len() == 2 => {
                points.push(Point::new(args[0], args[1]));
                args.clear();
            }
            'C' if args.len() == 6 => {
                let p0 = points.last().copied().unwrap_or(Point::new(0.0, 0.0));
                let p1 = Point::new(args[0], args[1]);
                let p2 = Point::new(args[2], args[3]);
                let p3 = Point::new(args[4], args[5]);
                for i in 1..=CUBIC_SAMPLES {
                    let t = i as f32 / CUBIC_SAMPLES as f32;
                    points.push(evaluate_cubic_bezier(p0, p1, p2, p3, t));
                }
                args.clear();
            }
            _ => {}
        }
    }
    points
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b.sub(a);
    let len_sq = ab.dot(ab);
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (p.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a.add(ab.scale(t)))
}
