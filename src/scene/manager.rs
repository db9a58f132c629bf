//! In-memory object manager implementing [`SceneHost`].

use std::collections::{BTreeMap, HashMap};

use crate::rendering::{ContextId, ContextRegistry};
use crate::{Error, Result};

use super::file::{ChildSpec, FigureSpec, SceneFile};
use super::{BoundingBox, Figure, GraphicsObject, Handle, SceneHost};

/// Default screen height used for screen-space bounding boxes.
const SCREEN_HEIGHT: f64 = 1080.0;

/// Owns figures and their descendants by handle.
///
/// A figure may have an on-screen canvas, represented by a registered
/// [`ContextId`]. Showing a figure re-selects its canvas as the current
/// context, which is what an interactive toolkit does when a window is
/// mapped.
pub struct GraphicsManager {
    objects: BTreeMap<Handle, GraphicsObject>,
    parents: HashMap<Handle, Handle>,
    next_handle: u32,
    screen_height: f64,
    canvases: HashMap<Handle, ContextId>,
    visibility_log: Vec<(Handle, bool)>,
}

impl Default for GraphicsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsManager {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            parents: HashMap::new(),
            next_handle: 1,
            screen_height: SCREEN_HEIGHT,
            canvases: HashMap::new(),
            visibility_log: Vec::new(),
        }
    }

    pub fn with_screen_height(mut self, height: f64) -> Self {
        self.screen_height = height;
        self
    }

    fn allocate(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Register a new root figure. Any children it lists are discarded.
    pub fn add_figure(&mut self, mut figure: Figure) -> Handle {
        figure.children.clear();
        let handle = self.allocate();
        self.objects.insert(handle, GraphicsObject::Figure(figure));
        log::trace!("added figure {}", handle);
        handle
    }

    /// Attach `object` under `parent`.
    ///
    /// Axes go under figures; lines, patches, surfaces and text go under axes.
    pub fn add_child(&mut self, parent: Handle, mut object: GraphicsObject) -> Result<Handle> {
        let parent_kind = self
            .objects
            .get(&parent)
            .map(GraphicsObject::kind)
            .ok_or_else(|| Error::SceneError(format!("no object with handle {}", parent)))?;
        let allowed = match object {
            GraphicsObject::Figure(_) => false,
            GraphicsObject::Axes(_) => parent_kind == "figure",
            _ => parent_kind == "axes",
        };
        if !allowed {
            return Err(Error::SceneError(format!(
                "{} cannot be a child of {} {}",
                object.kind(),
                parent_kind,
                parent
            )));
        }

        if let Some(children) = object.children_mut() {
            children.clear();
        }
        let handle = self.allocate();
        self.objects.insert(handle, object);
        self.parents.insert(handle, parent);
        if let Some(children) = self.objects.get_mut(&parent).and_then(|p| p.children_mut()) {
            children.push(handle);
        }
        Ok(handle)
    }

    /// Build a figure and its descendants from a parsed description.
    pub fn load(&mut self, spec: &FigureSpec) -> Result<Handle> {
        let figure = self.add_figure(spec.to_figure());
        for axes_spec in &spec.axes {
            let axes = self.add_child(figure, GraphicsObject::Axes(axes_spec.to_axes()))?;
            for child in &axes_spec.children {
                let object = match child.clone() {
                    ChildSpec::Line(l) => GraphicsObject::Line(l),
                    ChildSpec::Patch(p) => GraphicsObject::Patch(p),
                    ChildSpec::Surface(s) => GraphicsObject::Surface(s),
                    ChildSpec::Text(t) => GraphicsObject::Text(t),
                };
                self.add_child(axes, object)?;
            }
        }
        Ok(figure)
    }

    /// Parse a JSON scene and load every figure in it.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<Handle>> {
        let scene = SceneFile::from_json(json)?;
        scene.figures.iter().map(|f| self.load(f)).collect()
    }

    pub fn object_mut(&mut self, handle: Handle) -> Option<&mut GraphicsObject> {
        self.objects.get_mut(&handle)
    }

    pub fn parent(&self, handle: Handle) -> Option<Handle> {
        self.parents.get(&handle).copied()
    }

    /// Handles of all root figures, oldest first.
    pub fn figures(&self) -> Vec<Handle> {
        self.objects
            .iter()
            .filter(|(_, o)| matches!(o, GraphicsObject::Figure(_)))
            .map(|(h, _)| *h)
            .collect()
    }

    /// Delete an object and everything below it. Returns false if unknown.
    pub fn remove(&mut self, handle: Handle) -> bool {
        let Some(object) = self.objects.remove(&handle) else {
            return false;
        };
        for child in object.children().to_vec() {
            self.remove(child);
        }
        if let Some(parent) = self.parents.remove(&handle) {
            if let Some(siblings) = self.objects.get_mut(&parent).and_then(|p| p.children_mut()) {
                siblings.retain(|h| *h != handle);
            }
        }
        if let Some(canvas) = self.canvases.remove(&handle) {
            ContextRegistry::release(canvas);
        }
        true
    }

    /// Give a figure an on-screen canvas and make it current.
    pub fn attach_canvas(&mut self, figure: Handle) -> Result<ContextId> {
        if !matches!(self.objects.get(&figure), Some(GraphicsObject::Figure(_))) {
            return Err(Error::InvalidHandle(format!(
                "{} is not a figure, cannot attach a canvas",
                figure
            )));
        }
        if let Some(old) = self.canvases.remove(&figure) {
            ContextRegistry::release(old);
        }
        let id = ContextRegistry::register();
        ContextRegistry::make_current(id);
        self.canvases.insert(figure, id);
        log::debug!("figure {} drawing through canvas {}", figure, id);
        Ok(id)
    }

    pub fn canvas(&self, figure: Handle) -> Option<ContextId> {
        self.canvases.get(&figure).copied()
    }

    /// Every `set_visible` call received, in order.
    pub fn visibility_log(&self) -> &[(Handle, bool)] {
        &self.visibility_log
    }

    fn figure(&self, handle: Handle) -> Option<&Figure> {
        match self.objects.get(&handle) {
            Some(GraphicsObject::Figure(f)) => Some(f),
            _ => None,
        }
    }
}

impl SceneHost for GraphicsManager {
    fn resolve(&self, handle: Handle) -> Option<&GraphicsObject> {
        self.objects.get(&handle)
    }

    fn bounding_box(&self, figure: Handle, internal: bool) -> Option<BoundingBox> {
        let [x, y, width, height] = self.figure(figure)?.position;
        let y = if internal {
            y
        } else {
            self.screen_height - (y + height)
        };
        Some(BoundingBox {
            x,
            y,
            width,
            height,
        })
    }

    fn is_visible(&self, figure: Handle) -> bool {
        self.figure(figure).is_some_and(|f| f.visible)
    }

    fn set_visible(&mut self, figure: Handle, visible: bool) {
        self.visibility_log.push((figure, visible));
        let canvas = self.canvases.get(&figure).copied();
        let Some(GraphicsObject::Figure(f)) = self.objects.get_mut(&figure) else {
            return;
        };
        let shown = !f.visible && visible;
        f.visible = visible;
        if shown {
            if let Some(canvas) = canvas {
                if ContextRegistry::make_current(canvas) {
                    log::trace!("figure {} re-selected canvas {}", figure, canvas);
                }
            }
        }
    }
}

impl Drop for GraphicsManager {
    fn drop(&mut self) {
        for (_, canvas) in self.canvases.drain() {
            ContextRegistry::release(canvas);
        }
    }
}
