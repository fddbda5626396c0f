/// Canvas layout tracking
use js_sys::Array;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, ResizeObserver};

use crate::WebViewer;

type ResizeCallback = Closure<dyn FnMut(Array)>;

/// Resizes the viewer whenever the canvas's displayed size changes, whether
/// from a window resize or a page layout change.
pub struct ResizeWatch {
    observer: ResizeObserver,
    _callback: ResizeCallback,
}

impl ResizeWatch {
    pub fn observe(
        canvas: &HtmlCanvasElement,
        viewer: &Rc<RefCell<WebViewer>>,
    ) -> Result<Self, JsValue> {
        let weak = Rc::downgrade(viewer);
        let callback = Closure::wrap(Box::new(move |_entries: Array| {
            if let Some(viewer) = weak.upgrade() {
                let mut viewer = viewer.borrow_mut();
                if !viewer.is_destroyed() {
                    debug!("canvas resized");
                    viewer.on_resize();
                }
            }
        }) as Box<dyn FnMut(Array)>);

        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(canvas);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}
