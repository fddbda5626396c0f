/// `requestAnimationFrame` loop driving a viewer
use log::error;
use mview_core::FrameStatus;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::WebViewer;

type FrameCallback = Closure<dyn FnMut()>;

/// Requests one frame after another until the viewer stops or goes away.
pub struct AnimationLoop {
    callback: Rc<RefCell<Option<FrameCallback>>>,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start(viewer: &Rc<RefCell<WebViewer>>) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let weak: Weak<RefCell<WebViewer>> = Rc::downgrade(viewer);
        let next = Rc::clone(&callback);
        let pending = Rc::clone(&handle);

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending.set(None);

            let status = match weak.upgrade() {
                Some(viewer) => {
                    let status = viewer.borrow_mut().frame();
                    status
                }
                None => Ok(FrameStatus::Stopped),
            };

            match status {
                Ok(FrameStatus::Continue) => {}
                Ok(FrameStatus::Stopped) => {
                    // Drop our handle to this closure so it is freed once we return
                    let _ = next.borrow_mut().take();
                    return;
                }
                Err(err) => error!("frame failed: {}", err),
            }

            if let Some(callback) = next.borrow().as_ref() {
                match request_frame(callback) {
                    Ok(id) => pending.set(Some(id)),
                    Err(err) => error!("requestAnimationFrame failed: {:?}", err),
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(first) = callback.borrow().as_ref() {
            handle.set(Some(request_frame(first)?));
        }

        Ok(Self { callback, handle })
    }

    /// Whether the callback is alive to schedule another frame.
    pub fn is_running(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Cancels the pending frame request and frees the callback.
    pub fn stop(&self) {
        if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        let _ = self.callback.borrow_mut().take();
    }
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from(js_sys::Error::new("no global window")))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}
