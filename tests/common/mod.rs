#![allow(dead_code)]

use lightwire::widget::{LightboxHandle, LightboxWidget, WidgetOptions};
use std::cell::RefCell;
use std::rc::Rc;

/// What the widget collaborator was asked to do, shared with the test body.
#[derive(Default)]
pub struct WidgetLog {
    pub created: Vec<WidgetOptions>,
    pub reloaded: Vec<String>,
}

pub struct RecordingWidget {
    log: Rc<RefCell<WidgetLog>>,
}

impl RecordingWidget {
    pub fn new() -> (Self, Rc<RefCell<WidgetLog>>) {
        let log = Rc::new(RefCell::new(WidgetLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl LightboxWidget for RecordingWidget {
    fn create(&mut self, options: WidgetOptions) -> Box<dyn LightboxHandle> {
        let selector = options.selector.clone();
        self.log.borrow_mut().created.push(options);
        Box::new(RecordingHandle {
            selector,
            log: Rc::clone(&self.log),
        })
    }
}

struct RecordingHandle {
    selector: String,
    log: Rc<RefCell<WidgetLog>>,
}

impl LightboxHandle for RecordingHandle {
    fn reload(&mut self) {
        self.log.borrow_mut().reloaded.push(self.selector.clone());
    }
}
