use crate::document::PageDocument;

type Observer = Box<dyn FnMut(&mut PageDocument)>;

/// The page's change-notification hub.
///
/// The host fires exactly two trigger kinds at it: the one-shot ready signal
/// and node-addition batches (infinite scroll, AJAX-injected content).
/// Observers are registered explicitly and invoked synchronously in
/// registration order; the hub owns no scanning state of its own. A
/// nodes-added notification carries no diff: observers re-run their full
/// pass and rely on their own idempotence.
#[derive(Default)]
pub struct PageEvents {
    ready: Vec<Observer>,
    nodes_added: Vec<Observer>,
}

impl PageEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_ready(&mut self, observer: impl FnMut(&mut PageDocument) + 'static) {
        self.ready.push(Box::new(observer));
    }

    pub fn on_nodes_added(&mut self, observer: impl FnMut(&mut PageDocument) + 'static) {
        self.nodes_added.push(Box::new(observer));
    }

    /// Marks the document's structural content available and runs the
    /// deferred-initialization observers.
    pub fn notify_ready(&mut self, doc: &mut PageDocument) {
        doc.set_ready();
        for observer in &mut self.ready {
            observer(doc);
        }
    }

    /// Reports a batch of added nodes. Runs for the lifetime of the page;
    /// there is no teardown.
    pub fn notify_nodes_added(&mut self, doc: &mut PageDocument) {
        for observer in &mut self.nodes_added {
            observer(doc);
        }
    }
}
