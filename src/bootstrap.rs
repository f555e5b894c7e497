use crate::config::Settings;
use crate::document::{PageDocument, ReadyState};
use crate::scan::Scanner;
use crate::watch::PageEvents;
use crate::widget::LightboxWidget;
use crate::{LightwireError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the page's one scanner, threaded into the event
/// observers.
pub type ScannerHandle = Rc<RefCell<Scanner>>;

/// The single initialization entry point, called once per page after the
/// asset layer has decided the feature is active and injected the embedded
/// settings.
///
/// A missing widget or missing/unparsable settings object is a fatal
/// precondition: the error is reported and nothing is wired, with no retry.
/// When settings disable the feature, or the page was already bootstrapped,
/// returns `Ok(None)` without touching the page. Otherwise the scanner is
/// registered against the page events; if the document is still loading the
/// initial pass is deferred to the ready notification, and node-addition
/// batches are ignored until that first pass has run.
pub fn bootstrap(
    doc: &mut PageDocument,
    events: &mut PageEvents,
    embedded_settings: Option<&str>,
    widget: Option<Box<dyn LightboxWidget>>,
) -> Result<Option<ScannerHandle>> {
    let Some(widget) = widget else {
        tracing::error!("auto lightbox: widget library not loaded");
        return Err(LightwireError::WidgetMissing);
    };
    let Some(raw_settings) = embedded_settings else {
        tracing::error!("auto lightbox: settings not found");
        return Err(LightwireError::SettingsMissing);
    };
    let settings = Settings::from_embedded_json(raw_settings).map_err(|err| {
        tracing::error!(error = %err, "auto lightbox: settings not parsable");
        err
    })?;

    if !settings.enabled {
        tracing::debug!("auto lightbox disabled in settings");
        return Ok(None);
    }
    if doc.lightbox_bootstrapped {
        tracing::debug!("auto lightbox already bootstrapped for this page");
        return Ok(None);
    }
    doc.lightbox_bootstrapped = true;

    let scanner = Rc::new(RefCell::new(Scanner::new(&settings, widget)));

    let on_added = Rc::clone(&scanner);
    events.on_nodes_added(move |doc| {
        let mut scanner = on_added.borrow_mut();
        if scanner.started() {
            scanner.scan(doc);
        }
    });

    match doc.ready_state() {
        ReadyState::Complete => scanner.borrow_mut().start(doc),
        ReadyState::Loading => {
            let deferred = Rc::clone(&scanner);
            events.on_ready(move |doc| deferred.borrow_mut().start(doc));
        }
    }

    Ok(Some(scanner))
}
