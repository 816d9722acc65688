//! DOM-backed script host and the process-wide Turnstile loader.
//!
//! The script element is appended to `<body>` once per page. Load and error
//! listeners feed a oneshot channel that races a `gloo-timers` timeout.

use super::loader::{ScriptHost, ScriptLoadError, ScriptLoader};
use crate::app_lib::config::AppConfig;
use futures::{
    FutureExt,
    channel::oneshot,
    future::{Either, LocalBoxFuture, select},
};
use gloo_timers::future::TimeoutFuture;
use js_sys::Reflect;
use std::{
    cell::{OnceCell, RefCell},
    pin::pin,
    rc::Rc,
};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::HtmlScriptElement;

/// Id of the injected `<script>` element.
pub const SCRIPT_ELEMENT_ID: &str = "turnstile-script";
/// Name of the SDK global on `window`.
pub const SDK_GLOBAL: &str = "turnstile";

thread_local! {
    static SHARED_LOADER: OnceCell<Rc<ScriptLoader<DomScriptHost>>> = const { OnceCell::new() };
}

/// The page-wide Turnstile loader. Every form shares it, so the SDK is injected
/// at most once while the page lives.
pub fn shared_loader(config: &AppConfig) -> Rc<ScriptLoader<DomScriptHost>> {
    SHARED_LOADER.with(|cell| {
        Rc::clone(cell.get_or_init(|| {
            Rc::new(ScriptLoader::new(DomScriptHost::new(
                &config.turnstile_script_url,
                config.script_timeout_ms,
            )))
        }))
    })
}

#[derive(Clone, Debug)]
pub struct DomScriptHost {
    src: String,
    timeout_ms: u32,
}

impl DomScriptHost {
    pub fn new(src: &str, timeout_ms: u32) -> Self {
        Self {
            src: src.to_string(),
            timeout_ms,
        }
    }
}

impl ScriptHost for DomScriptHost {
    fn sdk_present(&self) -> bool {
        sdk_global().is_some()
    }

    fn inject(&self) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>> {
        let src = self.src.clone();
        let timeout_ms = self.timeout_ms;
        async move { load_script(&src, timeout_ms).await }.boxed_local()
    }

    fn remove(&self) {
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(SCRIPT_ELEMENT_ID));
        if let Some(element) = element {
            element.remove();
        }
    }
}

/// Returns `window.turnstile` when it is defined.
pub(crate) fn sdk_global() -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(SDK_GLOBAL)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

async fn load_script(src: &str, timeout_ms: u32) -> Result<(), ScriptLoadError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ScriptLoadError::Injection("document is not available".to_string()))?;
    let body = document
        .body()
        .ok_or_else(|| ScriptLoadError::Injection("document has no body".to_string()))?;

    let script = document
        .create_element("script")
        .map_err(|err| ScriptLoadError::Injection(format!("{err:?}")))?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| ScriptLoadError::Injection("unexpected script element type".to_string()))?;
    script.set_id(SCRIPT_ELEMENT_ID);
    script.set_src(src);
    script.set_async(true);
    script.set_defer(true);

    let (sender, receiver) = oneshot::channel::<Result<(), ScriptLoadError>>();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let load_sender = Rc::clone(&sender);
    let on_load = Closure::<dyn FnMut()>::new(move || {
        if let Some(sender) = load_sender.borrow_mut().take() {
            let _ = sender.send(Ok(()));
        }
    });
    let error_sender = Rc::clone(&sender);
    let on_error = Closure::<dyn FnMut()>::new(move || {
        if let Some(sender) = error_sender.borrow_mut().take() {
            let _ = sender.send(Err(ScriptLoadError::Network));
        }
    });
    script.set_onload(Some(on_load.as_ref().unchecked_ref()));
    script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    body.append_child(&script)
        .map_err(|err| ScriptLoadError::Injection(format!("{err:?}")))?;

    let timeout = pin!(TimeoutFuture::new(timeout_ms));
    let outcome = match select(receiver, timeout).await {
        Either::Left((Ok(result), _)) => result,
        Either::Left((Err(_), _)) => Err(ScriptLoadError::Injection(
            "script listener dropped".to_string(),
        )),
        Either::Right(((), _)) => Err(ScriptLoadError::Timeout { timeout_ms }),
    };

    // Listeners must not outlive the closures they point at.
    script.set_onload(None);
    script.set_onerror(None);
    drop(on_load);
    drop(on_error);

    outcome
}
