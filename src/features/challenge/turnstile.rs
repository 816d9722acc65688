//! Binding to `window.turnstile` through `js_sys::Reflect`.
//!
//! The SDK's completion callback is kept alive per widget and only logs; the
//! controller reads tokens with `getResponse` when the visitor submits.

use super::{
    script::sdk_global,
    sdk::{ChallengeSdk, WidgetId},
};
use js_sys::{Function, Object, Reflect};
use std::{cell::RefCell, collections::HashMap};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::HtmlElement;

#[derive(Default)]
pub struct TurnstileSdk {
    callbacks: RefCell<HashMap<WidgetId, Closure<dyn FnMut(JsValue)>>>,
}

impl ChallengeSdk for TurnstileSdk {
    type Mount = HtmlElement;

    fn mount_is_valid(&self, mount: &Self::Mount) -> bool {
        mount.is_connected()
    }

    fn render(&self, mount: &Self::Mount, sitekey: &str) -> Result<WidgetId, String> {
        let sdk = sdk_global().ok_or_else(|| "turnstile is not loaded".to_string())?;

        let callback = Closure::<dyn FnMut(JsValue)>::new(|_token: JsValue| {
            debug!("verification challenge completed");
        });
        let options = Object::new();
        Reflect::set(&options, &"sitekey".into(), &sitekey.into())
            .map_err(|err| format!("failed to set sitekey: {err:?}"))?;
        Reflect::set(&options, &"callback".into(), callback.as_ref())
            .map_err(|err| format!("failed to set callback: {err:?}"))?;

        let id = method(&sdk, "render")?
            .call2(&sdk, mount, &options)
            .map_err(|err| format!("render failed: {err:?}"))?
            .as_string()
            .ok_or_else(|| "render returned no widget id".to_string())?;

        let id = WidgetId::new(id);
        self.callbacks.borrow_mut().insert(id.clone(), callback);
        Ok(id)
    }

    fn get_response(&self, id: &WidgetId) -> Option<String> {
        let sdk = sdk_global()?;
        method(&sdk, "getResponse")
            .ok()?
            .call1(&sdk, &id.as_str().into())
            .ok()?
            .as_string()
    }

    fn reset(&self, id: &WidgetId) {
        call_with_id("reset", id);
    }

    fn remove(&self, id: &WidgetId) {
        call_with_id("remove", id);
        self.callbacks.borrow_mut().remove(id);
    }
}

fn method(sdk: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(sdk, &JsValue::from_str(name))
        .map_err(|err| format!("turnstile.{name} is unavailable: {err:?}"))?
        .dyn_into::<Function>()
        .map_err(|_| format!("turnstile.{name} is not a function"))
}

fn call_with_id(name: &str, id: &WidgetId) {
    let Some(sdk) = sdk_global() else {
        return;
    };
    let result = method(&sdk, name).and_then(|function| {
        function
            .call1(&sdk, &id.as_str().into())
            .map_err(|err| format!("{err:?}"))
    });
    if let Err(err) = result {
        warn!(widget = %id, error = %err, "turnstile.{name} failed");
    }
}
