use std::rc::Rc;

use crate::notification::{EvictionListener, RemovalCause};

pub(crate) struct RemovalNotifier<V> {
    listener: EvictionListener<V>,
    is_enabled: bool,
    #[cfg(feature = "logging")]
    cache_name: Option<String>,
}

impl<V> RemovalNotifier<V> {
    pub(crate) fn new(listener: EvictionListener<V>, _cache_name: Option<String>) -> Self {
        Self {
            listener,
            is_enabled: true,
            #[cfg(feature = "logging")]
            cache_name: _cache_name,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub(crate) fn notify(&mut self, name: Rc<str>, payload: V, cause: RemovalCause) {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        if !self.is_enabled() {
            return;
        }

        let listener = &mut self.listener;
        let listener_clo = move || listener(name, payload, cause);

        // Safety: It is safe to assert unwind safety here because we will not
        // call the listener again if it has been panicked.
        let result = catch_unwind(AssertUnwindSafe(listener_clo));
        if let Err(_payload) = result {
            self.is_enabled = false;
            #[cfg(feature = "logging")]
            log_panic(&*_payload, self.cache_name.as_deref());
        }
    }
}

#[cfg(feature = "logging")]
fn log_panic(payload: &(dyn std::any::Any + Send + 'static), cache_name: Option<&str>) {
    // Try to downcast the payload into &str or String.
    let message: Option<std::borrow::Cow<'_, str>> =
        (payload.downcast_ref::<&str>().map(|s| (*s).into()))
            .or_else(|| payload.downcast_ref::<String>().map(Into::into));

    let cn = cache_name
        .map(|name| format!("[{name}] "))
        .unwrap_or_default();

    if let Some(m) = message {
        log::error!("{cn}Disabled the eviction listener because it panicked at '{m}'");
    } else {
        log::error!("{cn}Disabled the eviction listener because it panicked");
    }
}
