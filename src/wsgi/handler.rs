use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;

use crate::http::response::StartResponse;
use crate::wsgi::environ::Environ;

/// Lazy, one-shot sequence of response body fragments.
pub type Body = Box<dyn Iterator<Item = Bytes>>;

/// An application the engine can invoke.
///
/// The handler receives the request's environ and the declaration
/// callback. It must call [`StartResponse::declare`] before returning its
/// body; the body is consumed once, in order, after `call` returns.
pub trait Handler: Send + Sync {
    fn call(&self, environ: &mut Environ, start_response: &mut StartResponse)
        -> anyhow::Result<Body>;
}

impl<F> Handler for F
where
    F: Fn(&mut Environ, &mut StartResponse) -> anyhow::Result<Body> + Send + Sync,
{
    fn call(
        &self,
        environ: &mut Environ,
        start_response: &mut StartResponse,
    ) -> anyhow::Result<Body> {
        self(environ, start_response)
    }
}

/// Boxes any fragment iterator into a [`Body`].
pub fn body<I>(fragments: I) -> Body
where
    I: IntoIterator<Item = Bytes>,
    I::IntoIter: 'static,
{
    Box::new(fragments.into_iter())
}

/// Handlers addressable by a `module:callable` name.
///
/// The hosting process registers everything it can serve up front; the
/// name given on the command line is resolved once before the accept loop
/// starts.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Looks up `module:callable`.
    pub fn resolve(&self, app_path: &str) -> anyhow::Result<Arc<dyn Handler>> {
        let (module, callable) = app_path
            .split_once(':')
            .with_context(|| format!("expected module:callable, got {:?}", app_path))?;

        if module.is_empty() || callable.is_empty() {
            anyhow::bail!("expected module:callable, got {:?}", app_path);
        }

        self.handlers.get(app_path).cloned().with_context(|| {
            format!(
                "no application registered as {:?} (available: {})",
                app_path,
                self.names().collect::<Vec<_>>().join(", ")
            )
        })
    }
}
