//! Applying the logging advice to calls.
//!
//! [`MethodLogger`] is the interception point: callers route the calls they
//! want observed through it, together with the method's signature and its
//! arguments. Both rules are evaluated against the signature on every call.
//!
//! ```
//! use std::sync::Arc;
//! use methodlog::{MethodLogger, MethodSignature, MemorySink};
//!
//! static BAR: MethodSignature = MethodSignature::new("demo::Foo", "bar");
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = MethodLogger::builder(sink.clone()).namespace("demo").build();
//!
//! let n = 42;
//! let out: Result<String, std::fmt::Error> = logger.call(&BAR, &[&n, &"x"], || Ok("ok".into()));
//!
//! assert_eq!(out.unwrap(), "ok");
//! assert_eq!(sink.records().len(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;

use super::{Invocation, LoggerAdvice};
use crate::config::{AdviceConfig, Config, RenderConfig};
use crate::pointcut::{MarkerRule, NamespaceRule, Pointcut};
use crate::render::Render;
use crate::signature::MethodSignature;
use crate::sink::LogSink;

/// Message used for panics whose payload is not a string.
const OPAQUE_PANIC: &str = "Box<dyn Any>";

/// Which rules selected a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matched {
    pub namespaced: bool,
    pub marked: bool,
}

impl Matched {
    pub fn any(self) -> bool {
        self.namespaced || self.marked
    }
}

/// Entry point for advised calls.
///
/// Holds no per-call state; share it freely across threads.
#[derive(Clone)]
pub struct MethodLogger {
    advice: LoggerAdvice,
    namespace: NamespaceRule,
    enabled: bool,
}

impl MethodLogger {
    pub fn builder(sink: Arc<dyn LogSink>) -> MethodLoggerBuilder {
        MethodLoggerBuilder::new(sink)
    }

    /// Build from loaded configuration.
    pub fn from_config(sink: Arc<dyn LogSink>, config: &Config) -> Self {
        Self::builder(sink)
            .advice_config(&config.advice)
            .render_config(config.render.clone())
            .build()
    }

    pub fn advice(&self) -> &LoggerAdvice {
        &self.advice
    }

    pub fn namespace(&self) -> &NamespaceRule {
        &self.namespace
    }

    /// Evaluate both rules for `method`.
    pub fn matches(&self, method: &MethodSignature) -> Matched {
        if !self.enabled {
            return Matched::default();
        }
        Matched {
            namespaced: self.namespace.matches(method),
            marked: MarkerRule.matches(method),
        }
    }

    /// Run a fallible method body under the advice.
    ///
    /// `Err` is reported to the namespace failure advice and returned as is.
    /// A panic in `body` is reported the same way and then resumed.
    pub fn call<R, E, F>(&self, method: &MethodSignature, args: &[&dyn Render], body: F) -> Result<R, E>
    where
        R: Render,
        E: fmt::Display,
        F: FnOnce() -> Result<R, E>,
    {
        let matched = self.before(method, args);
        let outcome = panic::catch_unwind(AssertUnwindSafe(body));
        self.complete(method, matched, outcome)
    }

    /// Run an infallible method body under the advice.
    pub fn call_plain<R, F>(&self, method: &MethodSignature, args: &[&dyn Render], body: F) -> R
    where
        R: Render,
        F: FnOnce() -> R,
    {
        let result: Result<R, std::convert::Infallible> =
            self.call(method, args, || Ok(body()));
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Advise an asynchronous call.
    ///
    /// The before-advice fires immediately, when the call is made; the
    /// after-advice fires when `fut` completes.
    pub fn call_async<'a, R, E, Fut>(
        &'a self,
        method: &'a MethodSignature,
        args: &[&dyn Render],
        fut: Fut,
    ) -> impl Future<Output = Result<R, E>> + 'a
    where
        R: Render + 'a,
        E: fmt::Display + 'a,
        Fut: Future<Output = Result<R, E>> + 'a,
    {
        let matched = self.before(method, args);
        async move {
            let outcome = AssertUnwindSafe(fut).catch_unwind().await;
            self.complete(method, matched, outcome)
        }
    }

    fn before(&self, method: &MethodSignature, args: &[&dyn Render]) -> Matched {
        let matched = self.matches(method);
        if matched.any() {
            let call = Invocation::new(method, args);
            if matched.namespaced {
                self.advice.before_namespaced(&call);
            }
            if matched.marked {
                self.advice.before_marked(&call);
            }
        }
        matched
    }

    fn complete<R, E>(
        &self,
        method: &MethodSignature,
        matched: Matched,
        outcome: Result<Result<R, E>, Box<dyn Any + Send>>,
    ) -> Result<R, E>
    where
        R: Render,
        E: fmt::Display,
    {
        match outcome {
            Ok(Ok(value)) => {
                if matched.namespaced {
                    self.advice.after_namespaced(method, Some(&value));
                }
                if matched.marked {
                    self.advice.after_marked(method, Some(&value));
                }
                Ok(value)
            }
            Ok(Err(error)) => {
                if matched.namespaced {
                    self.advice.on_error(method, &error);
                }
                Err(error)
            }
            Err(payload) => {
                if matched.namespaced {
                    self.advice.on_error(method, &panic_message(&*payload));
                }
                panic::resume_unwind(payload)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        OPAQUE_PANIC
    }
}

impl fmt::Debug for MethodLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodLogger")
            .field("namespace", &self.namespace.prefix())
            .field("enabled", &self.enabled)
            .field("render", self.advice.render_config())
            .finish_non_exhaustive()
    }
}

/// Builder for [`MethodLogger`].
pub struct MethodLoggerBuilder {
    sink: Arc<dyn LogSink>,
    namespace: String,
    enabled: bool,
    render: RenderConfig,
}

impl MethodLoggerBuilder {
    fn new(sink: Arc<dyn LogSink>) -> Self {
        let defaults = AdviceConfig::default();
        Self {
            sink,
            namespace: defaults.namespace,
            enabled: defaults.enabled,
            render: RenderConfig::default(),
        }
    }

    /// Path prefix for the namespace rule.
    pub fn namespace(mut self, prefix: impl Into<String>) -> Self {
        self.namespace = prefix.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn advice_config(mut self, config: &AdviceConfig) -> Self {
        self.namespace = config.namespace.clone();
        self.enabled = config.enabled;
        self
    }

    pub fn render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn build(self) -> MethodLogger {
        MethodLogger {
            advice: LoggerAdvice::new(self.sink, self.render),
            namespace: NamespaceRule::new(self.namespace),
            enabled: self.enabled,
        }
    }
}
