//! methodlog - method-level logging advice
//!
//! Observes calls to selected methods and emits structured log entries
//! describing the method, its arguments, its return value and failures.
//!
//! Calls are selected by two rules:
//!
//! - the namespace rule: public methods whose declaring type lives under a
//!   configured path prefix;
//! - the marker rule: methods whose [`MethodSignature`] carries a [`Marker`].
//!
//! Calls are routed through a [`MethodLogger`], which evaluates the rules,
//! fires the matching advice and returns the original outcome untouched.
//! Values are rendered through the [`Render`] capability; entries go to an
//! injected [`LogSink`].

pub mod advice;
pub mod config;
pub mod pointcut;
pub mod render;
pub mod signature;
pub mod sink;
pub mod utils;

pub use advice::{
    Invocation, LoggerAdvice, Matched, MethodLogger, MethodLoggerBuilder, ERROR_MONITORING_MARKER,
    INFO_MONITORING_MARKER,
};
pub use config::{AdviceConfig, Config, ConfigError, RenderConfig};
pub use pointcut::{MarkerRule, NamespaceRule, Pointcut};
pub use render::{Debugged, Opaque, Render, Renderer, Structural};
pub use signature::{Marker, MethodSignature, Visibility};
pub use sink::{AdviceKind, CapturedRecord, LogRecord, LogSink, MemorySink, TracingSink};
