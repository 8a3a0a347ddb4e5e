//! Logging advice.
//!
//! Five hooks, one per observation point. Each renders a deterministic
//! line and hands it to the injected sink; none of them touches the
//! arguments, the result or the failure it observes.
//!
//! A sink that panics is caught and the entry dropped. The process panic
//! hook still runs before the unwind is caught, so with the default hook
//! each dropped entry also prints a panic message to stderr. Hosts that
//! need a quiet stderr install their own hook with [`std::panic::set_hook`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::Level;

use super::Invocation;
use crate::config::RenderConfig;
use crate::pointcut::MarkerRule;
use crate::render::{render_params, render_return, Render};
use crate::signature::MethodSignature;
use crate::sink::{AdviceKind, LogRecord, LogSink};

/// Monitoring marker prefixed to failure entries.
pub const ERROR_MONITORING_MARKER: &str = "<<error:monitoring>>";
/// Monitoring marker prefixed to marker-rule argument entries.
pub const INFO_MONITORING_MARKER: &str = "<<info:monitoring>>";

/// The advice bodies, bound to a sink and rendering limits.
#[derive(Clone)]
pub struct LoggerAdvice {
    sink: Arc<dyn LogSink>,
    render: RenderConfig,
}

impl LoggerAdvice {
    pub fn new(sink: Arc<dyn LogSink>, render: RenderConfig) -> Self {
        Self { sink, render }
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Namespace rule, before the call: one DEBUG entry with the arguments.
    pub fn before_namespaced(&self, call: &Invocation<'_>) {
        let message = format!(
            "Executing method, {} Input params: {}",
            call.method.token(),
            render_params(call.args, &self.render)
        );
        self.emit(Level::DEBUG, AdviceKind::BeforeNamespaced, call.method, &message);
    }

    /// Namespace rule, after a normal return: one DEBUG entry with the result.
    pub fn after_namespaced(&self, method: &MethodSignature, result: Option<&dyn Render>) {
        let message = format!(
            "Method executed, {} Return value: {}",
            method.token(),
            render_return(result, &self.render)
        );
        self.emit(Level::DEBUG, AdviceKind::AfterNamespaced, method, &message);
    }

    /// Namespace rule, the call failed: one ERROR entry with the full
    /// signature and the failure message. The caller keeps propagating.
    pub fn on_error(&self, method: &MethodSignature, error: &dyn fmt::Display) {
        let message = format!(
            "{} {} execution failed. Thrown error: {}",
            ERROR_MONITORING_MARKER, method, error
        );
        self.emit(Level::ERROR, AdviceKind::Failed, method, &message);
    }

    /// Marker rule, before the call: the marker description, then a
    /// monitoring line with the arguments. Both at INFO.
    pub fn before_marked(&self, call: &Invocation<'_>) {
        let token = call.method.token();

        if let Some(marker) = MarkerRule.marker_of(call.method) {
            let message = format!("{} {}", token, marker.description);
            self.emit(Level::INFO, AdviceKind::MarkerDescription, call.method, &message);
        }

        let message = format!(
            "{} executing {} Input params: {}",
            INFO_MONITORING_MARKER,
            token,
            render_params(call.args, &self.render)
        );
        self.emit(Level::INFO, AdviceKind::BeforeMarked, call.method, &message);
    }

    /// Marker rule, after a normal return: one INFO entry with the result.
    pub fn after_marked(&self, method: &MethodSignature, result: Option<&dyn Render>) {
        let message = format!(
            "executed {} Return value: {}",
            method.token(),
            render_return(result, &self.render)
        );
        self.emit(Level::INFO, AdviceKind::AfterMarked, method, &message);
    }

    fn emit(&self, level: Level, advice: AdviceKind, method: &MethodSignature, message: &str) {
        let record = LogRecord {
            level,
            advice,
            method,
            message,
        };
        if panic::catch_unwind(AssertUnwindSafe(|| self.sink.emit(&record))).is_err() {
            tracing::warn!(method = %method.token(), %advice, "log sink panicked, entry dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    static BAR: MethodSignature = MethodSignature::new("demo::Foo", "bar")
        .with_params(&["i32", "&str"])
        .with_returns("String");
    static NIGHTLY: MethodSignature =
        MethodSignature::new("jobs::Batch", "run").marked("runs the nightly batch");

    fn advice() -> (Arc<MemorySink>, LoggerAdvice) {
        let sink = Arc::new(MemorySink::new());
        let advice = LoggerAdvice::new(sink.clone(), RenderConfig::default());
        (sink, advice)
    }

    #[test]
    fn test_before_namespaced_renders_arguments() {
        let (sink, advice) = advice();
        advice.before_namespaced(&Invocation::new(&BAR, &[&42, &"x"]));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::DEBUG);
        assert_eq!(records[0].advice, AdviceKind::BeforeNamespaced);
        assert_eq!(
            records[0].message,
            "Executing method, [Foo.bar] Input params: 42 x"
        );
    }

    #[test]
    fn test_before_namespaced_without_arguments() {
        let (sink, advice) = advice();
        advice.before_namespaced(&Invocation::new(&BAR, &[]));

        assert_eq!(
            sink.messages(),
            vec!["Executing method, [Foo.bar] Input params: ".to_string()]
        );
    }

    #[test]
    fn test_after_namespaced_renders_result_or_void() {
        let (sink, advice) = advice();
        advice.after_namespaced(&BAR, Some(&"ok"));
        advice.after_namespaced(&BAR, None);

        let messages = sink.messages();
        assert_eq!(messages[0], "Method executed, [Foo.bar] Return value: ok");
        assert_eq!(messages[1], "Method executed, [Foo.bar] Return value: void");
        assert!(sink.records().iter().all(|r| r.level == Level::DEBUG));
    }

    #[test]
    fn test_on_error_logs_signature_and_message() {
        let (sink, advice) = advice();
        advice.on_error(&BAR, &"bad state");

        let errors = sink.at_level(Level::ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "<<error:monitoring>> pub fn demo::Foo::bar(i32, &str) -> String execution failed. Thrown error: bad state"
        );
    }

    #[test]
    fn test_before_marked_logs_description_then_arguments() {
        let (sink, advice) = advice();
        advice.before_marked(&Invocation::new(&NIGHTLY, &[&3u8]));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.level == Level::INFO));
        assert_eq!(records[0].message, "[Batch.run] runs the nightly batch");
        assert_eq!(
            records[1].message,
            "<<info:monitoring>> executing [Batch.run] Input params: 3"
        );
    }

    #[test]
    fn test_after_marked() {
        let (sink, advice) = advice();
        advice.after_marked(&NIGHTLY, Some(&()));

        assert_eq!(
            sink.messages(),
            vec!["executed [Batch.run] Return value: void".to_string()]
        );
    }

    #[test]
    fn test_panicking_sink_is_contained() {
        let advice = LoggerAdvice::new(
            Arc::new(|_: &LogRecord<'_>| panic!("sink down")),
            RenderConfig::default(),
        );
        advice.after_namespaced(&BAR, None);
    }
}
