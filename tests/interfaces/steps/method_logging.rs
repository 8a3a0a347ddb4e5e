//! Method logging step definitions.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cucumber::{given, then, when, World};
use tracing::Level;

use methodlog::{MemorySink, MethodLogger, MethodSignature, Render, Renderer, Visibility};

/// Test context for method logging scenarios.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct MethodLoggingWorld {
    sink: Arc<MemorySink>,
    logger: Option<MethodLogger>,
    returned: Option<String>,
    last_error: Option<String>,
    last_panic: Option<String>,
}

impl MethodLoggingWorld {
    fn new() -> Self {
        Self {
            sink: Arc::new(MemorySink::new()),
            logger: None,
            returned: None,
            last_error: None,
            last_panic: None,
        }
    }

    fn logger(&self) -> &MethodLogger {
        self.logger
            .as_ref()
            .expect("Method logger not initialized")
    }

    fn install(&mut self, namespace: &str, enabled: bool) {
        self.sink = Arc::new(MemorySink::new());
        self.logger = Some(
            MethodLogger::builder(self.sink.clone())
                .namespace(namespace)
                .enabled(enabled)
                .build(),
        );
    }

    fn call_returning(&mut self, method: &MethodSignature, args: &str, returning: Option<String>) {
        let args = Arg::parse_all(args);
        let refs: Vec<&dyn Render> = args.iter().map(|a| a as &dyn Render).collect();

        let result: Result<Option<String>, StepError> =
            self.logger().call(method, &refs, || Ok(returning));
        self.returned = result.ok().flatten();
    }
}

/// Argument parsed from a step: integers stay integers.
#[derive(Debug)]
enum Arg {
    Int(i64),
    Text(String),
}

impl Arg {
    fn parse_all(args: &str) -> Vec<Arg> {
        args.split_whitespace()
            .map(|token| match token.parse() {
                Ok(n) => Arg::Int(n),
                Err(_) => Arg::Text(token.to_string()),
            })
            .collect()
    }
}

impl Render for Arg {
    fn render(&self, out: &mut Renderer<'_>) {
        match self {
            Arg::Int(n) => n.render(out),
            Arg::Text(s) => s.render(out),
        }
    }
}

#[derive(Debug)]
struct StepError(String);

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn leak(s: &str) -> &'static str {
    Box::leak(s.to_string().into_boxed_str())
}

/// Build a signature from a `module::Type::method` path.
fn signature(path: &str, visibility: Visibility) -> MethodSignature {
    let (declaring, name) = path
        .rsplit_once("::")
        .expect("method path must be module::Type::method");
    MethodSignature::new(leak(declaring), leak(name)).with_visibility(visibility)
}

fn level(name: &str) -> Level {
    name.parse().expect("unknown level")
}

// --- Given steps ---

#[given(expr = "a method logger for namespace {string}")]
async fn given_logger(world: &mut MethodLoggingWorld, namespace: String) {
    world.install(&namespace, true);
}

#[given(expr = "a disabled method logger for namespace {string}")]
async fn given_disabled_logger(world: &mut MethodLoggingWorld, namespace: String) {
    world.install(&namespace, false);
}

// --- When steps ---

#[when(expr = "public method {string} is called with {string} returning {string}")]
async fn when_public_called(
    world: &mut MethodLoggingWorld,
    path: String,
    args: String,
    returning: String,
) {
    let method = signature(&path, Visibility::Public);
    world.call_returning(&method, &args, Some(returning));
}

#[when(expr = "public method {string} is called with no arguments returning nothing")]
async fn when_public_called_bare(world: &mut MethodLoggingWorld, path: String) {
    let method = signature(&path, Visibility::Public);
    world.call_returning(&method, "", None);
}

#[when(expr = "public method {string} taking {string} is called with {string} returning {string}")]
async fn when_overload_called(
    world: &mut MethodLoggingWorld,
    path: String,
    param: String,
    args: String,
    returning: String,
) {
    let params: &'static [&'static str] = Box::leak(vec![leak(&param)].into_boxed_slice());
    let method = signature(&path, Visibility::Public).with_params(params);
    world.call_returning(&method, &args, Some(returning));
}

#[when(expr = "private method {string} is called with {string} returning {string}")]
async fn when_private_called(
    world: &mut MethodLoggingWorld,
    path: String,
    args: String,
    returning: String,
) {
    let method = signature(&path, Visibility::Private);
    world.call_returning(&method, &args, Some(returning));
}

#[when(expr = "{word} method {string} marked {string} is called with {string} returning {string}")]
async fn when_marked_called(
    world: &mut MethodLoggingWorld,
    visibility: String,
    path: String,
    description: String,
    args: String,
    returning: String,
) {
    let visibility = match visibility.as_str() {
        "public" => Visibility::Public,
        _ => Visibility::Private,
    };
    let method = signature(&path, visibility).marked(leak(&description));
    world.call_returning(&method, &args, Some(returning));
}

#[when(expr = "public method {string} fails with {string}")]
async fn when_public_fails(world: &mut MethodLoggingWorld, path: String, message: String) {
    let method = signature(&path, Visibility::Public);
    let result: Result<String, StepError> =
        world.logger().call(&method, &[], || Err(StepError(message)));
    world.last_error = result.err().map(|e| e.0);
}

#[when(expr = "public method {string} panics with {string}")]
async fn when_public_panics(world: &mut MethodLoggingWorld, path: String, message: String) {
    let method = signature(&path, Visibility::Public);
    let logger = world.logger();
    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.call_plain(&method, &[], || -> String { panic!("{}", message) })
    }));
    world.last_panic = caught.err().and_then(|payload| {
        payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
    });
}

// --- Then steps ---

#[then(regex = r"^(\d+) (DEBUG|INFO|ERROR) entr(?:y is|ies are) logged$")]
async fn then_count_at_level(world: &mut MethodLoggingWorld, count: usize, level_name: String) {
    let records = world.sink.at_level(level(&level_name));
    assert_eq!(
        records.len(),
        count,
        "expected {} {} entries, got {:?}",
        count,
        level_name,
        records
    );
}

#[then(regex = r#"^an? (DEBUG|INFO|ERROR) entry contains "(.*)"$"#)]
async fn then_entry_contains(world: &mut MethodLoggingWorld, level_name: String, needle: String) {
    let records = world.sink.at_level(level(&level_name));
    assert!(
        records.iter().any(|r| r.message.contains(&needle)),
        "no {} entry contains {:?}: {:?}",
        level_name,
        needle,
        records
    );
}

#[then("no entries are logged")]
async fn then_nothing_logged(world: &mut MethodLoggingWorld) {
    assert!(world.sink.records().is_empty(), "{:?}", world.sink.records());
}

#[then(expr = "every entry is labelled {string}")]
async fn then_every_entry_labelled(world: &mut MethodLoggingWorld, token: String) {
    let records = world.sink.records();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.method == token), "{:?}", records);
}

#[then(expr = "the caller receives {string}")]
async fn then_caller_receives(world: &mut MethodLoggingWorld, expected: String) {
    assert_eq!(world.returned.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the caller observes the error {string}")]
async fn then_caller_observes_error(world: &mut MethodLoggingWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}

#[then(expr = "the caller observes the panic {string}")]
async fn then_caller_observes_panic(world: &mut MethodLoggingWorld, message: String) {
    assert_eq!(world.last_panic.as_deref(), Some(message.as_str()));
}
