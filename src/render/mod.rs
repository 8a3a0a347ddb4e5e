//! Rendering arguments and return values into log text.
//!
//! Values opt in through the [`Render`] capability. Std scalars,
//! collections and smart pointers are covered here; user types either
//! implement [`Render`] (usually via [`Renderer::record`]) or are passed
//! through one of the adapters:
//!
//! - [`Structural`] dumps every field of a `Serialize` type.
//! - [`Debugged`] uses the `Debug` representation.
//! - [`Opaque`] prints only the type name and address.
//!
//! Output is bounded by [`RenderConfig`]: values nested deeper than
//! `max_depth` render as `...` and text beyond `max_len` bytes is cut.
//! Once the length limit is hit, remaining elements are skipped rather
//! than rendered and discarded. Absent values (`None`, `()`) render as
//! `void`.
//!
//! `HashMap` and `HashSet` entries are sorted by their rendered text, so
//! equal collections always produce the same line.
//!
//! A [`Render`] impl that panics is caught and rendered as
//! `<unrenderable>`. The process panic hook still runs first, so the
//! default hook prints the panic to stderr; hosts that want silence
//! install their own hook with [`std::panic::set_hook`].

mod adapters;
mod structural;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Write as _};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;

pub use adapters::{Debugged, Opaque};
pub use structural::Structural;

use crate::config::RenderConfig;

/// Token for absent values.
pub const VOID: &str = "void";
/// Token written in place of values nested past the depth limit, and after cut text.
pub const TRUNCATED: &str = "...";
/// Token written when a value panics while rendering.
pub const UNRENDERABLE: &str = "<unrenderable>";

/// Capability of producing a log representation.
pub trait Render {
    fn render(&self, out: &mut Renderer<'_>);
}

/// Bounded text buffer values render into.
pub struct Renderer<'a> {
    buf: String,
    config: &'a RenderConfig,
    depth: usize,
    cut: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            buf: String::new(),
            config,
            depth: 0,
            cut: false,
        }
    }

    /// Append raw text.
    pub fn text(&mut self, s: &str) {
        if self.cut {
            return;
        }
        self.buf.push_str(s);
        if self.config.max_len > 0 && self.buf.len() > self.config.max_len {
            let mut end = self.config.max_len;
            while !self.buf.is_char_boundary(end) {
                end -= 1;
            }
            self.buf.truncate(end);
            self.cut = true;
        }
    }

    /// Append the `Display` form of `value`.
    pub fn display(&mut self, value: impl fmt::Display) {
        let _ = write!(self, "{}", value);
    }

    /// Whether the length limit has been reached.
    pub fn is_cut(&self) -> bool {
        self.cut
    }

    /// Render a nested value, one level deeper.
    pub fn value<R: Render + ?Sized>(&mut self, value: &R) {
        if self.cut {
            return;
        }
        if self.depth >= self.config.max_depth {
            self.text(TRUNCATED);
            return;
        }
        self.depth += 1;
        value.render(self);
        self.depth -= 1;
    }

    /// Render `items` separated by `", "` between `open` and `close`.
    pub fn list<'v, I, R>(&mut self, open: &str, close: &str, items: I)
    where
        I: IntoIterator<Item = &'v R>,
        R: Render + ?Sized + 'v,
    {
        self.text(open);
        for (i, item) in items.into_iter().enumerate() {
            if self.cut {
                break;
            }
            if i > 0 {
                self.text(", ");
            }
            self.value(item);
        }
        self.text(close);
    }

    /// Write already rendered `items` in sorted order.
    pub fn sorted(&mut self, open: &str, close: &str, mut items: Vec<String>) {
        items.sort_unstable();
        self.text(open);
        for (i, item) in items.iter().enumerate() {
            if self.cut {
                break;
            }
            if i > 0 {
                self.text(", ");
            }
            self.text(item);
        }
        self.text(close);
    }

    /// Render into a separate buffer at the current depth.
    pub fn capture(&self, f: impl FnOnce(&mut Renderer<'a>)) -> String {
        let mut child = Renderer {
            buf: String::new(),
            config: self.config,
            depth: self.depth,
            cut: false,
        };
        f(&mut child);
        child.finish()
    }

    pub(crate) fn mark(&self) -> usize {
        self.buf.len()
    }

    /// Drop everything written since `mark`.
    pub(crate) fn rewind(&mut self, mark: usize) {
        self.buf.truncate(mark);
        self.cut = false;
    }

    /// Render `name{field=value, ...}`, the form used for user types.
    pub fn record(&mut self, name: &str, fields: &[(&str, &dyn Render)]) {
        self.text(name);
        self.text("{");
        for (i, (field, value)) in fields.iter().enumerate() {
            if self.cut {
                break;
            }
            if i > 0 {
                self.text(", ");
            }
            self.text(field);
            self.text("=");
            self.value(*value);
        }
        self.text("}");
    }

    pub fn finish(mut self) -> String {
        if self.cut {
            self.buf.push_str(TRUNCATED);
        }
        self.buf
    }
}

impl fmt::Write for Renderer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text(s);
        Ok(())
    }
}

/// Render one value. A panicking [`Render`] impl yields [`UNRENDERABLE`].
pub fn render_value(value: &dyn Render, config: &RenderConfig) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let mut out = Renderer::new(config);
        out.value(value);
        out.finish()
    }))
    .unwrap_or_else(|_| UNRENDERABLE.to_string())
}

/// Render an argument list, space separated. No arguments render as `""`.
pub fn render_params(args: &[&dyn Render], config: &RenderConfig) -> String {
    args.iter()
        .map(|arg| render_value(*arg, config))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a return value; an absent result renders as [`VOID`].
pub fn render_return(result: Option<&dyn Render>, config: &RenderConfig) -> String {
    match result {
        Some(value) => render_value(value, config),
        None => VOID.to_string(),
    }
}

macro_rules! render_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Render for $ty {
                fn render(&self, out: &mut Renderer<'_>) {
                    out.display(self);
                }
            }
        )*
    };
}

render_via_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl Render for str {
    fn render(&self, out: &mut Renderer<'_>) {
        out.text(self);
    }
}

impl Render for String {
    fn render(&self, out: &mut Renderer<'_>) {
        out.text(self);
    }
}

impl Render for () {
    fn render(&self, out: &mut Renderer<'_>) {
        out.text(VOID);
    }
}

impl<T: Render> Render for Option<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        match self {
            Some(value) => value.render(out),
            None => out.text(VOID),
        }
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, out: &mut Renderer<'_>) {
        (**self).render(out);
    }
}

impl<T: Render + ?Sized> Render for &mut T {
    fn render(&self, out: &mut Renderer<'_>) {
        (**self).render(out);
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        (**self).render(out);
    }
}

impl<T: Render + ?Sized> Render for Rc<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        (**self).render(out);
    }
}

impl<T: Render + ?Sized> Render for Arc<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        (**self).render(out);
    }
}

impl<T: Render> Render for [T] {
    fn render(&self, out: &mut Renderer<'_>) {
        out.list("[", "]", self.iter());
    }
}

impl<T: Render, const N: usize> Render for [T; N] {
    fn render(&self, out: &mut Renderer<'_>) {
        out.list("[", "]", self.iter());
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        out.list("[", "]", self.iter());
    }
}

impl<T: Render> Render for VecDeque<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        out.list("[", "]", self.iter());
    }
}

impl<T: Render, S> Render for HashSet<T, S> {
    fn render(&self, out: &mut Renderer<'_>) {
        let items = self.iter().map(|item| out.capture(|o| o.value(item))).collect();
        out.sorted("[", "]", items);
    }
}

impl<T: Render> Render for BTreeSet<T> {
    fn render(&self, out: &mut Renderer<'_>) {
        out.list("[", "]", self.iter());
    }
}

fn render_entries<'v, K, V>(out: &mut Renderer<'_>, entries: impl Iterator<Item = (&'v K, &'v V)>)
where
    K: Render + 'v,
    V: Render + 'v,
{
    out.text("{");
    for (i, (key, value)) in entries.enumerate() {
        if out.is_cut() {
            break;
        }
        if i > 0 {
            out.text(", ");
        }
        out.value(key);
        out.text("=");
        out.value(value);
    }
    out.text("}");
}

impl<K: Render, V: Render, S> Render for HashMap<K, V, S> {
    fn render(&self, out: &mut Renderer<'_>) {
        let entries = self
            .iter()
            .map(|(key, value)| {
                out.capture(|o| {
                    o.value(key);
                    o.text("=");
                    o.value(value);
                })
            })
            .collect();
        out.sorted("{", "}", entries);
    }
}

impl<K: Render, V: Render> Render for BTreeMap<K, V> {
    fn render(&self, out: &mut Renderer<'_>) {
        render_entries(out, self.iter());
    }
}

impl<A: Render, B: Render> Render for (A, B) {
    fn render(&self, out: &mut Renderer<'_>) {
        out.text("(");
        out.value(&self.0);
        out.text(", ");
        out.value(&self.1);
        out.text(")");
    }
}

impl<A: Render, B: Render, C: Render> Render for (A, B, C) {
    fn render(&self, out: &mut Renderer<'_>) {
        out.text("(");
        out.value(&self.0);
        out.text(", ");
        out.value(&self.1);
        out.text(", ");
        out.value(&self.2);
        out.text(")");
    }
}

/// JSON trees render like records without a type name; `null` is absent.
impl Render for serde_json::Value {
    fn render(&self, out: &mut Renderer<'_>) {
        use serde_json::Value;

        match self {
            Value::Null => out.text(VOID),
            Value::Bool(b) => out.display(b),
            Value::Number(n) => out.display(n),
            Value::String(s) => out.text(s),
            Value::Array(items) => out.list("[", "]", items.iter()),
            Value::Object(map) => render_entries(out, map.iter()),
        }
    }
}
