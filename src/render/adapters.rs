//! Adapters rendering values that do not implement [`Render`] themselves.
//!
//! The serde based dump lives in `structural`.

use std::any::type_name;
use std::fmt::{self, Write as _};

use super::{Render, Renderer};
use crate::signature::simple_name;

/// Renders a value through its `Debug` implementation.
pub struct Debugged<'a, T: ?Sized>(pub &'a T);

impl<T: fmt::Debug + ?Sized> Render for Debugged<'_, T> {
    fn render(&self, out: &mut Renderer<'_>) {
        let _ = write!(out, "{:?}", self.0);
    }
}

/// Type name plus address; never inspects the value.
pub struct Opaque<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> Render for Opaque<'_, T> {
    fn render(&self, out: &mut Renderer<'_>) {
        let _ = write!(out, "{}@{:p}", simple_name(type_name::<T>()), self.0);
    }
}
