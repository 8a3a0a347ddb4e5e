//! Call-scoped context handed to the before-advice.

use crate::render::Render;
use crate::signature::MethodSignature;

/// A single advised call: which method, with which arguments.
///
/// Borrowed for the duration of the before-advice only.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub method: &'a MethodSignature,
    /// Actual arguments, positional.
    pub args: &'a [&'a dyn Render],
}

impl<'a> Invocation<'a> {
    pub fn new(method: &'a MethodSignature, args: &'a [&'a dyn Render]) -> Self {
        Self { method, args }
    }
}
