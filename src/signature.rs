//! Static descriptions of observable methods.
//!
//! A [`MethodSignature`] is the join point identity the advice works with:
//! where the method is declared, what it is called, how visible it is and
//! whether it carries a [`Marker`]. Signatures are usually defined once as
//! `static`s next to the method they describe:
//!
//! ```
//! use methodlog::{MethodSignature, Visibility};
//!
//! static CHARGE: MethodSignature =
//!     MethodSignature::new("billing::invoice::InvoiceService", "charge")
//!         .with_visibility(Visibility::Public)
//!         .with_params(&["u64", "&str"])
//!         .with_returns("Receipt")
//!         .marked("charges the customer card");
//!
//! assert_eq!(CHARGE.token(), "[InvoiceService.charge]");
//! ```

use std::fmt;

/// Visibility of the method described by a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)` and friends.
    Crate,
    /// Module-private.
    Private,
}

impl Visibility {
    fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "pub ",
            Visibility::Crate => "pub(crate) ",
            Visibility::Private => "",
        }
    }
}

/// Declarative tag that opts a method into marker-rule logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    /// Human-authored description, logged before each marked call.
    pub description: &'static str,
}

impl Marker {
    pub const fn new(description: &'static str) -> Self {
        Self { description }
    }
}

/// Identity of an observable method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Fully qualified path of the declaring type, e.g. `billing::invoice::InvoiceService`.
    pub declaring_type: &'static str,
    /// Method name.
    pub name: &'static str,
    pub visibility: Visibility,
    /// Parameter type names, in order.
    pub params: &'static [&'static str],
    /// Return type name; `None` for methods returning `()`.
    pub returns: Option<&'static str>,
    pub marker: Option<Marker>,
}

impl MethodSignature {
    /// Describe a public, parameterless, unmarked method.
    pub const fn new(declaring_type: &'static str, name: &'static str) -> Self {
        Self {
            declaring_type,
            name,
            visibility: Visibility::Public,
            params: &[],
            returns: None,
            marker: None,
        }
    }

    /// Describe a method declared on `T`, using its compiler-provided type path.
    pub fn of<T: ?Sized>(name: &'static str) -> Self {
        Self::new(std::any::type_name::<T>(), name)
    }

    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub const fn with_params(mut self, params: &'static [&'static str]) -> Self {
        self.params = params;
        self
    }

    pub const fn with_returns(mut self, returns: &'static str) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Attach a [`Marker`] carrying `description`.
    pub const fn marked(mut self, description: &'static str) -> Self {
        self.marker = Some(Marker::new(description));
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Declaring type name without module path or generic arguments.
    pub fn simple_type_name(&self) -> &'static str {
        simple_name(self.declaring_type)
    }

    /// Identity token used to label log lines: `[Type.method]`.
    ///
    /// No module qualifiers and no parameter types, so two signatures with
    /// the same declaring type and name share a token.
    pub fn token(&self) -> String {
        format!("[{}.{}]", self.simple_type_name(), self.name)
    }
}

/// Full signature form used in failure entries:
/// `pub fn billing::Invoice::charge(u64, &str) -> Receipt`.
impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}fn {}::{}({})",
            self.visibility.keyword(),
            self.declaring_type,
            self.name,
            self.params.join(", ")
        )?;
        if let Some(returns) = self.returns {
            write!(f, " -> {}", returns)?;
        }
        Ok(())
    }
}

/// Strip module path and generic arguments from a Rust type path.
///
/// `alloc::vec::Vec<core::option::Option<i32>>` becomes `Vec`.
pub(crate) fn simple_name(path: &str) -> &str {
    let base = match path.find('<') {
        Some(idx) => &path[..idx],
        None => path,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}
