//! Aspect-oriented advice for method logging.
//!
//! This module provides the logging advice and the wrapper that applies it,
//! keeping log statements out of the methods being observed.
//!
//! # Architecture
//!
//! Advice is applied where a method is called through a [`MethodLogger`],
//! not inside its implementation:
//!
//! ```ignore
//! // Core implementation - pure business logic
//! fn charge(&self, amount: u64) -> Result<Receipt, BillingError> { ... }
//!
//! // Advised entry point
//! static CHARGE: MethodSignature = MethodSignature::new("billing::Invoice", "charge");
//! logger.call(&CHARGE, &[&amount], || self.inner.charge(amount))
//! ```
//!
//! Two rules select calls:
//!
//! - the namespace rule, for public methods declared under a path prefix,
//!   logs arguments and results at DEBUG and failures at ERROR;
//! - the marker rule, for methods carrying a [`crate::Marker`], logs the
//!   marker description, arguments and result at INFO.
//!
//! A call matched by both gets both sets of entries.

mod invocation;
mod logged;
mod logging;

pub use invocation::Invocation;
pub use logged::{Matched, MethodLogger, MethodLoggerBuilder};
pub use logging::{LoggerAdvice, ERROR_MONITORING_MARKER, INFO_MONITORING_MARKER};
