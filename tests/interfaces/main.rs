//! Interface tests for the logging advice using Cucumber.
//!
//! Scenarios describe the entries each kind of advised call produces.
//!
//! ```bash
//! cargo test --test interfaces
//! ```

mod steps;

use cucumber::World;
use steps::method_logging::MethodLoggingWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Method Logging Interface Tests ===\n");
    MethodLoggingWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/interfaces/features/method_logging.feature")
        .await;
}
