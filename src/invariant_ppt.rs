//! Runtime invariant checking with a contract-test log.
//!
//! Production code states its structural invariants through
//! [`assert_invariant!`]; each check is recorded in a thread-local log so
//! contract tests can prove a code path actually exercised the invariants it
//! claims to uphold, not merely that it returned the right bytes.
//!
//! ```rust,ignore
//! assert_invariant!(
//!     out.len() == 1 + size_len + staged.len(),
//!     "framed OBU length must equal flag byte + size field + staged bytes",
//!     "obu::frame_obu"
//! );
//!
//! #[test]
//! fn contract_obu_framing() {
//!     contract_test("obu framing", &[
//!         "framed OBU length must equal flag byte + size field + staged bytes",
//!     ]);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::thread_local;

thread_local! {
    static INVARIANT_LOG: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Asserts an invariant and records that it was checked.
///
/// Takes the condition, the invariant's message, and optionally a context
/// string naming the checking site. Panics if the condition is false.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __assert_invariant_impl(condition: bool, message: &str, context: Option<&str>) {
    INVARIANT_LOG.with(|log| {
        log.borrow_mut().insert(message.to_string());
    });

    if !condition {
        let ctx = context.unwrap_or("unknown");
        panic!("INVARIANT VIOLATION [{}]: {}", ctx, message);
    }
}

/// Verifies that every named invariant was checked at some point on this
/// thread since the log was last cleared.
///
/// # Panics
///
/// Panics listing the invariants that were never checked.
pub fn contract_test(test_name: &str, required_invariants: &[&str]) {
    let log = INVARIANT_LOG.with(|log| log.borrow().clone());

    let missing: Vec<&str> = required_invariants
        .iter()
        .filter(|invariant| !log.contains(**invariant))
        .copied()
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: The following invariants were not checked:\n  - {}",
            test_name,
            missing.join("\n  - ")
        );
    }
}

/// Clears this thread's invariant log.
pub fn clear_invariant_log() {
    INVARIANT_LOG.with(|log| {
        log.borrow_mut().clear();
    });
}

/// Snapshot of the invariants logged on this thread.
pub fn get_logged_invariants() -> Vec<String> {
    INVARIANT_LOG.with(|log| log.borrow().iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_invariants_are_logged() {
        clear_invariant_log();
        assert_invariant!(true, "logged invariant");

        let logged = get_logged_invariants();
        assert!(logged.contains(&"logged invariant".to_string()));
    }

    #[test]
    #[should_panic(expected = "INVARIANT VIOLATION")]
    fn failed_invariant_panics() {
        assert_invariant!(false, "this should fail", "test");
    }

    #[test]
    fn contract_passes_when_invariant_was_checked() {
        clear_invariant_log();
        assert_invariant!(true, "contract required invariant");
        contract_test("contract", &["contract required invariant"]);
    }

    #[test]
    #[should_panic(expected = "CONTRACT FAILURE")]
    fn contract_fails_when_invariant_was_skipped() {
        clear_invariant_log();
        contract_test("missing", &["this invariant was never checked"]);
    }
}
