//! Acceptance test harness for waitflow providers
//!
//! A [`TestCase`] applies each [`TestStep`] configuration through the real
//! providers, runs attribute checks against the recorded state, destroys
//! everything, and finally hands the pre-destroy state to a destroy check.
//!
//! Live tests are opt-in: they only run when `WAITFLOW_ACC` is set.

pub mod case;
pub mod check;

pub use case::{AccTestError, BoxError, TestCase, TestStep};
pub use check::{CheckError, CheckFn, check_no_resource_attr, check_resource_attr, compose};

use rand::Rng;

/// Environment variable enabling live acceptance tests
pub const ACC_ENV_VAR: &str = "WAITFLOW_ACC";

const RANDOM_NAME_LENGTH: usize = 10;

/// Whether live acceptance tests should run
pub fn acc_enabled() -> bool {
    std::env::var(ACC_ENV_VAR).is_ok_and(|v| !v.is_empty())
}

/// Random resource name of lowercase ASCII letters
pub fn random_resource_name() -> String {
    let mut rng = rand::thread_rng();
    (0..RANDOM_NAME_LENGTH)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Fail unless every listed environment variable is set and non-empty
pub fn pre_check(vars: &[&str]) -> Result<(), AccTestError> {
    let missing: Vec<&str> = vars
        .iter()
        .copied()
        .filter(|name| std::env::var(name).map_or(true, |v| v.is_empty()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AccTestError::PreCheck(format!(
            "{} must be set for acceptance tests",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_resource_name() {
        let name = random_resource_name();
        assert_eq!(name.len(), RANDOM_NAME_LENGTH);
        assert!(name.chars().all(|c| c.is_ascii_lowercase()));
        assert_ne!(name, random_resource_name());
    }

    #[test]
    fn test_pre_check() {
        temp_env::with_vars(
            [
                ("WAITFLOW_TEST_SET", Some("x")),
                ("WAITFLOW_TEST_EMPTY", Some("")),
                ("WAITFLOW_TEST_UNSET", None),
            ],
            || {
                assert!(pre_check(&["WAITFLOW_TEST_SET"]).is_ok());

                let err = pre_check(&[
                    "WAITFLOW_TEST_SET",
                    "WAITFLOW_TEST_EMPTY",
                    "WAITFLOW_TEST_UNSET",
                ])
                .unwrap_err();
                assert_eq!(
                    err.to_string(),
                    "pre-check failed: WAITFLOW_TEST_EMPTY, WAITFLOW_TEST_UNSET must be set for acceptance tests"
                );
            },
        );
    }

    #[test]
    fn test_acc_enabled() {
        temp_env::with_var(ACC_ENV_VAR, Some("1"), || assert!(acc_enabled()));
        temp_env::with_var_unset(ACC_ENV_VAR, || assert!(!acc_enabled()));
    }
}
