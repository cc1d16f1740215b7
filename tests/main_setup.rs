use serial_test::serial;
use std::{env, panic};
use workwise_api::{
    AppConfig,
    auth::Endpoint,
    config::Env,
};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "DATABASE_URL",
    "BIND_ADDR",
    "WORKWISE_TOKEN_POST_COURSES",
    "WORKWISE_TOKEN_GET_UNIONS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with a clean slate for the config variables, restoring the previous
/// values afterward even if the test panics.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            // DATABASE_URL is missing.
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without DATABASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_production_with_database_url() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("DATABASE_URL", "sqlite:///var/lib/workwise/prod.db");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.db_url, "sqlite:///var/lib/workwise/prod.db");
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "sqlite://workwise.db");
    assert_eq!(config.bind_addr, "0.0.0.0:8000");
    assert_eq!(
        config.endpoint_tokens.expected(Endpoint::CreateCourse),
        Some("COURSEADDTOK402")
    );
}

#[test]
#[serial]
fn test_app_config_token_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("WORKWISE_TOKEN_POST_COURSES", "ROTATED-COURSES");
            env::set_var("WORKWISE_TOKEN_GET_UNIONS", "");
            env::set_var("BIND_ADDR", "127.0.0.1:9000");
        }
        AppConfig::load()
    });

    assert_eq!(
        config.endpoint_tokens.expected(Endpoint::CreateCourse),
        Some("ROTATED-COURSES")
    );
    // Empty values do not replace the default.
    assert_eq!(
        config.endpoint_tokens.expected(Endpoint::ListUnions),
        Some("UNIONLISTTOK456")
    );
    assert_eq!(config.bind_addr, "127.0.0.1:9000");
}
