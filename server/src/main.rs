use sb_by_example::{
    routes::routes,
    server::run_server,
    setup::{setup_sentry, setup_tracing},
    state::AppState,
};
use tracing::info;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize Sentry for error tracking
    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> color_eyre::Result<()> {
    setup_tracing("sb_by_example")?;

    let app_state = AppState::from_env()?;
    info!(
        supabase_url = %app_state.supabase.config().url,
        origin = %app_state.origin(),
        "Application state ready"
    );

    if is_feature_enabled("SERVER") {
        info!("Server Enabled");
        run_server(routes(app_state)).await?;
    } else {
        info!("Server Disabled");
    }

    Ok(())
}

/// Check if a feature is enabled based on environment variables
fn is_feature_enabled(feature: &str) -> bool {
    std::env::var(format!("{}_DISABLED", feature)).unwrap_or_else(|_| "false".to_string()) != "true"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn feature_enabled_when_env_var_not_set() {
        env::remove_var("TEST_FEATURE_UNSET_DISABLED");

        assert!(is_feature_enabled("TEST_FEATURE_UNSET"));
    }

    #[test]
    fn feature_enabled_when_env_var_is_false() {
        env::set_var("TEST_FEATURE_FALSE_DISABLED", "false");

        assert!(is_feature_enabled("TEST_FEATURE_FALSE"));

        env::remove_var("TEST_FEATURE_FALSE_DISABLED");
    }

    #[test]
    fn feature_disabled_when_env_var_is_true() {
        env::set_var("TEST_FEATURE_TRUE_DISABLED", "true");

        assert!(!is_feature_enabled("TEST_FEATURE_TRUE"));

        env::remove_var("TEST_FEATURE_TRUE_DISABLED");
    }

    #[test]
    fn feature_enabled_with_other_values() {
        env::set_var("TEST_FEATURE_OTHER_DISABLED", "yes");

        // Only exactly "true" disables
        assert!(is_feature_enabled("TEST_FEATURE_OTHER"));

        env::remove_var("TEST_FEATURE_OTHER_DISABLED");
    }
}
