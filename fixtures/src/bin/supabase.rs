use clap::Parser;
use fixtures::{
    require_env_var, run_server,
    supabase::{router, FixtureConfig, FixtureState, DEFAULT_ANON_KEY},
    FixtureArgs,
};

/// Fake auth + data platform for local development
#[derive(Parser, Debug)]
#[clap(name = "supabase-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,

    /// Lifetime of issued access tokens, in seconds
    #[arg(long, default_value = "3600")]
    session_ttl: i64,

    /// Confirm email signups without sending a confirmation mail
    #[arg(long)]
    autoconfirm: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let anon_key = require_env_var("SUPABASE_ANON_KEY", DEFAULT_ANON_KEY, args.common.force)?;

    let state = FixtureState::new(FixtureConfig {
        anon_key,
        session_ttl_secs: args.session_ttl,
        autoconfirm: args.autoconfirm,
    });

    run_server(args.common, router(state)).await
}
