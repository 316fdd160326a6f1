//! Maps validated CLI arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::store;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the store arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let store_opts = store::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        store: store_opts.config,
        bcrypt_cost: store_opts.bcrypt_cost,
    }))
}
