use crate::{
    accounts::password::{self, DEFAULT_BCRYPT_COST},
    store::{StoreConfig, DEFAULT_USERS_FILE},
};
use anyhow::Result;
use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_DSN: &str = "dsn";
pub const ARG_USERS_FILE: &str = "users-file";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[derive(Debug)]
pub struct Options {
    pub config: StoreConfig,
    pub bcrypt_cost: u32,
}

impl Options {
    /// Build store options from parsed arguments.
    ///
    /// # Errors
    /// Returns an error if the DSN scheme is unsupported.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let dsn = matches.get_one::<String>(ARG_DSN).map(String::as_str);
        let users_file = matches
            .get_one::<PathBuf>(ARG_USERS_FILE)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_FILE));
        let bcrypt_cost = matches
            .get_one::<u32>(ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(DEFAULT_BCRYPT_COST);

        Ok(Self {
            config: StoreConfig::parse(dsn, users_file)?,
            bcrypt_cost,
        })
    }
}

#[must_use]
pub fn validator_bcrypt_cost() -> ValueParser {
    ValueParser::from(move |cost: &str| -> std::result::Result<u32, String> {
        let parsed = cost
            .parse::<u32>()
            .map_err(|_| "bcrypt cost must be a number".to_string())?;

        password::validate_cost(parsed).map_err(|e| e.to_string())
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string: sqlite::memory:, sqlite://<path> or postgres://...")
                .long_help(
                    "Database connection string. When omitted, accounts are kept in the JSON file given by --users-file.",
                )
                .env("PORTERO_DSN"),
        )
        .arg(
            Arg::new(ARG_USERS_FILE)
                .short('f')
                .long(ARG_USERS_FILE)
                .help("JSON file holding accounts when no --dsn is given")
                .env("PORTERO_USERS_FILE")
                .default_value(DEFAULT_USERS_FILE)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt work factor (4-31)")
                .env("PORTERO_BCRYPT_COST")
                .default_value("12")
                .value_parser(validator_bcrypt_cost()),
        )
}
