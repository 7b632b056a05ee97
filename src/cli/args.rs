//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::ConnectionArgs;

#[derive(Parser)]
#[command(name = "wmiq")]
#[command(author, version, about = "Query Windows Management Instrumentation with SQL-like strings", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionOpts,
}

/// Arguments forwarded to the management service connect call
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ConnectionOpts {
    /// Remote computer name ("." for the local machine)
    #[arg(long, global = true, env = "WMIQ_SERVER")]
    pub server: Option<String>,

    /// Namespace to connect to (default ROOT\CIMV2)
    #[arg(long, global = true, env = "WMIQ_NAMESPACE")]
    pub namespace: Option<String>,

    /// User name for the connection
    #[arg(long, global = true, env = "WMIQ_USER")]
    pub user: Option<String>,

    /// Password for the connection
    #[arg(long, global = true, env = "WMIQ_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Locale, e.g. MS_409
    #[arg(long, global = true, env = "WMIQ_LOCALE")]
    pub locale: Option<String>,

    /// Authority, e.g. Kerberos:host or NTLMDOMAIN:domain
    #[arg(long, global = true, env = "WMIQ_AUTHORITY")]
    pub authority: Option<String>,
}

impl ConnectionOpts {
    pub fn to_connection_args(&self) -> ConnectionArgs {
        let mut builder = ConnectionArgs::builder();
        if let Some(server) = &self.server {
            builder = builder.server(server.as_str());
        }
        if let Some(namespace) = &self.namespace {
            builder = builder.namespace(namespace.as_str());
        }
        if let Some(user) = &self.user {
            builder = builder.user(user.as_str());
        }
        if let Some(password) = &self.password {
            builder = builder.password(password.as_str());
        }
        if let Some(locale) = &self.locale {
            builder = builder.locale(locale.as_str());
        }
        if let Some(authority) = &self.authority {
            builder = builder.authority(authority.as_str());
        }
        builder.build()
    }
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Execute a single query
    Query {
        /// The query, e.g. "SELECT Name, ProcessId FROM Win32_Process"
        query: String,
    },

    /// Run every query in a batch file (.wql), one per line
    Run {
        /// Path to the .wql batch file
        file: PathBuf,
    },

    /// Show how a query would be interpreted without executing it
    Explain {
        /// The query to explain
        query: String,
    },

    /// Build a query from a class name, columns and filters
    Build {
        /// Management class, e.g. Win32_Process
        class: String,

        /// Column to select (repeatable; none means *)
        #[arg(long = "column", short = 'c', value_name = "NAME")]
        columns: Vec<String>,

        /// Equality filter (repeatable)
        #[arg(long = "where", short = 'w', value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
}
