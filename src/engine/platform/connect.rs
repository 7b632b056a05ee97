//! Mapping from positional connect arguments to the native connect call
//!
//! The scripting locator takes server and namespace separately; the native
//! `IWbemLocator::ConnectServer` takes one resource path instead. Every other
//! slot lines up one to one.

use crate::engine::backend::{
    BackendError, ConnectArg, ConnectionArgs, SLOT_AUTHORITY, SLOT_LOCALE, SLOT_NAMESPACE,
    SLOT_PASSWORD, SLOT_SECURITY_FLAGS, SLOT_SERVER, SLOT_USER,
};

pub const DEFAULT_NAMESPACE: &str = r"ROOT\CIMV2";

/// Parameters of one `ConnectServer` call. `None` is passed as a null string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectServerArgs {
    /// `\\server\namespace`, or the bare namespace when no server was given
    pub resource: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub locale: Option<String>,
    pub security_flags: i32,
    pub authority: Option<String>,
}

impl ConnectServerArgs {
    pub fn from_args(args: &ConnectionArgs) -> Result<Self, BackendError> {
        let values = args.values();

        if let Some(extra) = values
            .iter()
            .enumerate()
            .skip(SLOT_SECURITY_FLAGS + 1)
            .find(|(_, value)| **value != ConnectArg::Null)
        {
            return Err(BackendError::new(format!(
                "connect argument {} has no native counterpart",
                extra.0 + 1
            )));
        }

        let namespace = text_at(values, SLOT_NAMESPACE)
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let resource = match text_at(values, SLOT_SERVER).filter(|server| !server.is_empty()) {
            Some(server) => format!(r"\\{}\{}", server, namespace.trim_start_matches('\\')),
            None => namespace,
        };

        Ok(Self {
            resource,
            user: text_at(values, SLOT_USER),
            password: text_at(values, SLOT_PASSWORD),
            locale: text_at(values, SLOT_LOCALE),
            security_flags: flags_at(values, SLOT_SECURITY_FLAGS)?,
            authority: text_at(values, SLOT_AUTHORITY),
        })
    }
}

fn text_at(values: &[ConnectArg], slot: usize) -> Option<String> {
    match values.get(slot)? {
        ConnectArg::Null => None,
        ConnectArg::Int(n) => Some(n.to_string()),
        ConnectArg::Str(s) => Some(s.clone()),
    }
}

fn flags_at(values: &[ConnectArg], slot: usize) -> Result<i32, BackendError> {
    match values.get(slot) {
        None | Some(ConnectArg::Null) => Ok(0),
        Some(ConnectArg::Int(n)) => Ok(*n),
        Some(ConnectArg::Str(s)) => s
            .trim()
            .parse()
            .map_err(|_| BackendError::new(format!("security flags must be an integer, got '{}'", s))),
    }
}
