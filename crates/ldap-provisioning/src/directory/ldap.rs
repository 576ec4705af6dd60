use super::{
    entry, AttributeMap, DirectoryClient, DirectoryConnector, DirectoryError,
    RESULT_INVALID_CREDENTIALS, RESULT_NO_SUCH_OBJECT, USER_FILTER,
};
use crate::config::LdapConfig;
use crate::workflows::provisioning::CandidateRecord;
use ldap3::result::LdapError;
use ldap3::{LdapConn, LdapConnSettings, LdapResult, Scope, SearchEntry};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Requests no attributes at all (RFC 4511 §4.5.1.8).
const NO_ATTRIBUTES: &str = "1.1";

/// A bound LDAPv3 connection, released on [`close`](Self::close) or drop.
pub struct DirectorySession {
    conn: Option<LdapConn>,
    url: String,
}

impl DirectorySession {
    /// Connects and performs a simple bind with the configured credentials.
    /// An empty bind DN binds anonymously.
    #[instrument(skip(config), fields(url = %config.url))]
    pub fn connect(config: &LdapConfig) -> Result<Self, DirectoryError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(config.connect_timeout)
            .set_starttls(config.starttls);

        debug!("connecting to directory server");
        let mut conn = LdapConn::with_settings(settings, &config.url).map_err(|err| {
            DirectoryError::Unavailable(format!("failed to connect to {}: {err}", config.url))
        })?;

        debug!(bind_dn = %config.bind_dn, "binding to directory");
        let bound = conn
            .simple_bind(&config.bind_dn, &config.bind_password)
            .map_err(|err| {
                DirectoryError::Unavailable(format!("bind as '{}' failed: {err}", config.bind_dn))
            })?;

        if bound.rc != 0 {
            if let Err(err) = conn.unbind() {
                debug!(error = %err, "unbind after failed bind");
            }
            if bound.rc == RESULT_INVALID_CREDENTIALS {
                warn!(bind_dn = %config.bind_dn, "directory rejected bind credentials");
            }
            return Err(rejection(&bound));
        }

        info!(bind_dn = %config.bind_dn, "directory session established");

        Ok(Self {
            conn: Some(conn),
            url: config.url.clone(),
        })
    }

    /// Unbinds from the server.
    pub fn close(mut self) -> Result<(), DirectoryError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), DirectoryError> {
        if let Some(mut conn) = self.conn.take() {
            conn.unbind().map_err(transport)?;
            info!(url = %self.url, "directory session closed");
        }
        Ok(())
    }

    fn conn(&mut self) -> Result<&mut LdapConn, DirectoryError> {
        self.conn
            .as_mut()
            .ok_or_else(|| DirectoryError::Unavailable("directory session is closed".to_string()))
    }
}

impl Drop for DirectorySession {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(url = %self.url, error = %err, "failed to unbind directory session");
        }
    }
}

impl std::fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySession")
            .field("url", &self.url)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl DirectoryClient for DirectorySession {
    #[instrument(skip(self))]
    fn exists(&mut self, dn: &str) -> bool {
        let conn = match self.conn() {
            Ok(conn) => conn,
            Err(_) => return false,
        };

        match conn
            .search(dn, Scope::Base, USER_FILTER, vec![NO_ATTRIBUTES])
            .and_then(|result| result.success())
        {
            Ok((entries, _)) => !entries.is_empty(),
            Err(LdapError::LdapResult { result }) if result.rc == RESULT_NO_SUCH_OBJECT => false,
            Err(err) => {
                warn!(error = %err, "existence check failed; treating entry as absent");
                false
            }
        }
    }

    #[instrument(skip(self, record), fields(id = %record.id()))]
    fn create(&mut self, record: &CandidateRecord, dn: &str) -> Result<(), DirectoryError> {
        let attributes = entry::user_attributes(record);
        let request: Vec<(&str, HashSet<&str>)> = attributes
            .iter()
            .map(|(name, values)| (*name, values.iter().map(String::as_str).collect()))
            .collect();

        let result = self.conn()?.add(dn, request).map_err(transport)?;
        if result.rc != 0 {
            return Err(rejection(&result));
        }

        debug!("entry created");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&mut self, dn: &str) -> Result<(), DirectoryError> {
        let result = self.conn()?.delete(dn).map_err(transport)?;
        if result.rc != 0 {
            return Err(rejection(&result));
        }

        debug!("entry deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_children(&mut self, base: &str) -> Result<Vec<String>, DirectoryError> {
        let (entries, _) = self
            .conn()?
            .search(base, Scope::OneLevel, USER_FILTER, vec![NO_ATTRIBUTES])
            .and_then(|result| result.success())
            .map_err(search_failure)?;

        let dns: Vec<String> = entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect();

        debug!(count = dns.len(), "enumerated user entries");
        Ok(dns)
    }

    #[instrument(skip(self, names))]
    fn fetch_attributes(
        &mut self,
        dn: &str,
        names: &[&str],
    ) -> Result<Option<AttributeMap>, DirectoryError> {
        let outcome = self
            .conn()?
            .search(dn, Scope::Base, USER_FILTER, names.to_vec())
            .and_then(|result| result.success());

        let entries = match outcome {
            Ok((entries, _)) => entries,
            Err(LdapError::LdapResult { result }) if result.rc == RESULT_NO_SUCH_OBJECT => {
                return Ok(None)
            }
            Err(err) => return Err(search_failure(err)),
        };

        Ok(entries.into_iter().next().map(|entry| {
            SearchEntry::construct(entry)
                .attrs
                .into_iter()
                .filter_map(|(name, values)| values.into_iter().next().map(|value| (name, value)))
                .collect()
        }))
    }
}

/// Opens one [`DirectorySession`] per call from a fixed configuration.
#[derive(Debug, Clone)]
pub struct LdapConnector {
    config: LdapConfig,
}

impl LdapConnector {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }
}

impl DirectoryConnector for LdapConnector {
    fn open(&self) -> Result<Box<dyn DirectoryClient + Send>, DirectoryError> {
        let session = DirectorySession::connect(&self.config)?;
        Ok(Box::new(session))
    }
}

fn rejection(result: &LdapResult) -> DirectoryError {
    if !result.text.is_empty() {
        debug!(code = result.rc, diagnostic = %result.text, "directory diagnostic");
    }
    DirectoryError::rejected(result.rc)
}

fn search_failure(err: LdapError) -> DirectoryError {
    match err {
        LdapError::LdapResult { result } => rejection(&result),
        other => transport(other),
    }
}

fn transport(err: LdapError) -> DirectoryError {
    DirectoryError::Unavailable(err.to_string())
}
