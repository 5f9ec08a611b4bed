// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap vault lifecycle: initialize, load, verify, rotate.
//!
//! Every credential is sealed individually with AES-256-GCM under the
//! bootstrap key and stored as one record. Writes are serialized by an
//! in-process lock and by immediate SQLite transactions, so concurrent
//! initializations produce exactly one winner even across processes.

use std::collections::HashMap;
use std::sync::Arc;

use haiv_config::HaivConfig;
use haiv_config::model::PasswordConfig;
use haiv_core::HaivError;
use haiv_crypto::aead;
use haiv_storage::Database;
use haiv_storage::models::{CredentialRecord, RotationHistoryEntry};
use haiv_storage::queries::{
    audit as audit_queries, credentials as record_queries, rotation as rotation_queries,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::audit::{AuditAction, AuditLog};
use crate::cache::CredentialCache;
use crate::credentials::{CredentialName, CredentialType, SystemCredentials};
use crate::key::{BootstrapKey, KeyLocation, KeySource};
use crate::status::{AuditSummary, RecordStatus, RotationSummary, VaultStatus};
use crate::{password, secrets};

const STATUS_HISTORY_LIMIT: usize = 10;

/// Everything `initialize` hands back. This is the only time plaintext
/// secrets and the bootstrap key leave the vault; show it once.
#[derive(Debug)]
pub struct Initialization {
    pub credentials: Arc<SystemCredentials>,
    pub admin_password: SecretString,
    pub bootstrap_key: BootstrapKey,
    pub key_source: KeySource,
    pub instructions: String,
}

/// A node's bootstrap vault.
pub struct BootstrapVault {
    db: Database,
    location: KeyLocation,
    password_params: PasswordConfig,
    cache: CredentialCache,
    audit: AuditLog,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for BootstrapVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapVault")
            .field("location", &self.location)
            .field("cache", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl BootstrapVault {
    pub fn new(db: Database, location: KeyLocation, password_params: PasswordConfig) -> Self {
        let audit = AuditLog::new(db.clone());
        Self {
            db,
            location,
            password_params,
            cache: CredentialCache::new(),
            audit,
            write_lock: Mutex::new(()),
        }
    }

    /// Open the configured record store and build a vault over it.
    pub async fn open(config: &HaivConfig) -> Result<Self, HaivError> {
        let db = Database::open(&config.storage.database_path).await?;
        Ok(Self::new(
            db,
            KeyLocation::from_config(&config.bootstrap),
            config.password.clone(),
        ))
    }

    pub fn location(&self) -> &KeyLocation {
        &self.location
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// True when a bootstrap key is available and at least one record exists.
    pub async fn is_initialized(&self) -> Result<bool, HaivError> {
        if !self.location.exists() {
            return Ok(false);
        }
        Ok(record_queries::count_records(&self.db).await? > 0)
    }

    /// Generate and store a fresh credential bundle.
    ///
    /// An operator-supplied key in the environment is used as is and no key
    /// file is written. Otherwise a key file left without records is reused,
    /// and failing that a new key is generated and persisted after the
    /// records commit. If persisting fails the records are removed again.
    pub async fn initialize(&self, admin_username: &str) -> Result<Initialization, HaivError> {
        let admin_username = admin_username.trim();
        if admin_username.is_empty() {
            return Err(HaivError::InvalidInput(
                "admin username must not be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        if self.is_initialized().await? {
            return Err(HaivError::AlreadyInitialized);
        }

        let (bootstrap_key, key_source, needs_persist) = match self.location.load()? {
            Some((key, source)) => (key, source, false),
            None => (BootstrapKey::generate()?, KeySource::File, true),
        };

        let admin_password = secrets::generate_admin_password()?;
        let password_hash =
            password::hash_password(admin_password.expose_secret(), &self.password_params)?;
        let jwt_secret = secrets::generate_signing_secret()?;
        let admin_token = secrets::generate_token(secrets::ADMIN_TOKEN_PREFIX)?;
        let readonly_token = secrets::generate_token(secrets::READONLY_TOKEN_PREFIX)?;
        let agent_token = secrets::generate_token(secrets::AGENT_TOKEN_PREFIX)?;
        let vault_master_key = secrets::generate_vault_master_key()?;
        let initialized_at = now();

        let values = [
            (CredentialName::AdminUsername, admin_username),
            (CredentialName::AdminPasswordHash, password_hash.as_str()),
            (CredentialName::JwtSecret, jwt_secret.expose_secret()),
            (CredentialName::AdminToken, admin_token.expose_secret()),
            (CredentialName::ReadonlyToken, readonly_token.expose_secret()),
            (CredentialName::AgentToken, agent_token.expose_secret()),
            (CredentialName::VaultMasterKey, vault_master_key.expose_secret()),
            (CredentialName::InitializedAt, initialized_at.as_str()),
        ];
        let records = values
            .iter()
            .map(|(name, value)| seal_record(&bootstrap_key, *name, value, &initialized_at))
            .collect::<Result<Vec<_>, _>>()?;
        let record_count = records.len();

        if !record_queries::insert_initial_records(&self.db, records).await? {
            return Err(HaivError::AlreadyInitialized);
        }

        if needs_persist && let Err(e) = self.location.persist(&bootstrap_key) {
            warn!(error = %e, "bootstrap key not persisted, discarding new credential records");
            if let Err(cleanup) = record_queries::delete_all_records(&self.db).await {
                warn!(error = %cleanup, "failed to discard credential records");
            }
            return Err(e);
        }

        let credentials = Arc::new(SystemCredentials {
            admin_username: admin_username.to_string(),
            admin_password_hash: SecretString::from(password_hash),
            jwt_secret,
            admin_token,
            readonly_token,
            agent_token,
            vault_master_key,
            initialized_at,
        });
        self.cache.set(Arc::clone(&credentials));

        self.audit
            .record(
                AuditAction::SystemInitialized,
                admin_username,
                json!({
                    "admin_username": admin_username,
                    "key_source": key_source.to_string(),
                    "records": record_count,
                }),
            )
            .await;
        info!(key_source = %key_source, "node initialized");

        Ok(Initialization {
            credentials,
            admin_password,
            bootstrap_key,
            key_source,
            instructions: instructions(key_source, &self.location),
        })
    }

    /// Decrypt the stored bundle, or return the cached copy.
    pub async fn load_credentials(&self) -> Result<Arc<SystemCredentials>, HaivError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let key = self.require_key().await?;
        let records = record_queries::list_records(&self.db).await?;

        let mut values: HashMap<String, Zeroizing<String>> = HashMap::with_capacity(records.len());
        for record in &records {
            values.insert(record.key_name.clone(), open_record(&key, record)?);
        }
        let mut take = |name: CredentialName| -> Result<String, HaivError> {
            values
                .remove(name.as_str())
                .map(|mut value| std::mem::take(&mut *value))
                .ok_or_else(|| HaivError::Encoding(format!("credential record {name} is missing")))
        };

        let credentials = Arc::new(SystemCredentials {
            admin_username: take(CredentialName::AdminUsername)?,
            admin_password_hash: SecretString::from(take(CredentialName::AdminPasswordHash)?),
            jwt_secret: SecretString::from(take(CredentialName::JwtSecret)?),
            admin_token: SecretString::from(take(CredentialName::AdminToken)?),
            readonly_token: SecretString::from(take(CredentialName::ReadonlyToken)?),
            agent_token: SecretString::from(take(CredentialName::AgentToken)?),
            vault_master_key: SecretString::from(take(CredentialName::VaultMasterKey)?),
            initialized_at: take(CredentialName::InitializedAt)?,
        });
        if !self.cache.fill(generation, Arc::clone(&credentials)) {
            debug!("credentials changed during load; not caching this copy");
        }

        self.audit
            .record(
                AuditAction::CredentialsLoaded,
                "system",
                json!({ "records": records.len() }),
            )
            .await;
        debug!(records = records.len(), "credentials loaded");
        Ok(credentials)
    }

    /// Check a candidate admin password. Never errors; any failure is `false`.
    pub async fn verify_admin_password(&self, candidate: &str) -> bool {
        match self.load_credentials().await {
            Ok(credentials) => {
                password::verify_password(candidate, credentials.admin_password_hash.expose_secret())
            }
            Err(e) => {
                warn!(error = %e, "admin password check could not load credentials");
                false
            }
        }
    }

    /// Replace a signing secret or API token with a freshly generated value.
    ///
    /// The admin password and vault master key are rejected here; use
    /// [`reset_admin_password`](Self::reset_admin_password) and
    /// [`rotate_vault_master_key`](Self::rotate_vault_master_key).
    pub async fn rotate_credential(
        &self,
        kind: CredentialType,
        rotated_by: &str,
        reason: Option<&str>,
    ) -> Result<SecretString, HaivError> {
        if !kind.is_generic_rotation() {
            return Err(HaivError::UnsupportedCredentialType(kind.to_string()));
        }

        let value = secrets::generate_for(kind)?;
        self.replace_credential(kind.record_name(), value.expose_secret(), rotated_by, reason)
            .await?;

        self.audit
            .record(
                AuditAction::CredentialRotated,
                rotated_by,
                json!({ "credential_type": kind.to_string(), "reason": reason }),
            )
            .await;
        info!(credential_type = %kind, rotated_by, "credential rotated");
        Ok(value)
    }

    /// Set a new admin password, generating one when none is given.
    pub async fn reset_admin_password(
        &self,
        new_password: Option<SecretString>,
        reset_by: &str,
    ) -> Result<SecretString, HaivError> {
        let generated = new_password.is_none();
        let password = match new_password {
            Some(password) if password.expose_secret().is_empty() => {
                return Err(HaivError::InvalidInput(
                    "new admin password must not be empty".to_string(),
                ));
            }
            Some(password) => password,
            None => secrets::generate_admin_password()?,
        };

        let hash = password::hash_password(password.expose_secret(), &self.password_params)?;
        self.replace_credential(
            CredentialName::AdminPasswordHash,
            &hash,
            reset_by,
            Some("admin password reset"),
        )
        .await?;

        self.audit
            .record(
                AuditAction::AdminPasswordReset,
                reset_by,
                json!({ "generated": generated }),
            )
            .await;
        info!(reset_by, "admin password reset");
        Ok(password)
    }

    /// Replace the vault master key.
    ///
    /// Data protected by the old key must be re-encrypted by its owner.
    pub async fn rotate_vault_master_key(
        &self,
        rotated_by: &str,
        reason: Option<&str>,
    ) -> Result<SecretString, HaivError> {
        let value = secrets::generate_vault_master_key()?;
        self.replace_credential(
            CredentialName::VaultMasterKey,
            value.expose_secret(),
            rotated_by,
            reason,
        )
        .await?;

        self.audit
            .record(
                AuditAction::VaultMasterKeyRotated,
                rotated_by,
                json!({ "reason": reason }),
            )
            .await;
        info!(rotated_by, "vault master key rotated");
        Ok(value)
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    /// Audit writes that failed and were swallowed.
    pub fn audit_failures(&self) -> u64 {
        self.audit.failures()
    }

    /// Metadata about the node's bootstrap state. Decrypts nothing.
    pub async fn status(&self) -> Result<VaultStatus, HaivError> {
        let records = record_queries::list_records(&self.db).await?;
        let key_source = match self.location.load() {
            Ok(found) => found.map(|(_, source)| source),
            Err(e) => {
                warn!(error = %e, "bootstrap key unreadable");
                None
            }
        };
        let recent_audit = audit_queries::recent_entries(&self.db, STATUS_HISTORY_LIMIT).await?;
        let recent_rotations =
            rotation_queries::recent_history(&self.db, STATUS_HISTORY_LIMIT).await?;

        Ok(VaultStatus {
            initialized: key_source.is_some() && !records.is_empty(),
            key_source,
            key_missing: key_source.is_none() && !records.is_empty(),
            records: records
                .into_iter()
                .map(|r| RecordStatus {
                    name: r.key_name,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                })
                .collect(),
            recent_audit: recent_audit
                .into_iter()
                .map(|e| AuditSummary {
                    action: e.action,
                    actor: e.actor,
                    timestamp: e.timestamp,
                })
                .collect(),
            recent_rotations: recent_rotations
                .into_iter()
                .map(|h| RotationSummary {
                    credential: h.credential_key,
                    rotated_at: h.rotated_at,
                    rotated_by: h.rotated_by,
                    reason: h.reason,
                })
                .collect(),
            audit_failures: self.audit.failures(),
        })
    }

    async fn require_key(&self) -> Result<BootstrapKey, HaivError> {
        if record_queries::count_records(&self.db).await? == 0 {
            return Err(HaivError::NotInitialized);
        }
        match self.location.load()? {
            Some((key, _)) => Ok(key),
            None => Err(HaivError::BootstrapKeyMissing),
        }
    }

    /// Seal `value` into the named record and log the rotation, atomically.
    async fn replace_credential(
        &self,
        name: CredentialName,
        value: &str,
        actor: &str,
        reason: Option<&str>,
    ) -> Result<(), HaivError> {
        if actor.trim().is_empty() {
            return Err(HaivError::InvalidInput("actor must not be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let key = self.require_key().await?;

        // Refuse to write under a key that cannot read the existing record.
        let existing = record_queries::get_record(&self.db, name.as_str())
            .await?
            .ok_or_else(|| HaivError::Encoding(format!("credential record {name} is missing")))?;
        open_record(&key, &existing)?;

        let timestamp = now();
        let record = seal_record(&key, name, value, &timestamp)?;
        let history = RotationHistoryEntry {
            id: None,
            credential_key: name.as_str().to_string(),
            rotated_at: timestamp,
            rotated_by: actor.to_string(),
            reason: reason.map(str::to_string),
        };
        record_queries::replace_record(&self.db, record, history).await?;
        self.cache.invalidate();
        Ok(())
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn seal_record(
    key: &BootstrapKey,
    name: CredentialName,
    value: &str,
    timestamp: &str,
) -> Result<CredentialRecord, HaivError> {
    let (ciphertext, nonce) = aead::seal(key.as_bytes(), value.as_bytes())?;
    Ok(CredentialRecord {
        key_name: name.as_str().to_string(),
        ciphertext,
        nonce: nonce.to_vec(),
        created_at: timestamp.to_string(),
        updated_at: timestamp.to_string(),
    })
}

fn open_record(
    key: &BootstrapKey,
    record: &CredentialRecord,
) -> Result<Zeroizing<String>, HaivError> {
    let plaintext = aead::open_slice(key.as_bytes(), &record.nonce, &record.ciphertext)?;
    let value = String::from_utf8(plaintext.to_vec()).map_err(|_| {
        HaivError::Encoding(format!(
            "credential record {} is not valid UTF-8",
            record.key_name
        ))
    })?;
    Ok(Zeroizing::new(value))
}

fn instructions(source: KeySource, location: &KeyLocation) -> String {
    let key_home = match source {
        KeySource::Environment => format!(
            "The bootstrap key was taken from ${} and was not written to disk.",
            location.env_var
        ),
        KeySource::File => format!(
            "The bootstrap key is stored at {} (owner read/write only).",
            location.path.display()
        ),
    };
    format!(
        "{key_home}\n\
         These credentials are shown once and cannot be displayed again.\n\
         Store the admin password and the bootstrap key somewhere safe.\n\
         If the bootstrap key is lost, every stored credential is unrecoverable:\n\
         the node must be re-initialized and every dependent secret re-issued."
    )
}
