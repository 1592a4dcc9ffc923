//! HTTP/JSON client for the zbase service

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::{ArcSwap, ArcSwapOption};
use futures_util::FutureExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use zbase_core::auth::{
    permission_signing_bytes, put_digest, table_create_signing_bytes, SigningKey, VerifyingKey,
};
use zbase_core::wire::{
    methods, AuthResponse, AuthenticateUser, DataPair, DataResponse, DeleteObjectRequest,
    KeysResponse, ListKeysRequest, ListTablesRequest, NewIdentityConfirm, NewIdentityResponse,
    NewSubIdentityRequest, ProofOfCredential, SimpleRequest, SubIdentitiesList, SubIdentityModify,
    SubQuery, SystemObjectType, TableCreate, TableGet, TablePut, TablePutMulti, TableQuery,
    TablesList, VersionDetails, ZbError,
};
use zbase_core::{
    encode_public_key, is_version_at_least, multi_put_digest, parse_filter, ClientConfig,
    Credential, Identity, PermissionEntry, Query, TableDefinition, TableScope, CLIENT_VERSION,
};

use crate::error::{ClientError, Result};
use crate::metrics;
use crate::nonce::NonceMaker;
use crate::pagination::{GetPages, GroupFetch, Page, PaginationHandler, PutPages};

struct LoginCredentials {
    handle: String,
    password: String,
}

struct Inner {
    http: Client,
    server_url: String,
    config: ClientConfig,
    /// Replaced by the id a password login returns
    user_id: ArcSwap<String>,
    parent_id: String,
    signing_key: Option<SigningKey>,
    login: Option<LoginCredentials>,
    token: ArcSwapOption<String>,
    nonces: NonceMaker,
}

/// Client for one user of the service
///
/// Cheap to clone; clones share the nonce counter and the login token.
#[derive(Clone)]
pub struct ZbClient {
    inner: Arc<Inner>,
}

/// Builder for [`ZbClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    signing_key: Option<SigningKey>,
    login: Option<LoginCredentials>,
    nonces: Option<NonceMaker>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            signing_key: None,
            login: None,
            nonces: None,
        }
    }

    /// Act as `identity`, signing requests with its key
    pub fn identity(mut self, identity: &Identity) -> Self {
        self.config.user_id = identity.id.clone();
        if let Some(parent) = &identity.parent_id {
            self.config.parent_id = parent.clone();
        }
        self.signing_key = Some(identity.signing_key.clone());
        self
    }

    pub fn signing_key(mut self, key: SigningKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Log in with a handle and password before the first request
    pub fn login(mut self, handle: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(LoginCredentials {
            handle: handle.into(),
            password: password.into(),
        });
        self
    }

    /// Share a nonce counter with other clients
    pub fn nonce_maker(mut self, nonces: NonceMaker) -> Self {
        self.nonces = Some(nonces);
        self
    }

    pub fn build(self) -> Result<ZbClient> {
        self.config.validate()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .build()?;

        Ok(ZbClient {
            inner: Arc::new(Inner {
                http,
                server_url: self.config.server_url.trim_end_matches('/').to_string(),
                user_id: ArcSwap::from_pointee(self.config.user_id.clone()),
                parent_id: self.config.parent_id.clone(),
                signing_key: self.signing_key,
                login: self.login,
                token: ArcSwapOption::empty(),
                nonces: self.nonces.unwrap_or_default(),
                config: self.config,
            }),
        })
    }
}

/// A new sub-user of the calling user
#[derive(Debug, Clone, Default)]
pub struct NewSubUser {
    pub handle: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub signup_code: String,
    pub group_id: String,
}

/// Changes to a sub-user; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct SubUserChanges {
    pub handle: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub pub_key: Option<String>,
}

impl ZbClient {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Client signing as `identity`
    pub fn new(config: ClientConfig, identity: &Identity) -> Result<Self> {
        ClientBuilder::new(config).identity(identity).build()
    }

    /// The user requests are made as
    pub fn user_id(&self) -> String {
        self.inner.user_id.load_full().as_ref().clone()
    }

    pub fn parent_id(&self) -> &str {
        &self.inner.parent_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Bearer token of the last successful login
    pub fn token(&self) -> Option<String> {
        self.inner.token.load_full().map(|t| t.as_ref().clone())
    }

    pub fn nonce_maker(&self) -> &NonceMaker {
        &self.inner.nonces
    }

    /// Log in with the configured handle and password
    ///
    /// The returned token is used for every later request, and the user id
    /// becomes the one the service reports.
    pub async fn login(&self) -> Result<String> {
        let login = self.inner.login.as_ref().ok_or_else(|| {
            ClientError::NotReady("no login handle and password configured".to_string())
        })?;

        let request = AuthenticateUser {
            parent_id: self.inner.parent_id.clone(),
            handle: login.handle.clone(),
            password: login.password.clone(),
            nonce: self.inner.nonces.get().await?,
        };
        let response: AuthResponse = self.call(methods::LOGIN_USER, &request).await?;
        if response.jwt_token.is_empty() {
            return Err(ClientError::NotReady(
                "login returned no token".to_string(),
            ));
        }

        self.inner.token.store(Some(Arc::new(response.jwt_token.clone())));
        self.inner.user_id.store(Arc::new(response.id.clone()));
        tracing::info!(user = %response.id, handle = %login.handle, "Logged in");
        Ok(response.jwt_token)
    }

    pub async fn version_info(&self) -> Result<VersionDetails> {
        self.call(methods::VERSION_INFO, &serde_json::json!({})).await
    }

    /// Whether this client meets the service's minimum client version
    pub async fn check_version(&self) -> Result<(bool, VersionDetails)> {
        let details = self.version_info().await?;
        let compatible = is_version_at_least(CLIENT_VERSION, &details.min_client_version);
        if !compatible {
            tracing::warn!(
                client = CLIENT_VERSION,
                required = %details.min_client_version,
                "Client version is older than the service requires"
            );
        }
        Ok((compatible, details))
    }

    /// Ids of the tables the user owns
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let (uid, nonce) = self.prepare().await?;
        let request = ListTablesRequest {
            table_owner_id: uid.clone(),
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            nonce,
        };
        let response: TablesList = self.call(methods::LIST_TABLES, &request).await?;
        Ok(response
            .table_definitions
            .into_iter()
            .map(|t| t.table_id)
            .collect())
    }

    pub async fn create_table(&self, definition: &TableDefinition) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let permissions = definition.permissions_to_wire(&uid);
        let extra = table_create_signing_bytes(&definition.table_id, &permissions);
        let request = TableCreate {
            credential: self.credential(&uid, nonce, &extra)?,
            id: uid,
            table_id: definition.table_id.clone(),
            data_format: definition.data_format,
            indices: definition.indices_to_wire(),
            nonce,
            allow_token_auth: definition.allow_token_auth,
            permissions,
        };
        self.call_void(methods::CREATE_TABLE, &request).await?;
        tracing::info!(
            table = %definition.table_id,
            indices = definition.indices.len(),
            "Created table"
        );
        Ok(())
    }

    /// Grant `entry` on a table, possibly owned by another user
    pub async fn add_permission(&self, scope: &TableScope, entry: &PermissionEntry) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let mut permission = entry.to_wire(&scope.owner_id, &scope.table_id);
        permission.nonce = nonce;
        let extra = permission_signing_bytes(&permission);
        permission.credential = Some(self.credential(&uid, nonce, &extra)?);
        self.call_void(methods::SET_PERMISSION, &permission).await
    }

    pub async fn delete_table(&self, scope: &TableScope) -> Result<()> {
        self.delete_object(scope, SystemObjectType::Table, &scope.table_id)
            .await
    }

    pub async fn delete_key(&self, scope: &TableScope, key: &str) -> Result<()> {
        self.delete_object(scope, SystemObjectType::Key, key).await
    }

    async fn delete_object(
        &self,
        scope: &TableScope,
        object_type: SystemObjectType,
        object_id: &str,
    ) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let request = DeleteObjectRequest {
            credential: self.credential(&uid, nonce, object_id.as_bytes())?,
            id: uid,
            object_type,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            object_id: object_id.to_string(),
            nonce,
        };
        self.call_void(methods::DELETE_OBJECT, &request).await
    }

    pub async fn put_data(
        &self,
        scope: &TableScope,
        key: &str,
        value: &[u8],
        overwrite: bool,
    ) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let request = TablePut {
            credential: self.credential(&uid, nonce, &put_digest(key, value))?,
            id: uid,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            key: key.to_string(),
            value: value.to_vec(),
            overwrite,
            nonce,
        };
        self.call_void(methods::PUT_DATA, &request).await
    }

    /// Write many pairs, split into pages of at most `max_page_bytes` of values
    ///
    /// Pages are pushed in order and the first failure stops the write;
    /// pages pushed before it are not rolled back. Returns the page count.
    pub async fn put_multi(
        &self,
        scope: &TableScope,
        keys: Vec<String>,
        values: Vec<Vec<u8>>,
        overwrite: bool,
    ) -> Result<usize> {
        let pages = PutPages::new(keys, values, self.inner.config.max_page_bytes)?;
        tracing::debug!(
            pages = pages.len(),
            table = %scope.table_id,
            "Paged write"
        );
        pages
            .put_all(move |pairs| self.put_page(scope, pairs, overwrite))
            .await
    }

    async fn put_page(
        &self,
        scope: &TableScope,
        pairs: Vec<DataPair>,
        overwrite: bool,
    ) -> Result<()> {
        let result = self.push_page(scope, pairs, overwrite).await;
        let outcome = match &result {
            Ok(()) => metrics::OUTCOME_OK,
            Err(e) => outcome_of(e),
        };
        metrics::record_page_pushed(outcome);
        result
    }

    async fn push_page(
        &self,
        scope: &TableScope,
        pairs: Vec<DataPair>,
        overwrite: bool,
    ) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let digest = multi_put_digest(&pairs, self.inner.config.multi_put_digest)?;
        let request = TablePutMulti {
            credential: self.credential(&uid, nonce, &digest)?,
            id: uid,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            overwrite,
            nonce,
            pairs,
        };
        self.call_void(methods::PUT_DATA_MULTI, &request).await
    }

    /// Read the values of `keys`, a key group at a time
    pub async fn get(&self, scope: &TableScope, keys: Vec<String>) -> Result<GetPages> {
        self.ensure_ready().await?;
        let client = self.clone();
        let fetch: GroupFetch = Arc::new(move |scope: TableScope, keys: Vec<String>, page: u64| {
            let client = client.clone();
            async move { client.fetch_data_page(&scope, keys, page).await }.boxed()
        });
        Ok(GetPages::new(
            keys,
            self.inner.config.max_item_bytes,
            self.inner.config.max_page_bytes,
            scope.clone(),
            fetch,
        )
        .await)
    }

    async fn fetch_data_page(
        &self,
        scope: &TableScope,
        keys: Vec<String>,
        page: u64,
    ) -> Result<Page> {
        let (uid, nonce) = self.prepare().await?;
        let request = TableGet {
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            nonce,
            page_index: page,
            keys,
        };
        let response: DataResponse = self.call(methods::GET_DATA, &request).await?;
        metrics::record_page_fetched(metrics::PAGE_READ);
        Ok(Page {
            data: response
                .data
                .into_iter()
                .map(|pair| (pair.key, pair.value))
                .collect(),
            has_next_page: response.pagination.has_next_page,
        })
    }

    pub async fn list_keys(&self, scope: &TableScope) -> Result<PaginationHandler> {
        self.list_keys_with_pattern(scope, "").await
    }

    /// Keys matching `pattern`, where `%` is a suffix wildcard
    ///
    /// The handler's data maps each key to an empty value.
    pub async fn list_keys_with_pattern(
        &self,
        scope: &TableScope,
        pattern: &str,
    ) -> Result<PaginationHandler> {
        self.ensure_ready().await?;
        let client = self.clone();
        let scope = scope.clone();
        let pattern = pattern.to_string();
        Ok(PaginationHandler::new(move |page| {
            let client = client.clone();
            let scope = scope.clone();
            let pattern = pattern.clone();
            async move { client.fetch_keys_page(&scope, &pattern, page).await }
        })
        .await)
    }

    async fn fetch_keys_page(&self, scope: &TableScope, pattern: &str, page: u64) -> Result<Page> {
        let (uid, nonce) = self.prepare().await?;
        let request = ListKeysRequest {
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            pattern: pattern.to_string(),
            nonce,
            page_index: page,
        };
        let response: KeysResponse = self.call(methods::LIST_KEYS, &request).await?;
        metrics::record_page_fetched(metrics::PAGE_KEYS);
        Ok(Page::from_keys(
            response.keys,
            response.pagination.has_next_page,
        ))
    }

    /// Keys of the records matching `query`
    pub async fn query(&self, scope: &TableScope, query: &Query) -> Result<PaginationHandler> {
        self.ensure_ready().await?;
        let compiled = query.compile(&scope.owner_id, &scope.table_id);
        let client = self.clone();
        let scope = scope.clone();
        Ok(PaginationHandler::new(move |page| {
            let client = client.clone();
            let scope = scope.clone();
            let compiled = compiled.clone();
            async move { client.fetch_query_page(&scope, compiled, page).await }
        })
        .await)
    }

    /// Like [`query`](Self::query), with the query written in the filter language
    pub async fn query_filter(
        &self,
        scope: &TableScope,
        filter: &str,
    ) -> Result<PaginationHandler> {
        let query = parse_filter(filter)?.to_query()?;
        self.query(scope, &query).await
    }

    async fn fetch_query_page(
        &self,
        scope: &TableScope,
        query: SubQuery,
        page: u64,
    ) -> Result<Page> {
        let (uid, nonce) = self.prepare().await?;
        let request = TableQuery {
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            table_owner_id: scope.owner_id.clone(),
            table_id: scope.table_id.clone(),
            query,
            nonce,
            page_index: page,
        };
        let response: KeysResponse = self.call(methods::QUERY_KEYS, &request).await?;
        metrics::record_page_fetched(metrics::PAGE_KEYS);
        Ok(Page::from_keys(
            response.keys,
            response.pagination.has_next_page,
        ))
    }

    /// Run `query`, then read the values of every matching key
    pub async fn query_data(&self, scope: &TableScope, query: &Query) -> Result<GetPages> {
        let keys = self.query(scope, query).await?.keys_all().await?;
        self.get(scope, keys).await
    }

    /// Register a sub-user under the calling user; returns the new user's id
    pub async fn new_sub_user(&self, user: &NewSubUser, pub_key: &VerifyingKey) -> Result<String> {
        let request = NewSubIdentityRequest {
            id: self.user_id(),
            name: user.handle.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            login_password: user.password.clone(),
            pub_key_encoded: encode_public_key(pub_key)?,
            signup_code: user.signup_code.clone(),
            group_id: user.group_id.clone(),
        };
        let response: NewIdentityResponse = self.call(methods::CREATE_USER, &request).await?;
        tracing::info!(sub_user = %response.id, "Registered sub-user");
        Ok(response.id)
    }

    pub async fn confirm_new_sub_user(
        &self,
        sub_user_id: &str,
        verification_code: &str,
    ) -> Result<()> {
        let request = NewIdentityConfirm {
            id: sub_user_id.to_string(),
            parent_id: self.user_id(),
            verification_code: verification_code.to_string(),
        };
        self.call_void(methods::CONFIRM_IDENTITY, &request).await
    }

    pub async fn list_sub_users(&self) -> Result<Vec<NewSubIdentityRequest>> {
        let (uid, nonce) = self.prepare().await?;
        let request = SimpleRequest {
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            nonce,
        };
        let response: SubIdentitiesList = self.call(methods::LIST_SUB_IDENTITIES, &request).await?;
        Ok(response.sub_identities)
    }

    pub async fn modify_sub_user(&self, sub_user_id: &str, changes: &SubUserChanges) -> Result<()> {
        let (uid, nonce) = self.prepare().await?;
        let request = SubIdentityModify {
            credential: self.credential(&uid, nonce, &[])?,
            id: uid,
            sub_id: sub_user_id.to_string(),
            new_name: changes.handle.clone().unwrap_or_default(),
            new_email: changes.email.clone().unwrap_or_default(),
            new_mobile: changes.mobile.clone().unwrap_or_default(),
            new_password: changes.password.clone().unwrap_or_default(),
            new_pub_key: changes.pub_key.clone().unwrap_or_default(),
            nonce,
        };
        self.call_void(methods::MODIFY_SUB_IDENTITY, &request).await
    }

    /// Log in lazily when a password login is configured and no token is held yet
    async fn ensure_ready(&self) -> Result<()> {
        let needs_login = self.inner.login.is_some() && self.inner.token.load_full().is_none();
        if needs_login {
            self.login().await?;
        }
        Ok(())
    }

    /// Readiness check, then the user id and a fresh nonce for one request
    async fn prepare(&self) -> Result<(String, i64)> {
        self.ensure_ready().await?;
        let nonce = self.inner.nonces.get().await?;
        Ok((self.user_id(), nonce))
    }

    fn credential(&self, uid: &str, nonce: i64, extra: &[u8]) -> Result<ProofOfCredential> {
        let token = self.inner.token.load_full();
        let credential = Credential::for_request(
            token.as_deref().map(String::as_str),
            self.inner.signing_key.as_ref(),
            uid,
            nonce,
            extra,
        )?;
        Ok(credential.into())
    }

    async fn call<Req, Resp>(&self, method: &'static str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let started = Instant::now();
        let result = self.send(method, body).await;
        let outcome = match &result {
            Ok(_) => metrics::OUTCOME_OK,
            Err(e) => outcome_of(e),
        };
        metrics::record_request(method, outcome, started.elapsed());
        result
    }

    async fn send<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/v1/{}", self.inner.server_url, method);
        let resp = self.inner.http.post(&url).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ZbError>(&message) {
                Ok(err) if err.is_error() => ClientError::Remote {
                    code: err.code,
                    message: err.message,
                },
                _ => ClientError::Server { status, message },
            });
        }

        Ok(resp.json().await?)
    }

    /// Call a method whose reply is only an in-band error
    async fn call_void<Req>(&self, method: &'static str, body: &Req) -> Result<()>
    where
        Req: Serialize + ?Sized,
    {
        let reply: ZbError = self.call(method, body).await?;
        unwrap_remote(reply)
    }
}

fn unwrap_remote(reply: ZbError) -> Result<()> {
    if reply.is_error() {
        return Err(ClientError::Remote {
            code: reply.code,
            message: reply.message,
        });
    }
    Ok(())
}

fn outcome_of(error: &ClientError) -> &'static str {
    match error {
        ClientError::Remote { .. } | ClientError::Server { .. } => metrics::OUTCOME_REMOTE_ERROR,
        _ => metrics::OUTCOME_TRANSPORT_ERROR,
    }
}

impl std::fmt::Debug for ZbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZbClient")
            .field("server_url", &self.inner.server_url)
            .field("user_id", &self.user_id())
            .field("has_key", &self.inner.signing_key.is_some())
            .field("has_token", &self.inner.token.load().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbase_core::wire::CredentialProofType;

    fn config() -> ClientConfig {
        ClientConfig::new("http://127.0.0.1:1/").with_user("u1")
    }

    #[test]
    fn test_build_trims_url_and_keeps_user() {
        let client = ZbClient::builder(config()).build().unwrap();
        assert_eq!(client.inner.server_url, "http://127.0.0.1:1");
        assert_eq!(client.user_id(), "u1");
        assert!(client.token().is_none());
    }

    #[test]
    fn test_identity_sets_user_and_parent() {
        let identity = Identity::generate("sub", Some("parent".to_string()));
        let client = ZbClient::new(config(), &identity).unwrap();
        assert_eq!(client.user_id(), "sub");
        assert_eq!(client.parent_id(), "parent");
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = ZbClient::builder(ClientConfig::new("")).build();
        assert!(matches!(result, Err(ClientError::Core(_))));
    }

    #[tokio::test]
    async fn test_credential_needs_key_or_token() {
        let client = ZbClient::builder(config()).build().unwrap();
        let err = client.credential("u1", 1, &[]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(zbase_core::Error::NotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_token_preferred_over_key() {
        let identity = Identity::generate("u1", None);
        let client = ZbClient::new(config(), &identity).unwrap();

        let signed = client.credential("u1", 7, b"x").unwrap();
        assert_eq!(signed.cred_type, CredentialProofType::Signature);

        client.inner.token.store(Some(Arc::new("jwt".to_string())));
        let token = client.credential("u1", 8, b"x").unwrap();
        assert_eq!(token.cred_type, CredentialProofType::JwtToken);
        assert_eq!(token.jwt_token.as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn test_login_without_credentials_is_not_ready() {
        let client = ZbClient::builder(config()).build().unwrap();
        assert!(matches!(
            client.login().await,
            Err(ClientError::NotReady(_))
        ));
    }

    #[test]
    fn test_unwrap_remote() {
        assert!(unwrap_remote(ZbError::ok()).is_ok());
        let err = unwrap_remote(ZbError {
            code: 3,
            message: "TableNotFound".into(),
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::Remote { code: 3, .. }));
    }
}
