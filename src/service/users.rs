//! User account operations. Every expected outcome is a [`ResponseEnvelope`];
//! `Err` is reserved for invalid input and internal faults.

use crate::auth::{Claims, CredentialHasher, TokenIssuer};
use crate::config::RecordType;
use crate::error::{AppError, ConfigError, StoreError};
use crate::model::{login_record_type, User, ACCOUNT_FIELD, SERVER_ASSIGNED};
use crate::response::{BizCode, ResponseEnvelope};
use crate::schema::{derive_schema, DerivedSchema};
use crate::service::validation::{RequestValidator, ValidatedInput};
use crate::store::UserStore;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// The authenticated caller, resolved from a verified token.
#[derive(Clone, Debug, PartialEq)]
pub struct Caller {
    pub id: i64,
    pub account: String,
}

/// Derived schemas for the user record type, built once at startup.
#[derive(Clone, Debug)]
pub struct UserSchemas {
    pub create: DerivedSchema,
    pub update: DerivedSchema,
    pub login: DerivedSchema,
}

impl UserSchemas {
    pub fn derive(record: &RecordType) -> Result<Self, ConfigError> {
        let full = derive_schema(record)?;
        let create = full.omit(&SERVER_ASSIGNED);
        let update = create.partial();
        Ok(UserSchemas {
            create,
            update,
            login: derive_schema(&login_record_type())?,
        })
    }
}

pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenIssuer>,
    schemas: UserSchemas,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        schemas: UserSchemas,
    ) -> Self {
        UserService {
            store,
            hasher,
            tokens,
            schemas,
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn tokens(&self) -> &Arc<dyn TokenIssuer> {
        &self.tokens
    }

    pub async fn register(&self, body: &Value) -> Result<ResponseEnvelope, AppError> {
        let input = RequestValidator::validate(body, &self.schemas.create)?;
        let account = input.get(ACCOUNT_FIELD).cloned().unwrap_or(Value::Null);
        if self.store.find_one(ACCOUNT_FIELD, &account).await?.is_some() {
            return Ok(account_exists());
        }
        let user = match self.insert(input).await? {
            Ok(user) => user,
            Err(envelope) => return Ok(envelope),
        };
        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, account = %user.account, "registered");
        Ok(ResponseEnvelope::success(json!({ "user": user.to_json(), "token": token })))
    }

    pub async fn login(&self, body: &Value) -> Result<ResponseEnvelope, AppError> {
        let input = RequestValidator::validate(body, &self.schemas.login)?;
        let account = input.get(ACCOUNT_FIELD).cloned().unwrap_or(Value::Null);
        let password = input.get("password").and_then(Value::as_str).unwrap_or_default();
        let Some(user) = self.store.find_one(ACCOUNT_FIELD, &account).await? else {
            return Ok(ResponseEnvelope::error(BizCode::AccountNotFound, "account not found"));
        };
        if !self.hasher.compare(password, &user.password)? {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Ok(ResponseEnvelope::error(BizCode::PasswordError, "wrong password"));
        }
        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, "logged in");
        Ok(ResponseEnvelope::success(json!({ "user": user.to_json(), "token": token })))
    }

    pub async fn list(&self) -> Result<ResponseEnvelope, AppError> {
        let users: Vec<Value> = self.store.find_all().await?.iter().map(User::to_json).collect();
        Ok(ResponseEnvelope::success(Value::Array(users)))
    }

    pub async fn get(&self, id: i64) -> Result<ResponseEnvelope, AppError> {
        match self.store.find_by_key(id).await? {
            Some(user) => Ok(ResponseEnvelope::success(user.to_json())),
            None => Ok(user_not_found()),
        }
    }

    pub async fn me(&self, caller: &Caller) -> Result<ResponseEnvelope, AppError> {
        self.get(caller.id).await
    }

    pub async fn create(&self, body: &Value) -> Result<ResponseEnvelope, AppError> {
        let input = RequestValidator::validate(body, &self.schemas.create)?;
        match self.insert(input).await? {
            Ok(user) => {
                tracing::info!(user_id = user.id, "created user");
                Ok(ResponseEnvelope::success(user.to_json()))
            }
            Err(envelope) => Ok(envelope),
        }
    }

    pub async fn update(&self, caller: &Caller, id: i64, body: &Value) -> Result<ResponseEnvelope, AppError> {
        let input = RequestValidator::validate(body, &self.schemas.update)?;
        if self.store.find_by_key(id).await?.is_none() {
            return Ok(user_not_found());
        }
        if caller.id != id {
            tracing::warn!(caller = caller.id, target = id, "update denied");
            return Ok(permission_denied());
        }
        let fields = self.with_hashed_password(input)?;
        let affected = match self.store.update(id, &fields).await {
            Ok(n) => n,
            Err(StoreError::Conflict(_)) => return Ok(account_exists()),
            Err(StoreError::Constraint(msg)) => return Ok(database_error(msg)),
            Err(e) => return Err(e.into()),
        };
        if affected == 0 {
            return Ok(user_not_found());
        }
        self.get(id).await
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<ResponseEnvelope, AppError> {
        if self.store.find_by_key(id).await?.is_none() {
            return Ok(user_not_found());
        }
        if caller.id != id {
            tracing::warn!(caller = caller.id, target = id, "delete denied");
            return Ok(permission_denied());
        }
        if self.store.destroy(id).await? == 0 {
            return Ok(user_not_found());
        }
        tracing::info!(user_id = id, "deleted user");
        Ok(ResponseEnvelope::success(Value::Null))
    }

    /// Hash the password and insert. The inner `Err` is a business outcome.
    async fn insert(&self, input: ValidatedInput) -> Result<Result<User, ResponseEnvelope>, AppError> {
        let fields = self.with_hashed_password(input)?;
        match self.store.create(&fields).await {
            Ok(user) => Ok(Ok(user)),
            Err(StoreError::Conflict(_)) => Ok(Err(account_exists())),
            Err(StoreError::Constraint(msg)) => Ok(Err(database_error(msg))),
            Err(e) => Err(e.into()),
        }
    }

    fn with_hashed_password(&self, input: ValidatedInput) -> Result<Map<String, Value>, AppError> {
        let mut fields = input.into_map();
        if let Some(Value::String(plain)) = fields.get("password") {
            let digest = self.hasher.hash(plain)?;
            fields.insert("password".into(), Value::String(digest));
        }
        Ok(fields)
    }

    fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims::new(user, self.tokens.ttl())?;
        Ok(self.tokens.sign(&claims)?)
    }
}

fn account_exists() -> ResponseEnvelope {
    ResponseEnvelope::error(BizCode::AccountExists, "account already exists")
}

fn user_not_found() -> ResponseEnvelope {
    ResponseEnvelope::error(BizCode::AccountNotFound, "user not found")
}

fn permission_denied() -> ResponseEnvelope {
    ResponseEnvelope::error(BizCode::PermissionDenied, "permission denied")
}

fn database_error(msg: String) -> ResponseEnvelope {
    tracing::warn!(error = %msg, "write rejected by store");
    ResponseEnvelope::error(BizCode::DatabaseError, "record rejected by database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Hasher, JwtIssuer};
    use crate::model::user_record_type;
    use crate::store::MemoryUserStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls that reach the store.
    struct CountingStore {
        inner: MemoryUserStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn find_by_key(&self, id: i64) -> Result<Option<User>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_key(id).await
        }
        async fn find_one(&self, field: &str, value: &Value) -> Result<Option<User>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_one(field, value).await
        }
        async fn find_all(&self) -> Result<Vec<User>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all().await
        }
        async fn create(&self, fields: &Map<String, Value>) -> Result<User, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(fields).await
        }
        async fn update(&self, id: i64, fields: &Map<String, Value>) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, fields).await
        }
        async fn destroy(&self, id: i64) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.destroy(id).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn service_with(store: Arc<dyn UserStore>) -> UserService {
        UserService::new(
            store,
            Arc::new(Argon2Hasher::new()),
            Arc::new(JwtIssuer::new("unit-secret", Duration::from_secs(3600))),
            UserSchemas::derive(&user_record_type()).unwrap(),
        )
    }

    fn service() -> UserService {
        service_with(Arc::new(MemoryUserStore::new()))
    }

    async fn register(svc: &UserService, account: &str) -> i64 {
        let env = svc
            .register(&json!({ "account": account, "password": "Secret123!" }))
            .await
            .unwrap();
        assert!(env.is_success(), "{:?}", env);
        env.data.unwrap()["user"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn register_returns_user_and_token() {
        let svc = service();
        let env = svc
            .register(&json!({ "account": "alice", "password": "Secret123!" }))
            .await
            .unwrap();
        assert_eq!(env.code, BizCode::Success);
        let data = env.data.unwrap();
        assert_eq!(data["user"]["account"], "alice");
        assert!(data["user"].get("password").is_none());
        let token = data["token"].as_str().unwrap();
        assert_eq!(svc.tokens().verify(token).unwrap().account, "alice");
    }

    #[tokio::test]
    async fn duplicate_registration_is_account_exists() {
        let svc = service();
        register(&svc, "alice").await;
        let env = svc
            .register(&json!({ "account": "alice", "password": "Other123!" }))
            .await
            .unwrap();
        assert_eq!(env.code, BizCode::AccountExists);
    }

    #[tokio::test]
    async fn login_outcomes() {
        let svc = service();
        register(&svc, "alice").await;
        let wrong = svc
            .login(&json!({ "account": "alice", "password": "Wrong123!" }))
            .await
            .unwrap();
        assert_eq!(wrong.code, BizCode::PasswordError);
        let missing = svc
            .login(&json!({ "account": "nobody", "password": "Secret123!" }))
            .await
            .unwrap();
        assert_eq!(missing.code, BizCode::AccountNotFound);
        let ok = svc
            .login(&json!({ "account": "alice", "password": "Secret123!" }))
            .await
            .unwrap();
        assert!(ok.is_success());
        assert!(ok.data.unwrap()["token"].is_string());
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let store = Arc::new(MemoryUserStore::new());
        let svc = service_with(store.clone());
        let id = register(&svc, "alice").await;
        let stored = store.find_by_key(id).await.unwrap().unwrap();
        assert_ne!(stored.password, "Secret123!");
        assert!(stored.password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_store() {
        let store = Arc::new(CountingStore {
            inner: MemoryUserStore::new(),
            calls: AtomicUsize::new(0),
        });
        let svc = service_with(store.clone());
        let err = svc
            .create(&json!({ "account": "a", "password": "Secret123!" }))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(v) => assert!(v.has_field("account")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn server_assigned_fields_are_rejected_on_create() {
        let svc = service();
        let err = svc
            .create(&json!({ "id": 5, "account": "alice", "password": "Secret123!" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.has_field("id")));
    }

    #[tokio::test]
    async fn cross_user_update_is_denied_and_target_unchanged() {
        let svc = service();
        let a = register(&svc, "alice").await;
        let b = register(&svc, "bobby").await;
        let caller = Caller {
            id: a,
            account: "alice".into(),
        };
        let env = svc.update(&caller, b, &json!({ "nickName": "hacked" })).await.unwrap();
        assert_eq!(env.code, BizCode::PermissionDenied);
        let target = svc.get(b).await.unwrap().data.unwrap();
        assert_eq!(target["nickName"], Value::Null);
    }

    #[tokio::test]
    async fn self_update_applies_and_rehashes_password() {
        let svc = service();
        let a = register(&svc, "alice").await;
        let caller = Caller {
            id: a,
            account: "alice".into(),
        };
        let env = svc
            .update(&caller, a, &json!({ "nickName": "Al", "password": "Newpass99" }))
            .await
            .unwrap();
        assert!(env.is_success());
        assert_eq!(env.data.unwrap()["nickName"], "Al");
        let relogin = svc
            .login(&json!({ "account": "alice", "password": "Newpass99" }))
            .await
            .unwrap();
        assert!(relogin.is_success());
    }

    #[tokio::test]
    async fn null_on_required_field_is_rejected_before_the_store() {
        let svc = service();
        let a = register(&svc, "alice").await;
        let caller = Caller {
            id: a,
            account: "alice".into(),
        };
        for body in [json!({ "account": null }), json!({ "password": null })] {
            let err = svc.update(&caller, a, &body).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{:?}", err);
        }
        let current = svc.get(a).await.unwrap().data.unwrap();
        assert_eq!(current["account"], "alice");
    }

    #[tokio::test]
    async fn renaming_to_taken_account_is_account_exists() {
        let svc = service();
        register(&svc, "alice").await;
        let b = register(&svc, "bobby").await;
        let caller = Caller {
            id: b,
            account: "bobby".into(),
        };
        let env = svc.update(&caller, b, &json!({ "account": "alice" })).await.unwrap();
        assert_eq!(env.code, BizCode::AccountExists);
    }

    #[tokio::test]
    async fn missing_ids_are_account_not_found() {
        let svc = service();
        let a = register(&svc, "alice").await;
        let caller = Caller {
            id: a,
            account: "alice".into(),
        };
        assert_eq!(svc.get(9999).await.unwrap().code, BizCode::AccountNotFound);
        assert_eq!(
            svc.update(&caller, 9999, &json!({ "nickName": "x" })).await.unwrap().code,
            BizCode::AccountNotFound
        );
        assert_eq!(svc.delete(&caller, 9999).await.unwrap().code, BizCode::AccountNotFound);
    }

    #[tokio::test]
    async fn delete_own_account() {
        let svc = service();
        let a = register(&svc, "alice").await;
        let b = register(&svc, "bobby").await;
        let caller = Caller {
            id: a,
            account: "alice".into(),
        };
        assert_eq!(svc.delete(&caller, b).await.unwrap().code, BizCode::PermissionDenied);
        assert!(svc.delete(&caller, a).await.unwrap().is_success());
        assert_eq!(svc.get(a).await.unwrap().code, BizCode::AccountNotFound);
        let list = svc.list().await.unwrap().data.unwrap();
        assert_eq!(list.as_array().unwrap().len(), 1);
    }
}
