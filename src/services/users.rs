use chrono::{Duration as ChronoDuration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password, AuthService, TokenResponse},
    db::DbPool,
    entities::{otp_code, password_reset_token, user},
    errors::ServiceError,
    events::{Event, EventSender},
    models::Role,
};

const OTP_TTL_MINUTES: i64 = 5;
const RESET_TOKEN_TTL_MINUTES: i64 = 30;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
    pub site_id: Option<Uuid>,
}

/// Accounts, logins, OTP codes and password resets.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
    events: EventSender,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>, events: EventSender) -> Self {
        Self { db, auth, events }
    }

    /// Phone + password login for field roles. Management logs in by email.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<(TokenResponse, user::Model), ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid phone or password".to_string()))?;

        if account.role == Role::Management.to_string() {
            return Err(ServiceError::AuthError(
                "management accounts log in with email".to_string(),
            ));
        }

        self.finish_login(account, password)
    }

    /// Email + password login, management role only.
    #[instrument(skip(self, password))]
    pub async fn login_management(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(TokenResponse, user::Model), ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid email or password".to_string()))?;

        if account.role != Role::Management.to_string() {
            return Err(ServiceError::Forbidden(
                "not a management account".to_string(),
            ));
        }

        self.finish_login(account, password)
    }

    fn finish_login(
        &self,
        account: user::Model,
        password: &str,
    ) -> Result<(TokenResponse, user::Model), ServiceError> {
        if !account.active {
            return Err(ServiceError::Forbidden("account is deactivated".to_string()));
        }
        if !verify_password(password, &account.password_hash) {
            return Err(ServiceError::AuthError("invalid credentials".to_string()));
        }

        let token = self
            .auth
            .generate_token(&account)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        Ok((token, account))
    }

    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: NewUser) -> Result<user::Model, ServiceError> {
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let phone_taken = user::Entity::find()
            .filter(user::Column::Phone.eq(input.phone.clone()))
            .count(&*self.db)
            .await?;
        if phone_taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "phone {} is already registered",
                input.phone
            )));
        }

        if let Some(email) = &input.email {
            let email_taken = user::Entity::find()
                .filter(user::Column::Email.eq(email.clone()))
                .count(&*self.db)
                .await?;
            if email_taken > 0 {
                return Err(ServiceError::Conflict(format!(
                    "email {} is already registered",
                    email
                )));
            }
        }

        let password_hash =
            hash_password(&input.password).map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            phone: Set(input.phone),
            email: Set(input.email),
            password_hash: Set(password_hash),
            role: Set(input.role.to_string()),
            site_id: Set(input.site_id),
            active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::UserRegistered {
                user_id: created.id,
                role: created.role.clone(),
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: u64,
        limit: u64,
        role: Option<Role>,
    ) -> Result<(Vec<user::Model>, u64), ServiceError> {
        let mut query = user::Entity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role.to_string()));
        }
        let paginator = query
            .order_by_asc(user::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page - 1).await?;
        Ok((users, total))
    }

    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        let account = self.get_user(user_id).await?;
        let mut active: user::ActiveModel = account.into();
        active.active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }

    /// Issues a 6-digit login code: only its argon2 hash is stored, the code
    /// itself goes out by SMS and expires after five minutes.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, phone: &str) -> Result<(), ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&*self.db)
            .await?;
        if account.is_none() {
            // Don't reveal which phones are registered.
            info!("otp requested for unknown phone");
            return Ok(());
        }

        let code = format!("{:06}", thread_rng().gen_range(0..=999_999u32));
        let code_hash =
            hash_password(&code).map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let model = otp_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(phone.to_string()),
            code_hash: Set(code_hash),
            purpose: Set("login".to_string()),
            expires_at: Set(Utc::now() + ChronoDuration::minutes(OTP_TTL_MINUTES)),
            consumed: Set(false),
            created_at: Set(Utc::now()),
        };
        model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::OtpIssued {
                phone: phone.to_string(),
                code,
            })
            .await;

        Ok(())
    }

    /// Checks a submitted code against unexpired, unconsumed codes for the
    /// phone and consumes it on match. Single use.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<(), ServiceError> {
        let candidates = otp_code::Entity::find()
            .filter(otp_code::Column::Phone.eq(phone))
            .filter(otp_code::Column::Consumed.eq(false))
            .filter(otp_code::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(otp_code::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        for candidate in candidates {
            if verify_password(code, &candidate.code_hash) {
                let mut active: otp_code::ActiveModel = candidate.into();
                active.consumed = Set(true);
                active.update(&*self.db).await?;
                return Ok(());
            }
        }

        Err(ServiceError::AuthError(
            "invalid or expired verification code".to_string(),
        ))
    }

    /// Issues a single-use reset token delivered by email. The response is
    /// identical whether or not the address is registered.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ServiceError> {
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        let Some(account) = account else {
            info!("password reset requested for unknown email");
            return Ok(());
        };

        let token_id = Uuid::new_v4();
        let secret: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let token_hash =
            hash_password(&secret).map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let model = password_reset_token::ActiveModel {
            id: Set(token_id),
            user_id: Set(account.id),
            token_hash: Set(token_hash),
            expires_at: Set(Utc::now() + ChronoDuration::minutes(RESET_TOKEN_TTL_MINUTES)),
            used: Set(false),
            created_at: Set(Utc::now()),
        };
        model.insert(&*self.db).await?;

        self.events
            .send_or_log(Event::PasswordResetRequested {
                email: email.to_string(),
                token: format!("{}.{}", token_id, secret),
            })
            .await;

        Ok(())
    }

    /// Consumes a reset token (format `<id>.<secret>`) and stores the new
    /// password hash.
    #[instrument(skip(self, token, new_password))]
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let (token_id, secret) = token
            .split_once('.')
            .ok_or_else(|| ServiceError::AuthError("malformed reset token".to_string()))?;
        let token_id = Uuid::parse_str(token_id)
            .map_err(|_| ServiceError::AuthError("malformed reset token".to_string()))?;

        let record = password_reset_token::Entity::find_by_id(token_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("invalid reset token".to_string()))?;

        if record.used || record.expires_at <= Utc::now() {
            return Err(ServiceError::AuthError(
                "reset token expired or already used".to_string(),
            ));
        }
        if !verify_password(secret, &record.token_hash) {
            return Err(ServiceError::AuthError("invalid reset token".to_string()));
        }

        let account = self.get_user(record.user_id).await?;
        let password_hash =
            hash_password(new_password).map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let mut active: user::ActiveModel = account.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;

        let mut token_active: password_reset_token::ActiveModel = record.into();
        token_active.used = Set(true);
        token_active.update(&*self.db).await?;

        Ok(())
    }
}
