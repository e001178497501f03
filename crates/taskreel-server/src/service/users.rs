// SPDX-License-Identifier: Apache-2.0

use crate::auth::AuthContext;
use crate::notify::verification_email;
use crate::service::store_err;
use crate::AppState;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::RngCore;
use taskreel_api::{ApiError, LoginResponse, RegisterRequest, UpdateUserRequest};
use taskreel_model::{
    evaluate_password_strength, validate_email, FieldError, PasswordStrength, User,
};
use tracing::{info, warn};

const VERIFICATION_TOKEN_BYTES: usize = 20;

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn generate_verification_token() -> String {
    let mut bytes = [0u8; VERIFICATION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A password must be Strong to be accepted, at registration and on any
/// later change.
fn check_password(password: &str) -> Result<(), FieldError> {
    let strength = evaluate_password_strength(password);
    if strength == PasswordStrength::Strong {
        Ok(())
    } else {
        Err(FieldError::new(
            "password",
            format!("password strength is {strength}; a Strong password is required"),
        ))
    }
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, ApiError> {
    let mut errors = Vec::new();
    if req.user_name.trim().is_empty() {
        errors.push(FieldError::new("userName", "userName is required"));
    }
    if let Err(e) = validate_email(&req.email) {
        errors.push(e);
    }
    if let Err(e) = check_password(&req.password) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(ApiError::validation_failed(errors));
    }

    if state
        .store
        .find_user_by_email(&req.email)
        .map_err(store_err)?
        .is_some()
    {
        return Err(ApiError::conflict("User already exists"));
    }

    let password_hash = hash_password(&req.password)?;
    let token = generate_verification_token();
    let user = User::new(req.user_name, req.email, password_hash, token);
    state.store.insert_user(&user).map_err(store_err)?;

    let (subject, body) = verification_email(&state.config.frontend_base_url, &user.verification_token);
    if state.sink.send(&user.email, &subject, &body).await {
        info!(user_id = %user.id.as_str(), "verification email dispatched");
    } else {
        warn!(user_id = %user.id.as_str(), "verification email dispatch failed");
    }
    Ok(user)
}

/// Redeems a verification token. Single-use: the token column is cleared
/// on success, so replaying the same token hits the not-found path.
pub async fn verify_email(state: &AppState, token: &str) -> Result<(), ApiError> {
    let mut user = state
        .store
        .find_user_by_token(token)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::not_found("User with this verification token"))?;
    user.verified = true;
    user.verification_token = String::new();
    user.updated_at = Utc::now();
    if !state.store.update_user(&user).map_err(store_err)? {
        return Err(ApiError::not_found("User with this verification token"));
    }
    Ok(())
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let user = state
        .store
        .find_user_by_email(email)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::authentication("Invalid credentials"))?;
    if !verify_password(password, &user.password_hash) {
        return Err(ApiError::authentication("Invalid credentials"));
    }
    if !user.verified {
        return Err(ApiError::forbidden("Email is not verified"));
    }
    let token = state.signer.issue(&user.id, &user.email)?;
    Ok(LoginResponse {
        token,
        email: user.email,
        id: user.id.as_str().to_string(),
    })
}

pub async fn get_user(state: &AppState, ctx: &AuthContext) -> Result<User, ApiError> {
    state
        .store
        .find_user(&ctx.user_id)
        .map_err(store_err)?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn update_user(
    state: &AppState,
    ctx: &AuthContext,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    let mut user = get_user(state, ctx).await?;

    if let Some(password) = &req.password {
        check_password(password).map_err(|e| ApiError::validation_failed(vec![e]))?;
        user.password_hash = hash_password(password)?;
    }
    if let Some(user_name) = req.user_name {
        user.user_name = user_name;
    }
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }
    if let Some(phone) = req.phone {
        user.phone = phone;
    }
    if let Some(academics) = req.academics {
        user.academics = academics.into_iter().map(Into::into).collect();
    }
    user.validate().map_err(ApiError::validation_failed)?;
    user.updated_at = Utc::now();
    if !state.store.update_user(&user).map_err(store_err)? {
        return Err(ApiError::not_found("User"));
    }
    Ok(user)
}

/// Removes the account and everything it owns: tasks, video records, and
/// the media files behind them.
pub async fn delete_user(state: &AppState, ctx: &AuthContext) -> Result<(), ApiError> {
    let user = get_user(state, ctx).await?;
    let videos = state
        .store
        .videos_for_user(&ctx.user_id)
        .map_err(store_err)?;
    if !state.store.delete_user(&ctx.user_id).map_err(store_err)? {
        return Err(ApiError::not_found("User"));
    }
    for video in &videos {
        state.media.remove(&video.url);
        state.media.remove(&video.thumbnail);
    }
    state.media.remove(&user.profile_picture);
    info!(user_id = %ctx.user_id.as_str(), videos = videos.len(), "account deleted");
    Ok(())
}

pub async fn set_profile_picture(
    state: &AppState,
    ctx: &AuthContext,
    original_filename: &str,
    bytes: &[u8],
) -> Result<User, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::validation_failed(vec![FieldError::new(
            "profilePicture",
            "Profile picture not received",
        )]));
    }
    let mut user = get_user(state, ctx).await?;
    let stored = state.media.save(original_filename, bytes).await?;
    let previous = std::mem::replace(&mut user.profile_picture, stored.relative);
    user.updated_at = Utc::now();
    if !state.store.update_user(&user).map_err(store_err)? {
        state.media.remove(&user.profile_picture);
        return Err(ApiError::not_found("User"));
    }
    state.media.remove(&previous);
    Ok(user)
}
