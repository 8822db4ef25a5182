use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{JwtResponse, LoginRequest, SignupRequest},
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{
    error::{ApiError, ApiResult},
    store::Store,
    users::repo_types::{NewUser, User},
};

const EMAIL_MAX: usize = 50;
const NAME_MIN: usize = 3;
const NAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 40;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_len(problems: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len == 0 {
        problems.push(format!("{field} is required"));
    } else if len < min || len > max {
        problems.push(format!("{field} must be between {min} and {max} characters"));
    }
}

/// Trims names, lowercases the email and checks field constraints.
pub fn validate_signup(mut req: SignupRequest) -> ApiResult<SignupRequest> {
    req.email = req.email.trim().to_lowercase();
    req.first_name = req.first_name.trim().to_string();
    req.last_name = req.last_name.trim().to_string();

    let mut problems = Vec::new();
    if req.email.is_empty() {
        problems.push("email is required".to_string());
    } else if req.email.chars().count() > EMAIL_MAX || !is_valid_email(&req.email) {
        problems.push("email is invalid".to_string());
    }
    check_len(&mut problems, "firstName", &req.first_name, NAME_MIN, NAME_MAX);
    check_len(&mut problems, "lastName", &req.last_name, NAME_MIN, NAME_MAX);
    check_len(&mut problems, "password", &req.password, PASSWORD_MIN, PASSWORD_MAX);

    if problems.is_empty() {
        Ok(req)
    } else {
        Err(ApiError::BadRequest(problems.join("; ")))
    }
}

pub async fn register(store: &dyn Store, req: SignupRequest) -> ApiResult<User> {
    let req = validate_signup(req)?;

    if store.find_user_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::bad_request("Error: Email is already taken!"));
    }

    let user = store
        .create_user(NewUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash: hash_password(&req.password)?,
            admin: false,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn login(store: &dyn Store, keys: &JwtKeys, req: LoginRequest) -> ApiResult<JwtResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let user = match store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::unauthorized("Bad credentials"));
        }
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Bad credentials"));
    }

    let token = keys.sign(user.id, &user.email)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(JwtResponse::bearer(token, &user))
}
