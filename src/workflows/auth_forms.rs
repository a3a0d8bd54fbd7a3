//! Login and signup forms

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use super::{Context, FormValues, ValidationError};
use crate::dashboard::fragments;
use crate::navigation::NavigationOutcome;
use crate::session::{AuthError, Credentials, Role, Session, SignupRequest};

pub const LOGIN_FIELDS: [&str; 2] = ["login-email", "login-password"];
pub const SIGNUP_FIELDS: [&str; 4] = ["signup-name", "signup-email", "signup-password", "signup-confirm"];
pub const LOGIN_ERROR_ID: &str = "login-error";
pub const SIGNUP_ERROR_ID: &str = "signup-error";

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
});

#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl FormError {
    pub fn user_message(&self) -> String {
        match self {
            FormError::Validation(e) => e.to_string(),
            FormError::Auth(e) => e.user_message(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn parse_login(form: &FormValues) -> Result<Credentials, ValidationError> {
    form.require(&LOGIN_FIELDS, "Please enter both email and password")?;
    Ok(Credentials::new(
        form.text("login-email"),
        form.text("login-password"),
    ))
}

pub fn parse_signup(form: &FormValues, role: Option<Role>) -> Result<SignupRequest, ValidationError> {
    form.require(&SIGNUP_FIELDS, "Please fill in all fields")?;
    let role = role.ok_or(ValidationError::NoRoleSelected)?;

    let email = form.text("signup-email");
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    let password = form.text("signup-password");
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != form.text("signup-confirm") {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(SignupRequest {
        name: form.text("signup-name"),
        email,
        password,
        role,
    })
}

pub async fn login(ctx: &Context<'_>) -> Result<Session, FormError> {
    let form = FormValues::read(ctx.surface(), &LOGIN_FIELDS);
    let result = match parse_login(&form) {
        Ok(credentials) => ctx.auth.login(&credentials).await.map_err(FormError::from),
        Err(e) => Err(e.into()),
    };
    finish(ctx, result, LOGIN_ERROR_ID)
}

pub async fn signup(ctx: &Context<'_>) -> Result<Session, FormError> {
    let form = FormValues::read(ctx.surface(), &SIGNUP_FIELDS);
    let result = match parse_signup(&form, ctx.nav.selected_role()) {
        Ok(request) => ctx.auth.signup(&request).await.map_err(FormError::from),
        Err(e) => Err(e.into()),
    };
    finish(ctx, result, SIGNUP_ERROR_ID)
}

/// Success: greet and open the dashboard. Failure: message in the form's error slot.
fn finish(
    ctx: &Context<'_>,
    result: Result<Session, FormError>,
    error_id: &str,
) -> Result<Session, FormError> {
    match result {
        Ok(session) => {
            ctx.client.set_auth_token(Some(session.token.clone()));
            ctx.notices
                .success(format!("Welcome, {}!", session.display_name()));
            if let NavigationOutcome::RequireAuth = ctx.nav.enter_dashboard() {
                tracing::warn!("Session missing right after sign-in");
            }
            Ok(session)
        }
        Err(e) => {
            let message = e.user_message();
            tracing::debug!(error = %e, "Auth form rejected");
            let html = fragments::alert("danger", &message).into_string();
            ctx.surface().replace(error_id, &html, Vec::new());
            ctx.notices.error(message);
            Err(e)
        }
    }
}
