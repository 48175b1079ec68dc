use crate::{
    auth::{
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, user::{NewUser, UserProfile}},
    models::{LoginReqDto, LoginResponse, RegisterReq},
    service::AppState,
    store::StoreError,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// User registration handler
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered", body = Object, example = json!({
            "message": "ユーザー登録が完了しました", "user_id": 1
        })),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Username taken")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(state, user), fields(username = %user.username))]
pub async fn register(user: web::Json<RegisterReq>, state: web::Data<AppState>) -> impl Responder {
    let user = user.into_inner();
    let username = user.username.trim().to_string();

    if username.is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "message": "Username and password must not be empty"
        }));
    }

    let hashed = match hash_password(&user.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let new_user = NewUser {
        username,
        password: hashed,
        full_name: user.full_name,
        email: user.email,
        role_id: Role::Employee.id(),
    };

    match state.store.insert_user(new_user).await {
        Ok(created) => {
            info!(user_id = created.id, "User registered");
            HttpResponse::Created().json(json!({
                "message": "ユーザー登録が完了しました",
                "user_id": created.id
            }))
        }
        Err(StoreError::Duplicate) => HttpResponse::Conflict().json(json!({
            "message": "ユーザー名が既に使用されています"
        })),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "message": "Failed to register user"
            }))
        }
    }
}

/// Login handler; issues an access token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().json(json!({
            "message": "Username or password required"
        }));
    }

    let invalid = || {
        HttpResponse::Unauthorized().json(json!({
            "message": "ユーザー名またはパスワードが間違っています"
        }))
    };

    debug!("Fetching user");

    let db_user = match state.store.find_user_by_username(user.username.trim()).await {
        Ok(Some(u)) => {
            debug!(user_id = u.id, "User found");
            u
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return invalid();
        }
        Err(e) => {
            error!(error = %e, "Storage error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return invalid();
    }

    let access_token = match generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(user_id = db_user.id, "Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserProfile::from(&db_user),
    })
}
