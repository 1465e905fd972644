use crate::{
    auth::{hash_password, verify_password, LoginRequest, LoginResponse, RegisterRequest, TokenCodec},
    error::AppError,
    store::UserStore,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a technician or manager account. No token is issued; clients log in next.
///
/// ## Responses:
/// - `201 Created`: `{id, username, role}`.
/// - `400 Bad Request`: malformed body, unknown role, invalid username, or username taken.
/// - `500 Internal Server Error`: hashing or store failure.
#[post("/register")]
pub async fn register(
    users: web::Data<dyn UserStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let password_hash = hash_password(&register_data.password)?;
    let user = users
        .create_user(&register_data.username, &password_hash, register_data.role)
        .await?;

    log::info!("registered user {} as {}", user.id, user.role);
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Checks the password against the stored hash and returns a token carrying the
/// user's id and stored role.
///
/// ## Responses:
/// - `200 OK`: `{token}`.
/// - `400 Bad Request`: malformed body.
/// - `401 Unauthorized`: unknown username or wrong password (indistinguishable).
/// - `500 Internal Server Error`: store or signing failure.
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserStore>,
    codec: web::Data<TokenCodec>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let credentials = users
        .find_credentials(&login_data.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login_data.password, &credentials.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = codec.issue(credentials.id, credentials.role)?;
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    #[actix_rt::test]
    async fn test_register_then_login() {
        let users: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        let codec = Arc::new(TokenCodec::new("routes_auth_secret"));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(users))
                .app_data(web::Data::from(codec.clone()))
                .service(register)
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "username": "bob", "password": "pw", "role": "manager" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "username": "bob", "password": "pw" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: LoginResponse = test::read_body_json(resp).await;
        let claims = codec.verify(&body.token).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.role, "manager");
    }
}
