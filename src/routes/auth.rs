use crate::{
    auth::{
        generate_token, hash_password, verify_password, CurrentUser, LoginForm, LoginRequest,
        RegisterRequest, TokenResponse, TokenSettings,
    },
    db::DbPool,
    error::AppError,
    models::UserResponse,
    store,
};
use actix_web::{get, post, web, Either, HttpResponse, Responder};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

/// Register a new user
///
/// Creates a new account and returns its public view (`201 Created`).
/// An email that is already registered is rejected with `400 Bad Request`.
#[post("/register")]
pub async fn register(
    pool: web::Data<DbPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    if store::users::find_by_email(&pool, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // Hashing runs on the blocking thread pool.
    let password_hash = web::block(move || hash_password(&password)).await??;
    let user = store::users::create_user(&pool, &email, &password_hash).await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Checks the credentials and returns a bearer token bound to the user's email.
/// Accepts a JSON `{email, password}` body or a form-encoded `username`/`password` body.
/// Unknown emails and wrong passwords both answer `401 Unauthorized`.
#[post("/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    settings: web::Data<TokenSettings>,
    login_data: Either<web::Json<LoginRequest>, web::Form<LoginForm>>,
) -> Result<impl Responder, AppError> {
    let login_data = match login_data {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => LoginRequest::from(form.into_inner()),
    };
    login_data.validate()?;
    let LoginRequest { email, password } = login_data;

    let Some(user) = store::users::find_by_email(&pool, &email).await? else {
        log::warn!("login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let hashed = user.hashed_password.clone();
    let matches = web::block(move || verify_password(&password, &hashed)).await??;
    if !matches {
        log::warn!("failed login for user {}", user.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = generate_token(&user.email, &settings)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Lists every other user, i.e. the candidates a task can be shared with.
#[get("/users")]
pub async fn list_users(
    pool: web::Data<DbPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let users = store::users::list_except(&pool, user.id).await?;
    Ok(HttpResponse::Ok().json(users))
}
