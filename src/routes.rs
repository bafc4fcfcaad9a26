use serde::Serialize;
use serde_json::Value;
use warp::{
    reply::{self, Reply},
    Filter, Rejection,
};

use crate::controllers::AccountController;
use crate::error::ApiError;
use crate::filters::{self, json_body, with_controller};
use crate::limiter::RateLimiter;
use crate::models::{
    CreateTeacherRequest, DeleteUserRequest, DeleteUsersRequest, LoginRequest, RegisterRequest,
    Role,
};

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Result<reply::Response, Rejection> {
    match result {
        Ok(body) => Ok(reply::json(&body).into_response()),
        Err(err) => Ok(err.into_response()),
    }
}

/// The complete HTTP surface of the score server.
pub fn api(
    controller: AccountController,
    limiter: RateLimiter,
    cors_origin: Option<&str>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let register = warp::path!("api" / "register")
        .and(warp::post())
        .and(json_body())
        .and(filters::rate_limited(limiter.clone()))
        .and(with_controller(controller.clone()))
        .and_then(
            |body: RegisterRequest, controller: AccountController| async move {
                respond(controller.register(body).await)
            },
        );

    let login = warp::path!("api" / "login")
        .and(warp::post())
        .and(json_body())
        .and(filters::rate_limited(limiter))
        .and(with_controller(controller.clone()))
        .and_then(
            |body: LoginRequest, controller: AccountController| async move {
                respond(controller.login(body).await)
            },
        );

    let create_teacher = warp::path!("api" / "create-teacher")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(
            |body: CreateTeacherRequest, controller: AccountController| async move {
                respond(controller.create_teacher(body).await)
            },
        );

    let submit_score = warp::path!("api" / "submit-score")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(|body: Value, controller: AccountController| async move {
            respond(controller.submit_score(body).await)
        });

    let scores = warp::path!("api" / "scores")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(|controller: AccountController| async move {
            respond(controller.scores().await)
        });

    let students = warp::path!("api" / "students")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(|controller: AccountController| async move {
            respond(controller.users_with_role(Role::Student).await)
        });

    let teachers = warp::path!("api" / "teachers")
        .and(warp::get())
        .and(with_controller(controller.clone()))
        .and_then(|controller: AccountController| async move {
            respond(controller.users_with_role(Role::Teacher).await)
        });

    let delete_user = warp::path!("api" / "delete-user")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller.clone()))
        .and_then(
            |body: DeleteUserRequest, controller: AccountController| async move {
                respond(controller.delete_user(body).await)
            },
        );

    let delete_users = warp::path!("api" / "delete-users")
        .and(warp::post())
        .and(json_body())
        .and(with_controller(controller))
        .and_then(
            |body: DeleteUsersRequest, controller: AccountController| async move {
                respond(controller.delete_users(body).await)
            },
        );

    let cors = match cors_origin {
        Some(origin) => warp::cors().allow_origin(origin),
        None => warp::cors().allow_any_origin(),
    }
    .allow_methods(vec!["GET", "POST"])
    .allow_headers(vec!["Content-Type"])
    .build();

    register
        .or(login)
        .or(create_teacher)
        .or(submit_score)
        .or(scores)
        .or(students)
        .or(teachers)
        .or(delete_user)
        .or(delete_users)
        .recover(filters::handle_rejection)
        .with(cors)
}
