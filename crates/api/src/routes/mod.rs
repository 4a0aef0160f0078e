pub mod auth;
pub mod cases;
pub mod contacts;
pub mod contract_templates;
pub mod contracts;
pub mod dashboard;
pub mod enquiries;
pub mod export;
pub mod freelancers;
pub mod health;
pub mod invoices;
pub mod mentors;
pub mod reminders;
pub mod training;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                         login (public)
/// /auth/me                                            current user
///
/// /users                                              list, create (admin only)
/// /users/{id}                                         get, update, deactivate
///
/// /contract-templates                                 list, create
/// /contract-templates/placeholders                    recommended placeholders (?type=)
/// /contract-templates/preview                         render unsaved content (POST)
/// /contract-templates/{id}                            get, update, delete
/// /contract-templates/{id}/placeholders               placeholders used
///
/// /contracts                                          list, generate
/// /contracts/{id}                                     get, update, delete
/// /contracts/{id}/status                              status transition (POST)
/// /contracts/{id}/document                            rendered download
///
/// /cases                                              list, create
/// /cases/{id}                                         get, update, delete
/// /cases/{id}/actions                                 available actions
/// /cases/{id}/transition                              status transition (POST)
/// /cases/{id}/caseworkers                             replace assignments (PUT)
/// /cases/{id}/caseworkers/{user_id}/lead              set lead (POST)
///
/// /enquiries                                          list, create
/// /enquiries/{id}                                     get, update, delete
/// /enquiries/{id}/initial-assessment                  submit (POST)
/// /enquiries/{id}/full-assessment                     submit (POST)
/// /enquiries/{id}/advance                             next stage (POST)
/// /enquiries/{id}/closure                             close (POST)
///
/// /reminders                                          list, create
/// /reminders/{id}                                     get, delete
/// /reminders/{id}/complete                            complete (POST)
///
/// /freelancers, /mentors, /contacts                   list, create
/// /freelancers/{id}, /mentors/{id}, /contacts/{id}    get, update, delete
///
/// /training/events                                    list, create
/// /training/events/{id}                               get, update, delete
/// /training/events/{id}/participants                  list, add
/// /training/events/{id}/participants/import           CSV import (POST)
/// /training/events/{id}/participants/{participant_id} remove
///
/// /invoices                                           list, create
/// /invoices/{id}                                      get, update, delete
/// /invoices/{id}/status                               status transition (POST)
///
/// /export/{entity}                                    CSV download
/// /dashboard/summary                                  headline counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/contract-templates", contract_templates::router())
        .nest("/contracts", contracts::router())
        .nest("/cases", cases::router())
        .nest("/enquiries", enquiries::router())
        .nest("/reminders", reminders::router())
        .nest("/freelancers", freelancers::router())
        .nest("/mentors", mentors::router())
        .nest("/contacts", contacts::router())
        .nest("/training", training::router())
        .nest("/invoices", invoices::router())
        .nest("/export", export::router())
        .nest("/dashboard", dashboard::router())
}
