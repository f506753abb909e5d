use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, TokenCodec};
use crate::configuration::AuthSettings;
use crate::middleware::{AuthGate, RequestLogger};
use crate::routes::{health_check, login, logout, profile, refresh, register, welcome};
use crate::users::UserStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(&auth_settings);
    let service = web::Data::new(AuthService::new(store, codec.clone()));

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(service.clone())

            // Public routes (no authentication required)
            .route("/health", web::get().to(health_check))

            // Welcome route: identity attached when a valid token is present
            .service(
                web::scope("/welcome")
                    .wrap(AuthGate::optional(codec.clone()))
                    .route("", web::get().to(welcome)),
            )

            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))

                    // Protected routes (require a valid access token)
                    .service(
                        web::scope("")
                            .wrap(AuthGate::required(codec.clone()))
                            .route("/profile", web::get().to(profile))
                            .route("/logout", web::post().to(logout)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
