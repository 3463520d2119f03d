use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use serde_json::json;

use pushkind_booking::domain::pin::{PinAttemptTracker, PinCipher};
use pushkind_booking::models::config::ServerConfig;
use pushkind_booking::repository::DieselRepository;
use pushkind_booking::routes::{
    auth, availability, bookings, catalog, customers, holidays, invoices, locations, loyalty,
    merchants, public, staff, staff_blocks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Some(config) => config,
        None => {
            log::error!("SECRET_KEY environment variable not set");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let cipher = PinCipher::new(&config.pin_encryption_key);
    // Shared by every worker so lockouts hold across connections.
    let tracker = web::Data::new(PinAttemptTracker::new());

    let address = config.address.clone();
    let port = config.port;
    log::info!("Listening on {address}:{port}");

    HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
            InternalError::from_response(err, response).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
            InternalError::from_response(err, response).into()
        });

        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(json_config)
            .app_data(query_config)
            .service(auth::login)
            .service(auth::me)
            .service(auth::verify_pin)
            .service(auth::unlock)
            .service(auth::pin_status)
            .service(merchants::show_merchant)
            .service(merchants::update_settings)
            .service(locations::list_locations)
            .service(locations::add_location)
            .service(locations::update_location)
            .service(locations::delete_location)
            .service(staff::list_staff)
            .service(staff::add_staff)
            .service(staff::show_staff)
            .service(staff::update_staff)
            .service(staff::deactivate_staff)
            .service(staff::set_pin)
            .service(staff::replace_schedules)
            .service(staff::upsert_override)
            .service(staff::delete_override)
            .service(staff_blocks::list_blocks)
            .service(staff_blocks::add_block)
            .service(staff_blocks::delete_block)
            .service(catalog::list_services)
            .service(catalog::add_service)
            .service(catalog::show_service)
            .service(catalog::update_service)
            .service(catalog::deactivate_service)
            .service(customers::list_customers)
            .service(customers::add_customer)
            .service(customers::import_customers)
            .service(customers::show_customer)
            .service(customers::update_customer)
            .service(customers::delete_customer)
            .service(customers::customer_loyalty)
            .service(customers::redeem_points)
            .service(customers::adjust_points)
            // `calendar` must be matched before `{booking_id}`.
            .service(bookings::show_calendar)
            .service(bookings::add_booking)
            .service(bookings::list_bookings)
            .service(bookings::show_booking)
            .service(bookings::update_booking)
            .service(bookings::confirm_booking)
            .service(bookings::start_booking)
            .service(bookings::complete_booking)
            .service(bookings::no_show_booking)
            .service(bookings::cancel_booking)
            .service(availability::staff_availability)
            .service(availability::unassigned_capacity)
            .service(holidays::list_holidays)
            .service(holidays::add_holiday)
            .service(holidays::sync_holidays)
            .service(holidays::update_holiday)
            .service(holidays::delete_holiday)
            .service(invoices::add_invoice)
            .service(invoices::list_invoices)
            .service(invoices::show_invoice)
            .service(invoices::void_invoice)
            .service(invoices::add_payment)
            .service(invoices::payment_summary)
            .service(invoices::refund_payment)
            .service(loyalty::show_program)
            .service(loyalty::save_program)
            .service(public::show_merchant)
            .service(public::list_services)
            .service(public::list_staff)
            .service(public::show_availability)
            .service(public::add_booking)
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(cipher.clone()))
            .app_data(tracker.clone())
    })
    .bind((address, port))?
    .run()
    .await
}
