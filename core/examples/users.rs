//! Fetch users from JSONPlaceholder with a plain `ureq::Agent`.
//!
//! With `REST_BASE_URL` and `REST_TOKEN` set, the user list is also fetched
//! from that server through `BearerTokenClient` (try it against the mock
//! server: `MOCK_TOKEN=t cargo run -p mock-server`).
//!
//! Set `RUST_LOG=rest_route=debug` to see each request.

use rest_route::{args, BearerTokenClient, ClientConfig, Route};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct Geo {
    lat: String,
    lng: String,
}

#[derive(Debug, Deserialize)]
struct Address {
    street: String,
    city: String,
    zipcode: String,
    geo: Geo,
}

#[derive(Debug, Deserialize)]
struct Company {
    name: String,
}

#[derive(Debug, Deserialize)]
struct User {
    id: u64,
    name: String,
    username: String,
    email: String,
    address: Option<Address>,
    company: Option<Company>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    id: u64,
    name: String,
}

const GET_USER: Route<User> = Route::get("https://jsonplaceholder.typicode.com/users/%d");
const LIST_USERS: Route<Vec<Summary>> = Route::get("/users");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "rest_route=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let user = GET_USER.dispatch(&agent, args![1])?;
    println!("{} ({}) <{}>", user.name, user.username, user.email);
    if let Some(address) = &user.address {
        println!(
            "  {}, {} {} [{}, {}]",
            address.street, address.city, address.zipcode, address.geo.lat, address.geo.lng
        );
    }
    if let Some(company) = &user.company {
        println!("  works at {}", company.name);
    }
    println!("  id {}", user.id);

    match ClientConfig::from_env() {
        Ok(config) => {
            let client = BearerTokenClient::from_config(&config);
            for summary in LIST_USERS.dispatch(&client, args![])? {
                println!("{}: {}", summary.id, summary.name);
            }
        }
        Err(e) => tracing::info!("skipping authenticated listing: {e}"),
    }
    Ok(())
}
