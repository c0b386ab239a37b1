//! `cinema-users`: authoritative accounts and origin of the client saga.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use cinema::server::{run, Deployable};
use color_eyre::eyre::Result;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    run(Deployable::Users).await
}
