use std::path::PathBuf;

use actix_web::{App, HttpServer};
use anyhow::{Context, Result};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "serve", about = "Serve the menu catalog.")]
struct Opt {
    /// Input file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    menucard: menucard::config::Config,
    listener: Listener,
    #[serde(default)]
    env_logger: menucard::config::EnvLogger,
}

#[derive(Deserialize, Debug)]
struct Listener {
    addr: std::net::SocketAddr,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config: Config = menucard::config::load(&opt.config)?;
    config.env_logger.builder().init();
    debug!("Options: {:?}", opt);
    config.menucard.apply_env()?;

    let app = menucard::MenuCard::new(&config.menucard)?;

    let srv = HttpServer::new(move || App::new().configure(|cfg| app.configure(cfg)))
        .bind(config.listener.addr)
        .context("bind")?;
    info!("Listening on: {:?}", srv.addrs());
    srv.run().await?;
    Ok(())
}
