use actix_web::web;
use anyhow::Result;
use log::*;
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

use infra::persistence::Storage;

pub mod config;
pub mod menu;
pub mod services;
#[cfg(test)]
mod test;

use crate::menu::{Menu, MenuItemStore};

/// The menu catalog service: one store, and the routes in front of it.
#[derive(Debug)]
pub struct MenuCard<M: r2d2::ManageConnection> {
    store: MenuItemStore<M>,
    menu: Menu<M>,
}

impl MenuCard<PostgresConnectionManager<NoTls>> {
    pub fn new(config: &config::Config) -> Result<Self> {
        let db = config.postgres.build()?;
        Ok(Self::with_pool(db, &config.api))
    }
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> MenuCard<M> {
    /// Wires the catalog over an existing pool and makes sure the table
    /// exists. A schema failure is logged, not returned.
    pub fn with_pool(db: Pool<M>, api: &config::ApiConfig) -> Self {
        let store = MenuItemStore::new(db);
        debug!("Init schema");
        store.ensure_schema();
        let menu = Menu::new(store.clone(), api.strict_errors);
        MenuCard { store, menu }
    }

    pub fn store(&self) -> &MenuItemStore<M> {
        &self.store
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        info!("Booting menucard");
        self.menu.configure(cfg)
    }
}

impl<M: r2d2::ManageConnection> Clone for MenuCard<M> {
    fn clone(&self) -> Self {
        let store = self.store.clone();
        let menu = self.menu.clone();
        MenuCard { store, menu }
    }
}
