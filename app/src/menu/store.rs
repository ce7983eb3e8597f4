use err_derive::Error;
use log::*;
use r2d2::{Pool, PooledConnection};

use infra::persistence::{Storage, StorageError, TABLE};

use super::models::{HasMeta, ItemId, MenuItem};
use super::rows::{self, MappingError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(display = "storage unavailable")]
    Unavailable(#[error(source)] r2d2::Error),
    #[error(display = "storage operation failed")]
    Storage(#[error(source)] StorageError),
    #[error(display = "unreadable row")]
    Mapping(#[error(source)] MappingError),
    #[error(display = "invalid menu item: {}", _0)]
    InvalidItem(&'static str),
}

/// Whether a write matched a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotFound,
}

/// Data access for menu items.
///
/// Each call checks out its own connection from `db` and issues a single
/// statement; the connection goes back to the pool when the call returns.
#[derive(Debug)]
pub struct MenuItemStore<M: r2d2::ManageConnection> {
    db: Pool<M>,
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> MenuItemStore<M> {
    pub fn new(db: Pool<M>) -> Self {
        MenuItemStore { db }
    }

    pub fn setup(&self) -> Result<(), StoreError> {
        self.conn()?.setup()?;
        info!("Table {} created (if it did not exist).", TABLE);
        Ok(())
    }

    /// Like [`setup`](Self::setup), but a failure is only logged. Safe to
    /// call on every start.
    pub fn ensure_schema(&self) {
        if let Err(e) = self.setup() {
            error!("Could not create table {}: {:?}", TABLE, e);
        }
    }

    /// Persists a new item. Any id already on `item` is ignored; the
    /// generated one is returned, or `None` if nothing was written.
    pub fn add(&self, item: &MenuItem) -> Result<Option<ItemId>, StoreError> {
        validate(item)?;
        if item.id().is_assigned() {
            debug!("Ignoring caller supplied id {}", item.id());
        }
        let row = rows::encode(item);
        let id = self.conn()?.insert(&row)?;
        match id {
            Some(id) => {
                debug!("Added {:?} as {}", item, id);
                Ok(Some(ItemId::from(id)))
            }
            None => {
                warn!("Record was not added: {:?}", item);
                Ok(None)
            }
        }
    }

    /// Every stored item, in storage order.
    pub fn get_all(&self) -> Result<Vec<MenuItem>, StoreError> {
        let stored = self.conn()?.load_all()?;
        let items = stored
            .into_iter()
            .map(rows::decode)
            .collect::<Result<Vec<MenuItem>, MappingError>>()?;
        debug!("Loaded {} items", items.len());
        Ok(items)
    }

    pub fn get_by_id(&self, id: ItemId) -> Result<Option<MenuItem>, StoreError> {
        let stored = self.conn()?.load(id.get())?;
        let item = stored.map(rows::decode).transpose()?;
        debug!("Load {} -> {:?}", id, item);
        Ok(item)
    }

    /// Rewrites name, price, category and flags of the row with the item's
    /// id. The stored variant must match the item's; otherwise nothing is
    /// written and the id counts as not found.
    pub fn update(&self, item: &MenuItem) -> Result<Outcome, StoreError> {
        validate(item)?;
        let row = rows::encode(item);
        let nrows = self.conn()?.update(&row)?;
        if nrows > 0 {
            info!("Item {} updated.", item.id());
            Ok(Outcome::Applied)
        } else {
            info!("ID {} not found as a {}.", item.id(), row.kind);
            Ok(Outcome::NotFound)
        }
    }

    pub fn delete_by_id(&self, id: ItemId) -> Result<Outcome, StoreError> {
        let nrows = self.conn()?.delete(id.get())?;
        if nrows > 0 {
            info!("Item {} deleted.", id);
            Ok(Outcome::Applied)
        } else {
            info!("ID {} not found.", id);
            Ok(Outcome::NotFound)
        }
    }

    fn conn(&self) -> Result<PooledConnection<M>, StoreError> {
        let conn = self.db.get()?;
        Ok(conn)
    }
}

impl<M: r2d2::ManageConnection> Clone for MenuItemStore<M> {
    fn clone(&self) -> Self {
        let db = self.db.clone();
        MenuItemStore { db }
    }
}

fn validate(item: &MenuItem) -> Result<(), StoreError> {
    let meta = item.meta();
    if !meta.price.is_finite() || meta.price < 0.0 {
        return Err(StoreError::InvalidItem(
            "price must be a non-negative number",
        ));
    }
    Ok(())
}
