use err_derive::Error;
use fallible_iterator::FallibleIterator;
use log::*;
use postgres::types::ToSql;
use postgres::{Client, Row};

pub const TABLE: &str = "menu_items";

const SETUP_SQL: &str = include_str!("persistence.sql");
const INSERT_SQL: &str = "INSERT INTO menu_items (name, price, category, type, vegetarian, has_ice) \
                          VALUES ($1, $2, $3, $4, $5, $6) \
                          RETURNING id";
const LOAD_ALL_SQL: &str =
    "SELECT id, name, price, category, type, vegetarian, has_ice FROM menu_items";
const LOAD_SQL: &str =
    "SELECT id, name, price, category, type, vegetarian, has_ice FROM menu_items WHERE id = $1";
const UPDATE_SQL: &str = "UPDATE menu_items \
                          SET name = $1, price = $2, category = $3, vegetarian = $4, has_ice = $5 \
                          WHERE id = $6 AND type = $7";
const DELETE_SQL: &str = "DELETE FROM menu_items WHERE id = $1";

/// One physical row of `menu_items`, exactly as stored.
///
/// `kind` is the `type` discriminator column. Which of `vegetarian` and
/// `has_ice` carries meaning depends on it; the other is `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRow {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub kind: String,
    pub vegetarian: Option<bool>,
    pub has_ice: Option<bool>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(display = "postgres")]
    Postgres(#[error(source)] postgres::Error),
    #[error(display = "table {} does not exist", _0)]
    MissingTable(&'static str),
    #[error(display = "table lock poisoned")]
    Poisoned,
}

/// Row level access to the `menu_items` table.
///
/// Each method is a single statement; nothing here spans a transaction.
pub trait Storage {
    /// Creates the table if it is not already there.
    fn setup(&mut self) -> Result<(), StorageError>;
    /// Writes `row`, ignoring its `id`. Yields the generated id, or `None`
    /// when nothing was written.
    fn insert(&mut self, row: &MenuRow) -> Result<Option<i32>, StorageError>;
    /// Every row, in storage order.
    fn load_all(&mut self) -> Result<Vec<MenuRow>, StorageError>;
    fn load(&mut self, id: i32) -> Result<Option<MenuRow>, StorageError>;
    /// Rewrites the row with the same `id` and `kind`. The discriminator
    /// itself is never changed. Returns the number of rows touched.
    fn update(&mut self, row: &MenuRow) -> Result<u64, StorageError>;
    fn delete(&mut self, id: i32) -> Result<u64, StorageError>;
}

impl MenuRow {
    fn from_row(row: &Row) -> Result<Self, postgres::Error> {
        Ok(MenuRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            kind: row.try_get("type")?,
            vegetarian: row.try_get("vegetarian")?,
            has_ice: row.try_get("has_ice")?,
        })
    }
}

impl Storage for Client {
    fn setup(&mut self) -> Result<(), StorageError> {
        self.batch_execute(SETUP_SQL)?;
        Ok(())
    }

    fn insert(&mut self, row: &MenuRow) -> Result<Option<i32>, StorageError> {
        let res = self.query_opt(
            INSERT_SQL,
            &[
                &row.name,
                &row.price,
                &row.category,
                &row.kind,
                &row.vegetarian,
                &row.has_ice,
            ],
        )?;
        let id = match res {
            Some(r) => Some(r.try_get("id")?),
            None => None,
        };
        debug!("Insert {:?} -> {:?}", row, id);
        Ok(id)
    }

    fn load_all(&mut self) -> Result<Vec<MenuRow>, StorageError> {
        let mut rows = self.query_raw(LOAD_ALL_SQL, std::iter::empty::<&dyn ToSql>())?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(MenuRow::from_row(&row)?);
        }
        debug!("Loaded {} rows", result.len());
        Ok(result)
    }

    fn load(&mut self, id: i32) -> Result<Option<MenuRow>, StorageError> {
        let res = self.query_opt(LOAD_SQL, &[&id])?;
        let row = match res {
            Some(r) => Some(MenuRow::from_row(&r)?),
            None => None,
        };
        debug!("Load {} -> {:?}", id, row);
        Ok(row)
    }

    fn update(&mut self, row: &MenuRow) -> Result<u64, StorageError> {
        let nrows = self.execute(
            UPDATE_SQL,
            &[
                &row.name,
                &row.price,
                &row.category,
                &row.vegetarian,
                &row.has_ice,
                &row.id,
                &row.kind,
            ],
        )?;
        debug!("Update of {} modified {} rows", row.id, nrows);
        Ok(nrows)
    }

    fn delete(&mut self, id: i32) -> Result<u64, StorageError> {
        let nrows = self.execute(DELETE_SQL, &[&id])?;
        debug!("Delete of {} modified {} rows", id, nrows);
        Ok(nrows)
    }
}
