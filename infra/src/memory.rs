//! An in-process stand-in for the `menu_items` table.
//!
//! Behaves like the postgres table as far as [`Storage`] can observe:
//! ids come from a sequence that never hands out the same value twice,
//! rows come back in insertion order, and every operation other than
//! `setup` fails until the table has been created. The table can be taken
//! offline, at which point the pool stops handing out connections. It can
//! also be told to discard inserts, as if the statement touched no rows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use err_derive::Error;
use log::*;
use r2d2::Pool;

use crate::persistence::{MenuRow, Storage, StorageError, TABLE};

#[derive(Debug, Error)]
#[error(display = "memory table is offline")]
pub struct Offline;

#[derive(Debug, Default)]
struct Table {
    created: bool,
    last_id: i32,
    rows: Vec<MenuRow>,
}

#[derive(Debug, Clone)]
pub struct MemoryTable {
    table: Arc<Mutex<Table>>,
    online: Arc<AtomicBool>,
    discard_inserts: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct MemoryConnectionManager {
    table: MemoryTable,
}

#[derive(Debug)]
pub struct MemoryRows {
    table: MemoryTable,
}

impl MemoryTable {
    pub fn new() -> Self {
        MemoryTable {
            table: Arc::new(Mutex::new(Table::default())),
            online: Arc::new(AtomicBool::new(true)),
            discard_inserts: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_online(&self, online: bool) {
        debug!("Memory table online: {}", online);
        self.online.store(online, Ordering::SeqCst);
    }

    /// While set, inserts write nothing and yield no id.
    pub fn set_discard_inserts(&self, discard: bool) {
        debug!("Memory table discards inserts: {}", discard);
        self.discard_inserts.store(discard, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn is_created(&self) -> bool {
        self.lock().map(|t| t.created).unwrap_or(false)
    }

    pub fn row_count(&self) -> usize {
        self.lock().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn manager(&self) -> MemoryConnectionManager {
        MemoryConnectionManager {
            table: self.clone(),
        }
    }

    /// A small pool that gives up quickly once the table is offline.
    pub fn pool(&self) -> Result<Pool<MemoryConnectionManager>, r2d2::Error> {
        Pool::builder()
            .max_size(2)
            .connection_timeout(Duration::from_millis(250))
            .build(self.manager())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, StorageError> {
        self.table.lock().map_err(|_| StorageError::Poisoned)
    }

    fn created(&self) -> Result<MutexGuard<'_, Table>, StorageError> {
        let t = self.lock()?;
        if !t.created {
            return Err(StorageError::MissingTable(TABLE));
        }
        Ok(t)
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl r2d2::ManageConnection for MemoryConnectionManager {
    type Connection = MemoryRows;
    type Error = Offline;

    fn connect(&self) -> Result<MemoryRows, Offline> {
        if !self.table.is_online() {
            return Err(Offline);
        }
        Ok(MemoryRows {
            table: self.table.clone(),
        })
    }

    fn is_valid(&self, _: &mut MemoryRows) -> Result<(), Offline> {
        if self.table.is_online() {
            Ok(())
        } else {
            Err(Offline)
        }
    }

    fn has_broken(&self, _: &mut MemoryRows) -> bool {
        !self.table.is_online()
    }
}

impl Storage for MemoryRows {
    fn setup(&mut self) -> Result<(), StorageError> {
        let mut t = self.table.lock()?;
        if !t.created {
            info!("Created table {}", TABLE);
            t.created = true;
        }
        Ok(())
    }

    fn insert(&mut self, row: &MenuRow) -> Result<Option<i32>, StorageError> {
        let mut t = self.table.created()?;
        if self.table.discard_inserts.load(Ordering::SeqCst) {
            debug!("Insert {:?} discarded", row);
            return Ok(None);
        }
        t.last_id += 1;
        let id = t.last_id;
        t.rows.push(MenuRow { id, ..row.clone() });
        debug!("Insert {:?} -> {}", row, id);
        Ok(Some(id))
    }

    fn load_all(&mut self) -> Result<Vec<MenuRow>, StorageError> {
        let t = self.table.created()?;
        Ok(t.rows.clone())
    }

    fn load(&mut self, id: i32) -> Result<Option<MenuRow>, StorageError> {
        let t = self.table.created()?;
        Ok(t.rows.iter().find(|r| r.id == id).cloned())
    }

    fn update(&mut self, row: &MenuRow) -> Result<u64, StorageError> {
        let mut t = self.table.created()?;
        let mut nrows = 0;
        for stored in t
            .rows
            .iter_mut()
            .filter(|r| r.id == row.id && r.kind == row.kind)
        {
            stored.name = row.name.clone();
            stored.price = row.price;
            stored.category = row.category.clone();
            stored.vegetarian = row.vegetarian;
            stored.has_ice = row.has_ice;
            nrows += 1;
        }
        Ok(nrows)
    }

    fn delete(&mut self, id: i32) -> Result<u64, StorageError> {
        let mut t = self.table.created()?;
        let before = t.rows.len();
        t.rows.retain(|r| r.id != id);
        Ok((before - t.rows.len()) as u64)
    }
}
