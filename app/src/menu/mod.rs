use anyhow::{Context, Result};

use infra::persistence::Storage;

use crate::services::{Commandable, Queryable, Request};

mod models;
mod resources;
mod rows;
mod store;

pub use self::models::{
    sort_by_price, Category, Dish, Drink, HasMeta, ItemId, ItemMeta, MenuItem, ParseCategoryError,
    Serve,
};
pub use self::resources::Menu;
pub use self::rows::MappingError;
pub use self::store::{MenuItemStore, Outcome, StoreError};

/// Every item, cheapest first.
#[derive(Debug, Clone, Copy)]
pub struct ShowMenu;

#[derive(Debug, Clone, Copy)]
pub struct LoadItem(pub ItemId);

#[derive(Debug, Clone)]
pub struct AddItem(pub MenuItem);

#[derive(Debug, Clone)]
pub struct UpdateItem(pub MenuItem);

#[derive(Debug, Clone, Copy)]
pub struct DeleteItem(pub ItemId);

impl Request for ShowMenu {
    type Resp = Vec<MenuItem>;
}

impl Request for LoadItem {
    type Resp = Option<MenuItem>;
}

impl Request for AddItem {
    type Resp = Option<ItemId>;
}

impl Request for UpdateItem {
    type Resp = Outcome;
}

impl Request for DeleteItem {
    type Resp = Outcome;
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> Queryable<ShowMenu>
    for MenuItemStore<M>
{
    fn query(&self, _: ShowMenu) -> Result<Vec<MenuItem>> {
        let mut items = self.get_all().context("load menu")?;
        sort_by_price(&mut items);
        Ok(items)
    }
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> Queryable<LoadItem>
    for MenuItemStore<M>
{
    fn query(&self, LoadItem(id): LoadItem) -> Result<Option<MenuItem>> {
        let item = self
            .get_by_id(id)
            .with_context(|| format!("load item {}", id))?;
        Ok(item)
    }
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> Commandable<AddItem>
    for MenuItemStore<M>
{
    fn execute(&self, AddItem(item): AddItem) -> Result<Option<ItemId>> {
        let id = self
            .add(&item)
            .with_context(|| format!("add {}", item.meta().name))?;
        Ok(id)
    }
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static>
    Commandable<UpdateItem> for MenuItemStore<M>
{
    fn execute(&self, UpdateItem(item): UpdateItem) -> Result<Outcome> {
        let outcome = self
            .update(&item)
            .with_context(|| format!("update item {}", item.id()))?;
        Ok(outcome)
    }
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static>
    Commandable<DeleteItem> for MenuItemStore<M>
{
    fn execute(&self, DeleteItem(id): DeleteItem) -> Result<Outcome> {
        let outcome = self
            .delete_by_id(id)
            .with_context(|| format!("delete item {}", id))?;
        Ok(outcome)
    }
}
