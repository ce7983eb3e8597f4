//! Folding both item variants into the single `menu_items` row shape, and
//! unfolding them again. The `type` column picks the variant; only the flag
//! column belonging to that variant is populated.

use err_derive::Error;
use log::*;

use infra::persistence::MenuRow;

use super::models::{Category, Dish, Drink, ItemId, ItemMeta, MenuItem};

const DISH: &str = "DISH";
const DRINK: &str = "DRINK";

#[derive(Debug, Error)]
pub enum MappingError {
    #[error(display = "row {} has unknown type {:?}", id, kind)]
    UnknownKind { id: i32, kind: String },
    #[error(display = "row {} has unknown category {:?}", id, category)]
    UnknownCategory { id: i32, category: String },
}

/// The discriminator value written for an item.
pub fn kind_of(item: &MenuItem) -> &'static str {
    match item {
        MenuItem::Dish(_) => DISH,
        MenuItem::Drink(_) => DRINK,
    }
}

pub fn encode(item: &MenuItem) -> MenuRow {
    let (meta, vegetarian, has_ice) = match item {
        MenuItem::Dish(d) => (&d.meta, Some(d.is_vegetarian), None),
        MenuItem::Drink(d) => (&d.meta, None, Some(d.has_ice)),
    };
    MenuRow {
        id: meta.id.get(),
        name: meta.name.clone(),
        price: meta.price,
        category: meta.category.name().to_string(),
        kind: kind_of(item).to_string(),
        vegetarian,
        has_ice,
    }
}

/// A `NULL` flag reads back as `false`.
pub fn decode(row: MenuRow) -> Result<MenuItem, MappingError> {
    let MenuRow {
        id,
        name,
        price,
        category,
        kind,
        vegetarian,
        has_ice,
    } = row;

    let category = match category.parse::<Category>() {
        Ok(c) => c,
        Err(_) => return Err(MappingError::UnknownCategory { id, category }),
    };
    let meta = ItemMeta {
        id: ItemId::from(id),
        name,
        price,
        category,
    };

    let item = match kind.as_str() {
        DISH => MenuItem::Dish(Dish {
            meta,
            is_vegetarian: vegetarian.unwrap_or_else(|| {
                debug!("Dish {} has no vegetarian flag", id);
                false
            }),
        }),
        DRINK => MenuItem::Drink(Drink {
            meta,
            has_ice: has_ice.unwrap_or_else(|| {
                debug!("Drink {} has no has_ice flag", id);
                false
            }),
        }),
        _ => return Err(MappingError::UnknownKind { id, kind }),
    };
    Ok(item)
}
