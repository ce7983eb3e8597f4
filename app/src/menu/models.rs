use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use err_derive::Error;
use serde::{Deserialize, Serialize};

/// Menu groupings. Serialized (and stored) by their upper-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Starter,
    MainDish,
    Dessert,
    Drink,
}

#[derive(Debug, Error)]
#[error(display = "unknown category: {:?}", _0)]
pub struct ParseCategoryError(pub String);

/// Store assigned identity. Zero means "not yet persisted".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(i32);

/// The fields every menu item has, whatever its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    #[serde(flatten)]
    pub meta: ItemMeta,
    #[serde(rename = "isVegetarian")]
    pub is_vegetarian: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
    #[serde(flatten)]
    pub meta: ItemMeta,
    #[serde(rename = "hasIce")]
    pub has_ice: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuItem {
    Dish(Dish),
    Drink(Drink),
}

pub trait HasMeta {
    fn meta(&self) -> &ItemMeta;
    fn meta_mut(&mut self) -> &mut ItemMeta;

    fn id(&self) -> ItemId {
        self.meta().id
    }
}

pub trait Serve {
    fn serve(&self) -> String;
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Starter,
        Category::MainDish,
        Category::Dessert,
        Category::Drink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Starter => "STARTER",
            Category::MainDish => "MAIN_DISH",
            Category::Dessert => "DESSERT",
            Category::Drink => "DRINK",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Starter => "Starter",
            Category::MainDish => "Main Dish",
            Category::Dessert => "Dessert",
            Category::Drink => "Drink",
        }
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name() == src)
            .ok_or_else(|| ParseCategoryError(src.to_string()))
    }
}

impl ItemId {
    pub fn is_assigned(self) -> bool {
        self.0 > 0
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        ItemId(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, fmt)
    }
}

impl FromStr for ItemId {
    type Err = std::num::ParseIntError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        src.parse().map(ItemId)
    }
}

impl ItemMeta {
    pub fn new(name: &str, price: f64, category: Category) -> Self {
        let id = ItemId::default();
        let name = name.to_string();
        ItemMeta {
            id,
            name,
            price,
            category,
        }
    }
}

impl Dish {
    pub fn new(name: &str, price: f64, is_vegetarian: bool, category: Category) -> Self {
        let meta = ItemMeta::new(name, price, category);
        Dish {
            meta,
            is_vegetarian,
        }
    }
}

impl Drink {
    pub fn new(name: &str, price: f64, has_ice: bool, category: Category) -> Self {
        let meta = ItemMeta::new(name, price, category);
        Drink { meta, has_ice }
    }
}

impl MenuItem {
    /// Items order by price alone; equal prices compare equal.
    pub fn by_price(&self, other: &Self) -> Ordering {
        self.meta().price.total_cmp(&other.meta().price)
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.meta_mut().id = id;
        self
    }
}

/// Stable sort, cheapest first.
pub fn sort_by_price(items: &mut [MenuItem]) {
    items.sort_by(MenuItem::by_price)
}

impl From<Dish> for MenuItem {
    fn from(dish: Dish) -> Self {
        MenuItem::Dish(dish)
    }
}

impl From<Drink> for MenuItem {
    fn from(drink: Drink) -> Self {
        MenuItem::Drink(drink)
    }
}

impl HasMeta for Dish {
    fn meta(&self) -> &ItemMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ItemMeta {
        &mut self.meta
    }
}

impl HasMeta for Drink {
    fn meta(&self) -> &ItemMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ItemMeta {
        &mut self.meta
    }
}

impl HasMeta for MenuItem {
    fn meta(&self) -> &ItemMeta {
        match self {
            MenuItem::Dish(d) => d.meta(),
            MenuItem::Drink(d) => d.meta(),
        }
    }
    fn meta_mut(&mut self) -> &mut ItemMeta {
        match self {
            MenuItem::Dish(d) => d.meta_mut(),
            MenuItem::Drink(d) => d.meta_mut(),
        }
    }
}

impl Serve for Dish {
    fn serve(&self) -> String {
        format!("Serving dish: {}", self.meta.name)
    }
}

impl Serve for Drink {
    fn serve(&self) -> String {
        let ice = if self.has_ice {
            "with ice"
        } else {
            "without ice"
        };
        format!("Serving drink: {} {}", self.meta.name, ice)
    }
}

impl Serve for MenuItem {
    fn serve(&self) -> String {
        match self {
            MenuItem::Dish(d) => d.serve(),
            MenuItem::Drink(d) => d.serve(),
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let meta = self.meta();
        write!(
            fmt,
            "ID:{:<3} | {:<20} | {:<15} | ${:.2}",
            meta.id,
            meta.name,
            meta.category.title(),
            meta.price
        )
    }
}
