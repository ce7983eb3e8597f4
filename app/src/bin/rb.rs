use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Deserialize;
use structopt::StructOpt;

use menucard::menu::{
    AddItem, Category, DeleteItem, Dish, Drink, HasMeta, ItemId, LoadItem, MenuItem,
    MenuItemStore, Outcome, Serve, ShowMenu, UpdateItem,
};
use menucard::services::{Commandable, Queryable};

#[derive(Debug, StructOpt)]
#[structopt(name = "rb", about = "Menu catalog CLI")]
struct Opt {
    /// Input file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "setup", about = "Create the menu table")]
    Setup,
    #[structopt(name = "show-menu", about = "Show menu, cheapest first")]
    ShowMenu,
    #[structopt(name = "add-dish", about = "Add a dish")]
    AddDish(NewItem),
    #[structopt(name = "add-drink", about = "Add a drink")]
    AddDrink(NewItem),
    #[structopt(name = "set-price", about = "Change the price of an item")]
    SetPrice { id: ItemId, price: f64 },
    #[structopt(name = "delete", about = "Remove an item")]
    Delete { id: ItemId },
}

#[derive(Debug, StructOpt)]
struct NewItem {
    #[structopt(long = "name")]
    name: String,
    #[structopt(long = "price")]
    price: f64,
    /// One of STARTER, MAIN_DISH, DESSERT, DRINK
    #[structopt(long = "category")]
    category: Category,
    /// Vegetarian for dishes, with ice for drinks
    #[structopt(long = "flag")]
    flag: bool,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    menucard: menucard::config::Config,
    #[serde(default)]
    env_logger: menucard::config::EnvLogger,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config: Config = menucard::config::load(&opt.config)?;
    config.env_logger.builder().init();
    config.menucard.apply_env()?;

    let store = MenuItemStore::new(config.menucard.postgres.build()?);

    match opt.command {
        Commands::Setup => {
            store.setup()?;
        }
        Commands::ShowMenu => {
            for item in store.query(ShowMenu)? {
                println!("{}", item);
                println!("      {}", item.serve());
            }
        }
        Commands::AddDish(new) => {
            let dish = Dish::new(&new.name, new.price, new.flag, new.category);
            added(store.execute(AddItem(MenuItem::from(dish)))?);
        }
        Commands::AddDrink(new) => {
            let drink = Drink::new(&new.name, new.price, new.flag, new.category);
            added(store.execute(AddItem(MenuItem::from(drink)))?);
        }
        Commands::SetPrice { id, price } => {
            let mut item = match store.query(LoadItem(id))? {
                Some(item) => item,
                None => bail!("ID {} not found", id),
            };
            item.meta_mut().price = price;
            report(store.execute(UpdateItem(item))?, "Item updated.");
        }
        Commands::Delete { id } => {
            report(store.execute(DeleteItem(id))?, "Item deleted.");
        }
    }

    Ok(())
}

fn added(id: Option<ItemId>) {
    match id {
        Some(id) => println!("Added as {}", id),
        None => println!("Warning: record was not added!"),
    }
}

fn report(outcome: Outcome, done: &str) {
    match outcome {
        Outcome::Applied => println!("{}", done),
        Outcome::NotFound => println!("ID not found."),
    }
}
