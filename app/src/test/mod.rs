//! Guarded with `#[cfg(test)]` from `lib.rs`. These need a postgres
//! server at `$POSTGRES_URL`; run them with `cargo test -- --ignored`.

use anyhow::Result;

use crate::menu::{
    Category, Dish, Drink, HasMeta, ItemId, MappingError, MenuItem, MenuItemStore, Outcome,
    StoreError,
};


fn soup() -> MenuItem {
    Dish::new("Soup", 5.5, true, Category::Starter).into()
}

fn cola() -> MenuItem {
    Drink::new("Cola", 2.0, false, Category::Drink).into()
}

#[test]
#[ignore]
fn setup_twice_creates_one_table() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let schema = "setup_twice_creates_one_table";
    let pool = junk_drawer::pool(schema)?;
    let store = MenuItemStore::new(pool.clone());

    store.setup()?;
    store.setup()?;

    assert_eq!(junk_drawer::table_count(&mut *pool.get()?, schema)?, 1);
    Ok(())
}

#[test]
#[ignore]
fn items_round_trip_through_postgres() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let store = MenuItemStore::new(junk_drawer::pool("items_round_trip_through_postgres")?);
    store.setup()?;

    let soup_id = store.add(&soup())?.expect("soup id");
    let cola_id = store.add(&cola())?.expect("cola id");

    let mut items = store.get_all()?;
    items.sort_by_key(|i| i.id());
    assert_eq!(
        items,
        vec![soup().with_id(soup_id), cola().with_id(cola_id)]
    );
    Ok(())
}

#[test]
#[ignore]
fn update_and_delete_against_postgres() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let store = MenuItemStore::new(junk_drawer::pool("update_and_delete_against_postgres")?);
    store.setup()?;
    let id = store.add(&soup())?.expect("id");

    let mut pricier = soup().with_id(id);
    pricier.meta_mut().price = 9.99;
    assert_eq!(store.update(&pricier)?, Outcome::Applied);
    assert_eq!(store.update(&cola().with_id(id))?, Outcome::NotFound);
    assert_eq!(store.get_by_id(id)?, Some(pricier));

    assert_eq!(store.delete_by_id(id)?, Outcome::Applied);
    assert_eq!(store.delete_by_id(id)?, Outcome::NotFound);
    assert_eq!(store.delete_by_id(ItemId::from(id.get() + 100))?, Outcome::NotFound);
    assert!(store.get_all()?.is_empty());
    Ok(())
}

#[test]
#[ignore]
fn foreign_discriminator_is_reported() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let pool = junk_drawer::pool("foreign_discriminator_is_reported")?;
    let store = MenuItemStore::new(pool.clone());
    store.setup()?;
    pool.get()?.execute(
        "INSERT INTO menu_items (name, price, category, type) VALUES ('Crisps', 1.0, 'STARTER', 'SNACK')",
        &[],
    )?;

    let err = store.get_all().expect_err("get_all");

    assert!(
        matches!(err, StoreError::Mapping(MappingError::UnknownKind { .. })),
        "{:?}",
        err
    );
    Ok(())
}
