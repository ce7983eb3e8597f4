use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use err_derive::Error;
use log::*;

use infra::persistence::Storage;

use super::models::{Dish, Drink, ItemId, MenuItem};
use super::store::{MenuItemStore, Outcome, StoreError};

const PREFIX: &str = "/menu";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// HTTP routes over a [`MenuItemStore`].
///
/// Unless `strict` is set, the original routes answer 200 whatever happened
/// underneath and failures only show up in the log.
#[derive(Debug)]
pub struct Menu<M: r2d2::ManageConnection> {
    store: MenuItemStore<M>,
    strict: bool,
}

#[derive(Debug, Error)]
enum Failure {
    #[error(display = "{}", _0)]
    Store(#[error(source)] StoreError),
    #[error(display = "worker pool: {}", _0)]
    Blocking(BlockingError),
}

impl<M: r2d2::ManageConnection<Connection = D>, D: Storage + Send + 'static> Menu<M> {
    pub fn new(store: MenuItemStore<M>, strict: bool) -> Self {
        Menu { store, strict }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let scope = web::scope(PREFIX)
            .service({
                let me = self.clone();
                web::resource("").route(web::get().to(move || me.clone().index()))
            })
            .service({
                let me = self.clone();
                web::resource("/dish").route(
                    web::post().to(move |dish: web::Json<Dish>| me.clone().add_dish(dish.into_inner())),
                )
            })
            .service({
                let me = self.clone();
                web::resource("/drink").route(
                    web::post()
                        .to(move |drink: web::Json<Drink>| me.clone().add_drink(drink.into_inner())),
                )
            })
            .service({
                let show = self.clone();
                let update = self.clone();
                let delete = self.clone();
                web::resource("/{id}")
                    .route(web::get().to(move |id: web::Path<i32>| {
                        show.clone().detail(ItemId::from(id.into_inner()))
                    }))
                    .route(
                        web::put().to(move |id: web::Path<i32>, item: web::Json<MenuItem>| {
                            update
                                .clone()
                                .update(ItemId::from(id.into_inner()), item.into_inner())
                        }),
                    )
                    .route(web::delete().to(move |id: web::Path<i32>| {
                        delete.clone().delete(ItemId::from(id.into_inner()))
                    }))
            });

        cfg.service(scope);
    }

    async fn index(self) -> HttpResponse {
        info!("Handle index");
        match self.in_pool(|store| store.get_all()).await {
            Ok(items) => HttpResponse::Ok().json(items),
            Err(e) if !self.strict => {
                warn!("Listing menu failed, answering empty: {:?}", e);
                HttpResponse::Ok().json(Vec::<MenuItem>::new())
            }
            Err(e) => failure_response(&e),
        }
    }

    async fn add_dish(self, dish: Dish) -> HttpResponse {
        self.add(MenuItem::Dish(dish), "Dish").await
    }

    async fn add_drink(self, drink: Drink) -> HttpResponse {
        self.add(MenuItem::Drink(drink), "Drink").await
    }

    async fn add(self, item: MenuItem, noun: &'static str) -> HttpResponse {
        debug!("Add {:?}", item);
        let res = self.in_pool(move |store| store.add(&item)).await;
        match res {
            Ok(Some(id)) => {
                debug!("{} stored as {}", noun, id);
                text(StatusCode::OK, format!("{} added", noun))
            }
            Ok(None) if self.strict => text(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} was not added", noun),
            ),
            Ok(None) => text(StatusCode::OK, format!("{} added", noun)),
            Err(e) if !self.strict => {
                warn!("Adding {} failed: {:?}", noun, e);
                text(StatusCode::OK, format!("{} added", noun))
            }
            Err(e) => failure_response(&e),
        }
    }

    async fn detail(self, id: ItemId) -> HttpResponse {
        match self.in_pool(move |store| store.get_by_id(id)).await {
            Ok(Some(item)) => HttpResponse::Ok().json(item),
            Ok(None) => text(StatusCode::NOT_FOUND, "ID not found"),
            Err(e) => failure_response(&e),
        }
    }

    async fn update(self, id: ItemId, item: MenuItem) -> HttpResponse {
        let item = item.with_id(id);
        debug!("Update {:?}", item);
        let res = self.in_pool(move |store| store.update(&item)).await;
        self.written(res, "Updated")
    }

    async fn delete(self, id: ItemId) -> HttpResponse {
        let res = self.in_pool(move |store| store.delete_by_id(id)).await;
        self.written(res, "Deleted")
    }

    fn written(&self, res: Result<Outcome, Failure>, done: &'static str) -> HttpResponse {
        match res {
            Ok(Outcome::Applied) => text(StatusCode::OK, done),
            Ok(Outcome::NotFound) if self.strict => text(StatusCode::NOT_FOUND, "ID not found"),
            Ok(Outcome::NotFound) => text(StatusCode::OK, done),
            Err(e) if !self.strict => {
                warn!("{} failed: {:?}", done, e);
                text(StatusCode::OK, done)
            }
            Err(e) => failure_response(&e),
        }
    }

    async fn in_pool<R, F>(&self, f: F) -> Result<R, Failure>
    where
        R: Send + 'static,
        F: FnOnce(&MenuItemStore<M>) -> Result<R, StoreError> + Send + 'static,
    {
        let store = self.store.clone();
        web::block(move || f(&store))
            .await
            .map_err(Failure::Blocking)?
            .map_err(Failure::Store)
    }
}

impl<M: r2d2::ManageConnection> Clone for Menu<M> {
    fn clone(&self) -> Self {
        let store = self.store.clone();
        let strict = self.strict;
        Menu { store, strict }
    }
}

fn text<B: Into<String>>(status: StatusCode, body: B) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(TEXT_PLAIN)
        .body(body.into())
}

fn failure_response(err: &Failure) -> HttpResponse {
    error!("Request failed: {:?}", err);
    let status = match err {
        Failure::Store(StoreError::InvalidItem(_)) => StatusCode::BAD_REQUEST,
        Failure::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Failure::Store(StoreError::Storage(_)) | Failure::Store(StoreError::Mapping(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Failure::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    text(status, err.to_string())
}
