use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::Response,
    routing::get,
    Json, Router,
};

use stockroom_core::Entity;
use stockroom_infra::Session;
use stockroom_inventory::Inventory;
use stockroom_products::Product;

use crate::app::dto::InventoryRequest;
use crate::app::errors::ApiResult;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_inventories)
                .post(create_inventory)
                .put(update_inventory),
        )
        .route("/:id", get(get_inventory).delete(delete_inventory))
}

/// Load the product the body refers to.
///
/// A missing id or a product that no longer exists both yield `None`, so the
/// inventory is stored without an owner.
async fn resolve_product(
    session: &mut dyn Session,
    body: &InventoryRequest,
) -> ApiResult<Option<Product>> {
    let Some(product_id) = body.product_id() else {
        return Ok(None);
    };
    let product = session.products().find(&product_id).await?;
    if product.is_none() {
        tracing::debug!(%product_id, "referenced product not found; clearing reference");
    }
    Ok(product)
}

pub async fn create_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<InventoryRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;

    let mut session = services.session().await?;
    let product = resolve_product(session.as_mut(), &body).await?;
    let inventory = body.into_new(product)?;
    inventory.validate()?;

    let created = session.inventories().create(inventory).await?;
    session.commit().await?;

    tracing::debug!(id = ?created.id, product_id = ?created.product_id(), "inventory created");
    common::created(created)
}

pub async fn update_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<InventoryRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;

    let mut session = services.session().await?;
    let product = resolve_product(session.as_mut(), &body).await?;
    let inventory = body.into_existing(product)?;
    inventory.validate()?;

    let updated = session.inventories().edit(inventory).await?;
    session.commit().await?;

    tracing::debug!(id = ?updated.id, product_id = ?updated.product_id(), "inventory updated");
    common::updated(updated)
}

pub async fn list_inventories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<Inventory>>> {
    common::list::<Inventory>(&services, &params).await
}

pub async fn get_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Inventory>> {
    common::get_one::<Inventory>(&services, &id).await
}

pub async fn delete_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    common::delete::<Inventory>(&services, &id).await
}
